use std::io::Write;
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::HomebankRecord;

pub const HEADER: [&str; 8] = [
    "date", "payment", "info", "payee", "memo", "amount", "category", "tags",
];

/// Output files get this extension, regardless of the input container.
pub const EXTENSION: &str = "csv";

const AMOUNT_DECIMALS: u32 = 6;

pub fn format_amount(amount: Decimal) -> String {
    format!("{:.6}", amount.round_dp(AMOUNT_DECIMALS))
}

pub fn write_records<W: Write>(records: &[HomebankRecord], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    wtr.write_record(HEADER)?;
    for rec in records {
        let date = rec.date.format("%Y-%m-%d").to_string();
        let payment = rec.payment.code().to_string();
        let amount = format_amount(rec.amount);
        wtr.write_record([
            date.as_str(),
            payment.as_str(),
            rec.info.as_str(),
            rec.payee.as_str(),
            rec.memo.as_str(),
            amount.as_str(),
            rec.category.as_str(),
            rec.tags.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Create (or truncate) `file_path` and write `records` to it.
pub fn write_homebank_file(records: &[HomebankRecord], file_path: &Path) -> Result<()> {
    let file = std::fs::File::create(file_path)?;
    write_records(records, std::io::BufWriter::new(file))
}
