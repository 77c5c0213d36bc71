//! DKB giro account exports.
//!
//! The file starts with a few lines of account information before the
//! header. DKB names two columns "Zahlungspflichtige*r"; the first holds the
//! payer and the second the payee, for incoming and outgoing transactions
//! alike. Every statement contains a zero amount "Abrechnung" booking from
//! DKB AG to DKB AG, which is dropped.

use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::{
    find_header, line_of, parse_amount_de, parse_date, read_utf8_records, ParseResult, Parser,
    SourceFormat,
};
use crate::error::ParserError;
use crate::models::HomebankRecord;

const HEADER: [&str; 12] = [
    "Buchungsdatum",
    "Wertstellung",
    "Status",
    "Zahlungspflichtige*r",
    "Zahlungspflichtige*r",
    "Verwendungszweck",
    "Umsatztyp",
    "IBAN",
    "Betrag (€)",
    "Gläubiger-ID",
    "Mandatsreferenz",
    "Kundenreferenz",
];

const BOOKED: &str = "Gebucht";
const INCOMING: &str = "Eingang";
const BANK_NAME: &str = "DKB AG";
const DATE_FORMAT: &str = "%d.%m.%y";

#[derive(Debug, Clone, PartialEq)]
struct DkbRecord {
    booking_date: NaiveDate,
    payer: String,
    payee: String,
    purpose: String,
    transaction_type: String,
    amount: Decimal,
}

impl DkbRecord {
    fn is_settlement(&self) -> bool {
        self.transaction_type == INCOMING
            && self.amount.is_zero()
            && self.payer == BANK_NAME
            && self.payee == BANK_NAME
    }

    fn to_homebank(&self) -> HomebankRecord {
        let mut h = HomebankRecord::new(self.booking_date, self.amount);
        if self.amount < Decimal::ZERO {
            h.payee = self.payee.clone();
        }
        h.memo = self.purpose.clone();
        h
    }
}

#[derive(Debug, Default)]
pub struct DkbParser {
    entries: Vec<DkbRecord>,
}

impl Parser for DkbParser {
    fn parse(&mut self, file_path: &Path) -> ParseResult<()> {
        self.entries.clear();
        let records = read_utf8_records(file_path, b';')?;
        let header_idx = find_header(&records, &HEADER).ok_or_else(|| ParserError::header(0))?;
        debug!("DKB header on line {}", line_of(&records[header_idx]));

        let mut entries = Vec::new();
        for row in &records[header_idx + 1..] {
            if row.len() != HEADER.len() || &row[2] != BOOKED {
                continue;
            }
            let line = line_of(row);
            let booking_date = parse_date(&row[0], DATE_FORMAT)
                .ok_or_else(|| ParserError::data(line, "Buchungsdatum"))?;
            parse_date(&row[1], DATE_FORMAT)
                .ok_or_else(|| ParserError::data(line, "Wertstellung"))?;
            let amount =
                parse_amount_de(&row[8]).ok_or_else(|| ParserError::data(line, "Betrag (€)"))?;

            let record = DkbRecord {
                booking_date,
                payer: row[3].to_string(),
                payee: row[4].to_string(),
                purpose: row[5].to_string(),
                transaction_type: row[6].to_string(),
                amount,
            };
            if record.is_settlement() {
                debug!("skipping DKB settlement record on line {line}");
                continue;
            }
            entries.push(record);
        }
        self.entries = entries;
        Ok(())
    }

    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::Dkb
    }

    fn to_homebank(&self) -> Vec<HomebankRecord> {
        self.entries.iter().map(|e| e.to_homebank()).collect()
    }
}
