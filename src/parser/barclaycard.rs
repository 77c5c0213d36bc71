use std::path::Path;

use calamine::{Data, Reader};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::{parse_amount_de, parse_date, ParseResult, Parser, SourceFormat};
use crate::error::ParserError;
use crate::models::{HomebankRecord, PaymentMethod};

const SHEET: &str = "Sheet1";

// Column 1 is labelled "Buchungsdatum" too but holds the transaction date.
const HEADER: [&str; 15] = [
    "Referenznummer",
    "Buchungsdatum",
    "Buchungsdatum",
    "Betrag",
    "Beschreibung",
    "Typ",
    "Status",
    "Kartennummer",
    "Originalbetrag",
    "Mögliche Zahlpläne",
    "Land",
    "Name des Karteninhabers",
    "Kartennetzwerk",
    "Kontaktlose Bezahlung",
    "Händlerdetails",
];

const COL_TRANSACTION_DATE: usize = 1;
const COL_BOOKING_DATE: usize = 2;
const COL_AMOUNT: usize = 3;
const COL_DESCRIPTION: usize = 4;
const COL_MERCHANT: usize = 14;

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial.trunc() as i64))
}

fn cell_text(row: &[Data], col: usize) -> String {
    match row.get(col) {
        Some(Data::String(s)) => s.clone(),
        Some(Data::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn cell_is_empty(row: &[Data], col: usize) -> bool {
    match row.get(col) {
        Some(Data::Empty) | None => true,
        Some(Data::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn cell_date(row: &[Data], col: usize) -> Option<NaiveDate> {
    match row.get(col)? {
        Data::String(s) => parse_date(s, "%d.%m.%Y"),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()),
        Data::Float(f) => excel_serial_to_date(*f),
        Data::Int(i) => excel_serial_to_date(*i as f64),
        Data::DateTimeIso(s) => parse_date(s.get(..10)?, "%Y-%m-%d"),
        _ => None,
    }
}

fn cell_amount(row: &[Data], col: usize) -> Option<Decimal> {
    match row.get(col)? {
        // The export writes amounts as text, e.g. "3,14 €"
        Data::String(s) => parse_amount_de(s),
        Data::Float(f) => Decimal::try_from(*f).ok(),
        Data::Int(i) => Some(Decimal::from(*i)),
        _ => None,
    }
}

fn is_header_row(row: &[Data]) -> bool {
    let used = row
        .iter()
        .rposition(|c| !matches!(c, Data::Empty))
        .map_or(0, |last| last + 1);
    used == HEADER.len()
        && row[..used]
            .iter()
            .zip(HEADER)
            .all(|(cell, want)| matches!(cell, Data::String(s) if s == want))
}

#[derive(Debug, Clone, PartialEq)]
struct BarclaycardRecord {
    transaction_date: NaiveDate,
    amount: Decimal,
    description: String,
    merchant: String,
}

impl BarclaycardRecord {
    fn to_homebank(&self) -> HomebankRecord {
        let mut h = HomebankRecord::new(self.transaction_date, self.amount);
        h.payment = PaymentMethod::CreditCard;
        h.info = self.description.clone();
        h.payee = self.merchant.clone();
        h
    }
}

/// Barclaycard credit card statements, downloaded as an Excel workbook.
/// Pending transactions have no booking date yet and are left out.
#[derive(Debug, Default)]
pub struct BarclaycardParser {
    entries: Vec<BarclaycardRecord>,
}

impl Parser for BarclaycardParser {
    fn parse(&mut self, file_path: &Path) -> ParseResult<()> {
        self.entries.clear();
        let mut workbook = calamine::open_workbook_auto(file_path).map_err(|_| ParserError::io())?;
        let range = workbook
            .worksheet_range(SHEET)
            .map_err(|_| ParserError::header(0))?;
        let first_row = range.start().map_or(0, |(row, _)| row as usize);

        let mut rows = range.rows().enumerate();
        let header_idx = rows
            .by_ref()
            .find(|(_, row)| is_header_row(row))
            .map(|(idx, _)| idx)
            .ok_or_else(|| ParserError::header(0))?;
        debug!("Barclaycard header on line {}", first_row + header_idx + 1);

        let mut entries = Vec::new();
        for (idx, row) in rows {
            let line = first_row + idx + 1;
            if row.iter().all(|c| matches!(c, Data::Empty)) {
                continue;
            }
            let transaction_date = cell_date(row, COL_TRANSACTION_DATE)
                .ok_or_else(|| ParserError::data(line, "Buchungsdatum(1)/Transaktionsdatum"))?;
            if cell_is_empty(row, COL_BOOKING_DATE) {
                debug!("skipping pending Barclaycard transaction on line {line}");
                continue;
            }
            cell_date(row, COL_BOOKING_DATE)
                .ok_or_else(|| ParserError::data(line, "Buchungsdatum"))?;
            let amount =
                cell_amount(row, COL_AMOUNT).ok_or_else(|| ParserError::data(line, "Betrag"))?;
            entries.push(BarclaycardRecord {
                transaction_date,
                amount,
                description: cell_text(row, COL_DESCRIPTION),
                merchant: cell_text(row, COL_MERCHANT),
            });
        }
        self.entries = entries;
        Ok(())
    }

    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::Barclaycard
    }

    fn to_homebank(&self) -> Vec<HomebankRecord> {
        self.entries.iter().map(|e| e.to_homebank()).collect()
    }
}
