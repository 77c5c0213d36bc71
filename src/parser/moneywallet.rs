use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{line_of, parse_amount, parse_datetime, read_utf8_records, ParseResult, Parser, SourceFormat};
use crate::error::ParserError;
use crate::models::HomebankRecord;

const HEADER: [&str; 6] = ["wallet", "currency", "category", "datetime", "money", "description"];

#[derive(Debug, Clone, PartialEq)]
struct MoneyWalletRecord {
    category: String,
    date: NaiveDate,
    money: Decimal,
    description: String,
}

impl MoneyWalletRecord {
    fn to_homebank(&self) -> HomebankRecord {
        let mut h = HomebankRecord::new(self.date, self.money);
        h.category = self.category.clone();
        h.info = self.description.clone();
        h
    }
}

/// Exports of the MoneyWallet Android app: comma separated, header on the
/// first line.
#[derive(Debug, Default)]
pub struct MoneyWalletParser {
    entries: Vec<MoneyWalletRecord>,
}

impl Parser for MoneyWalletParser {
    fn parse(&mut self, file_path: &Path) -> ParseResult<()> {
        self.entries.clear();
        let records = read_utf8_records(file_path, b',')?;
        let Some(header) = records.first() else {
            return Err(ParserError::header(0));
        };
        if !super::is_valid_header(header.iter(), &HEADER) {
            return Err(ParserError::header(line_of(header)));
        }

        let mut entries = Vec::new();
        for row in &records[1..] {
            if row.len() != HEADER.len() {
                continue;
            }
            let line = line_of(row);
            let date = parse_datetime(&row[3], "%Y-%m-%d %H:%M:%S")
                .ok_or_else(|| ParserError::data(line, "datetime"))?
                .date();
            let money = parse_amount(&row[4]).ok_or_else(|| ParserError::data(line, "money"))?;
            entries.push(MoneyWalletRecord {
                category: row[2].to_string(),
                date,
                money,
                description: row[5].to_string(),
            });
        }
        self.entries = entries;
        Ok(())
    }

    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::MoneyWallet
    }

    fn to_homebank(&self) -> Vec<HomebankRecord> {
        self.entries.iter().map(|e| e.to_homebank()).collect()
    }
}
