use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{
    is_valid_header, line_of, parse_amount_de, parse_date, read_utf8_records, ParseResult, Parser,
    SourceFormat,
};
use crate::error::ParserError;
use crate::models::HomebankRecord;

const HEADER: [&str; 18] = [
    "Bezeichnung Auftragskonto",
    "IBAN Auftragskonto",
    "BIC Auftragskonto",
    "Bankname Auftragskonto",
    "Buchungstag",
    "Valutadatum",
    "Name Zahlungsbeteiligter",
    "IBAN Zahlungsbeteiligter",
    "BIC (SWIFT-Code) Zahlungsbeteiligter",
    "Buchungstext",
    "Verwendungszweck",
    "Betrag",
    "Waehrung",
    "Saldo nach Buchung",
    "Bemerkung",
    "Gekennzeichneter Umsatz",
    "Glaeubiger ID",
    "Mandatsreferenz",
];

const COL_BOOKING_DATE: usize = 4;
const COL_PAYEE: usize = 6;
const COL_PURPOSE: usize = 10;
const COL_AMOUNT: usize = 11;

#[derive(Debug, Clone, PartialEq)]
struct VolksbankRecord {
    booking_date: NaiveDate,
    payee: String,
    purpose: String,
    amount: Decimal,
}

impl VolksbankRecord {
    fn to_homebank(&self) -> HomebankRecord {
        let mut h = HomebankRecord::new(self.booking_date, self.amount);
        h.payee = self.payee.clone();
        h.memo = self.purpose.clone();
        h
    }
}

#[derive(Debug, Default)]
pub struct VolksbankParser {
    entries: Vec<VolksbankRecord>,
}

impl Parser for VolksbankParser {
    fn parse(&mut self, file_path: &Path) -> ParseResult<()> {
        self.entries.clear();
        let records = read_utf8_records(file_path, b';')?;
        let Some(header) = records.first() else {
            return Err(ParserError::header(0));
        };
        if !is_valid_header(header.iter(), &HEADER) {
            return Err(ParserError::header(line_of(header)));
        }

        let mut entries = Vec::new();
        for row in &records[1..] {
            if row.len() != HEADER.len() {
                continue;
            }
            let line = line_of(row);
            let booking_date = parse_date(&row[COL_BOOKING_DATE], "%d.%m.%Y")
                .ok_or_else(|| ParserError::data(line, "Buchungstag"))?;
            let amount = parse_amount_de(&row[COL_AMOUNT])
                .ok_or_else(|| ParserError::data(line, "Betrag"))?;
            entries.push(VolksbankRecord {
                booking_date,
                payee: row[COL_PAYEE].to_string(),
                purpose: row[COL_PURPOSE].to_string(),
                amount,
            });
        }
        self.entries = entries;
        Ok(())
    }

    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::Volksbank
    }

    fn to_homebank(&self) -> Vec<HomebankRecord> {
        self.entries.iter().map(|e| e.to_homebank()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParserErrorKind;
    use crate::parser::fixtures;

    fn parse_content(content: &str) -> (VolksbankParser, ParseResult<()>) {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write(dir.path(), "vb.csv", content);
        let mut parser = VolksbankParser::default();
        let result = parser.parse(&path);
        (parser, result)
    }

    fn row(date: &str, amount: &str) -> String {
        format!(
            "Girokonto;DE1;BIC;Volksbank;{date};{date};Payee;DE2;BIC2;Text;Purpose;{amount};EUR;0,00;;;;"
        )
    }

    #[test]
    fn test_parse_ok() {
        let (parser, result) = parse_content(&fixtures::volksbank());
        result.unwrap();
        assert_eq!(parser.entry_count(), 2);
        let e = &parser.entries[0];
        assert_eq!(e.booking_date, NaiveDate::from_ymd_opt(2023, 10, 4).unwrap());
        assert_eq!(e.payee, "Hausverwaltung Meier");
        assert_eq!(e.purpose, "Miete Oktober");
        assert_eq!(e.amount, Decimal::new(-75000, 2));
        assert_eq!(parser.entries[1].amount, Decimal::new(250000, 2));
    }

    #[test]
    fn test_parse_non_existing_file() {
        let mut parser = VolksbankParser::default();
        let err = parser.parse(Path::new("does_not_exist.csv")).unwrap_err();
        assert_eq!(err.kind, ParserErrorKind::Io);
        assert_eq!(parser.entry_count(), 0);
    }

    #[test]
    fn test_parse_empty_file() {
        let (_, result) = parse_content("");
        let err = result.unwrap_err();
        assert_eq!(err.kind, ParserErrorKind::Header);
        assert_eq!(err.line, 0);
    }

    #[test]
    fn test_parse_header_mutations_rejected() {
        for i in 0..HEADER.len() {
            let mut header = HEADER.to_vec();
            header[i] = "Unbekannt";
            let (parser, result) = parse_content(&format!("{}\n{}\n", header.join(";"), row("01.10.2023", "1,00")));
            let err = result.unwrap_err();
            assert_eq!(err.kind, ParserErrorKind::Header, "column {i}");
            assert_eq!(err.line, 1);
            assert_eq!(parser.entry_count(), 0);
        }
    }

    #[test]
    fn test_parse_wrong_date() {
        let content = format!(
            "{}\n{}\n{}\n",
            fixtures::VOLKSBANK_HEADER,
            row("01.10.2023", "1,00"),
            row("2023-10-02", "1,00")
        );
        let (parser, result) = parse_content(&content);
        let err = result.unwrap_err();
        assert_eq!(err.kind, ParserErrorKind::DataParsing);
        assert_eq!(err.line, 3);
        assert_eq!(err.field.as_deref(), Some("Buchungstag"));
        assert_eq!(parser.entry_count(), 0);
    }

    #[test]
    fn test_parse_wrong_amount() {
        let content = format!("{}\n{}\n", fixtures::VOLKSBANK_HEADER, row("01.10.2023", "zehn"));
        let (_, result) = parse_content(&content);
        let err = result.unwrap_err();
        assert_eq!(err.kind, ParserErrorKind::DataParsing);
        assert_eq!(err.line, 2);
        assert_eq!(err.field.as_deref(), Some("Betrag"));
    }

    #[test]
    fn test_short_rows_are_ignored() {
        let content = format!(
            "{}\n{}\nAbschluss;;\n",
            fixtures::VOLKSBANK_HEADER,
            row("01.10.2023", "-1.000,50")
        );
        let (parser, result) = parse_content(&content);
        result.unwrap();
        assert_eq!(parser.entry_count(), 1);
        assert_eq!(parser.entries[0].amount, Decimal::new(-100050, 2));
    }

    #[test]
    fn test_convert_record() {
        let r = VolksbankRecord {
            booking_date: NaiveDate::from_ymd_opt(2019, 8, 5).unwrap(),
            payee: "Payee".to_string(),
            purpose: "Verwendungszweck".to_string(),
            amount: Decimal::new(-13940, 2),
        };
        let h = r.to_homebank();
        assert_eq!(h.date, r.booking_date);
        assert_eq!(h.payee, "Payee");
        assert_eq!(h.memo, "Verwendungszweck");
        assert_eq!(h.amount, r.amount);
        assert!(h.info.is_empty() && h.category.is_empty());
    }
}
