use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::{
    find_header, first_n_words, line_of, parse_amount_de, parse_date, read_latin1_records,
    ParseResult, Parser, SourceFormat,
};
use crate::error::ParserError;
use crate::models::HomebankRecord;

// The export ends every line with a delimiter, hence the trailing empty column.
const HEADER: [&str; 6] = [
    "Buchungstag",
    "Wertstellung (Valuta)",
    "Vorgang",
    "Buchungstext",
    "Umsatz in EUR",
    "",
];

const LABELS: [&str; 5] = ["Auftraggeber", "Buchungstext", "Empfänger", "Kto/IBAN", "BLZ/BIC"];

const PENDING: &str = "offen";
const CARD_PAYMENT: &str = "Kartenverfügung";

#[derive(Debug, Clone, PartialEq)]
struct ComdirectRecord {
    booking_date: NaiveDate,
    transaction_type: String,
    full_text: String,
    ordering_party: String,
    booking_text: String,
    recipient: String,
    amount: Decimal,
}

impl ComdirectRecord {
    fn to_homebank(&self) -> HomebankRecord {
        let mut h = HomebankRecord::new(self.booking_date, self.amount);
        h.memo = self.full_text.clone();
        h.info = first_n_words(3, &self.booking_text);

        // Only outgoing transactions get a payee.
        if self.amount < Decimal::ZERO {
            h.payee = if !self.ordering_party.is_empty() {
                self.ordering_party.clone()
            } else if self.transaction_type == CARD_PAYMENT {
                first_n_words(4, &self.booking_text)
            } else {
                self.recipient.clone()
            };
        }
        h
    }
}

/// Split a comdirect "Buchungstext" into its labelled parts.
///
/// `"Auftraggeber: A Buchungstext: B"` with labels `["Auftraggeber", "Buchungstext"]`
/// yields `{"Auftraggeber": "A", "Buchungstext": "B"}`. Each value runs up to
/// the next label found in the text, whatever order `labels` is given in.
pub fn split_labelled_fields(labels: &[&str], text: &str) -> HashMap<String, String> {
    let mut starts: BTreeMap<usize, &str> = BTreeMap::new();
    for &label in labels {
        let marker = format!("{label}:");
        let Some(pos) = text.find(&marker) else {
            continue;
        };
        match starts.get(&pos) {
            Some(existing) if existing.len() >= label.len() => {}
            _ => {
                starts.insert(pos, label);
            }
        }
    }

    let positions: Vec<(usize, &str)> = starts.into_iter().collect();
    let mut result = HashMap::with_capacity(positions.len());
    for (i, &(start, label)) in positions.iter().enumerate() {
        let end = positions.get(i + 1).map_or(text.len(), |&(next, _)| next);
        let value_start = (start + label.len() + 1).min(end);
        result.insert(label.to_string(), text[value_start..end].trim().to_string());
    }
    result
}

/// comdirect giro account exports. ISO-8859-1, with a preamble before the
/// header and a closing balance after the data.
#[derive(Debug, Default)]
pub struct ComdirectParser {
    entries: Vec<ComdirectRecord>,
}

impl Parser for ComdirectParser {
    fn parse(&mut self, file_path: &Path) -> ParseResult<()> {
        self.entries.clear();
        let records = read_latin1_records(file_path, b';')?;
        let header_idx = find_header(&records, &HEADER).ok_or_else(|| ParserError::header(0))?;
        debug!("comdirect header on line {}", line_of(&records[header_idx]));

        let mut entries = Vec::new();
        for row in &records[header_idx + 1..] {
            if row.len() != HEADER.len() || &row[0] == PENDING {
                continue;
            }
            let line = line_of(row);
            let booking_date = parse_date(&row[0], "%d.%m.%Y")
                .ok_or_else(|| ParserError::data(line, "Buchungstag"))?;
            let amount =
                parse_amount_de(&row[4]).ok_or_else(|| ParserError::data(line, "Umsatz in EUR"))?;

            let mut parts = split_labelled_fields(&LABELS, &row[3]);
            let mut take = |label: &str| parts.remove(label).unwrap_or_default();
            entries.push(ComdirectRecord {
                booking_date,
                transaction_type: row[2].to_string(),
                full_text: row[3].to_string(),
                ordering_party: take("Auftraggeber"),
                booking_text: take("Buchungstext"),
                recipient: take("Empfänger"),
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
        SourceFormat::Comdirect
    }

    fn to_homebank(&self) -> Vec<HomebankRecord> {
        self.entries.iter().map(|e| e.to_homebank()).collect()
    }
}
