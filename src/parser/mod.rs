//! Parsers for the supported bank export formats.
//!
//! Every format has its own parser struct implementing [`Parser`]. The
//! closed set of parsers is wrapped in [`FormatParser`] so callers can pick
//! one by [`SourceFormat`] or let [`guess_parser`] find it.

mod barclaycard;
mod comdirect;
mod dkb;
mod moneywallet;
mod volksbank;

#[cfg(test)]
pub(crate) mod fixtures;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConvertError, ParserError, Result};
use crate::homebank::write_homebank_file;
use crate::models::HomebankRecord;

pub use barclaycard::BarclaycardParser;
pub use comdirect::ComdirectParser;
pub use dkb::DkbParser;
pub use moneywallet::MoneyWalletParser;
pub use volksbank::VolksbankParser;

pub type ParseResult<T> = std::result::Result<T, ParserError>;

// ---------------------------------------------------------------------------
// Source formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceFormat {
    MoneyWallet,
    Barclaycard,
    Volksbank,
    Comdirect,
    Dkb,
}

impl SourceFormat {
    /// All formats, in the order autodetection tries them.
    pub const ALL: [SourceFormat; 5] = [
        SourceFormat::MoneyWallet,
        SourceFormat::Barclaycard,
        SourceFormat::Volksbank,
        SourceFormat::Comdirect,
        SourceFormat::Dkb,
    ];

    /// Stable name used on the command line and in the config file.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoneyWallet => "MoneyWallet",
            Self::Barclaycard => "Barclaycard",
            Self::Volksbank => "Volksbank",
            Self::Comdirect => "Comdirect",
            Self::Dkb => "DKB",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::MoneyWallet => "MoneyWallet expense tracker export (CSV)",
            Self::Barclaycard => "Barclaycard credit card transactions (XLSX)",
            Self::Volksbank => "Volksbank giro account (CSV)",
            Self::Comdirect => "comdirect giro account (CSV, ISO-8859-1)",
            Self::Dkb => "DKB giro account (CSV)",
        }
    }

    /// A fresh, empty parser for this format.
    pub fn parser(&self) -> FormatParser {
        match self {
            Self::MoneyWallet => FormatParser::MoneyWallet(MoneyWalletParser::default()),
            Self::Barclaycard => FormatParser::Barclaycard(BarclaycardParser::default()),
            Self::Volksbank => FormatParser::Volksbank(VolksbankParser::default()),
            Self::Comdirect => FormatParser::Comdirect(ComdirectParser::default()),
            Self::Dkb => FormatParser::Dkb(DkbParser::default()),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        SourceFormat::ALL
            .iter()
            .find(|f| f.name() == s)
            .copied()
            .ok_or_else(|| ConvertError::UnknownFormat(s.to_string()))
    }
}

impl TryFrom<String> for SourceFormat {
    type Error = ConvertError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SourceFormat> for String {
    fn from(format: SourceFormat) -> Self {
        format.name().to_string()
    }
}

// ---------------------------------------------------------------------------
// Parser capability
// ---------------------------------------------------------------------------

pub trait Parser {
    /// Read `file_path` into the parser's entry list, replacing previous entries.
    ///
    /// On error the entry list is left empty.
    fn parse(&mut self, file_path: &Path) -> ParseResult<()>;

    fn entry_count(&self) -> usize;

    fn format(&self) -> SourceFormat;

    /// The parsed entries as HomeBank records, in file order.
    fn to_homebank(&self) -> Vec<HomebankRecord>;

    /// Write the parsed entries as a HomeBank CSV file.
    fn convert_to_homebank(&self, file_path: &Path) -> Result<()> {
        write_homebank_file(&self.to_homebank(), file_path)
    }
}

/// One parser per supported format, dispatched by variant.
#[derive(Debug)]
pub enum FormatParser {
    MoneyWallet(MoneyWalletParser),
    Barclaycard(BarclaycardParser),
    Volksbank(VolksbankParser),
    Comdirect(ComdirectParser),
    Dkb(DkbParser),
}

impl FormatParser {
    fn inner(&self) -> &dyn Parser {
        match self {
            Self::MoneyWallet(p) => p,
            Self::Barclaycard(p) => p,
            Self::Volksbank(p) => p,
            Self::Comdirect(p) => p,
            Self::Dkb(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Parser {
        match self {
            Self::MoneyWallet(p) => p,
            Self::Barclaycard(p) => p,
            Self::Volksbank(p) => p,
            Self::Comdirect(p) => p,
            Self::Dkb(p) => p,
        }
    }
}

impl Parser for FormatParser {
    fn parse(&mut self, file_path: &Path) -> ParseResult<()> {
        self.inner_mut().parse(file_path)
    }

    fn entry_count(&self) -> usize {
        self.inner().entry_count()
    }

    fn format(&self) -> SourceFormat {
        self.inner().format()
    }

    fn to_homebank(&self) -> Vec<HomebankRecord> {
        self.inner().to_homebank()
    }

    fn convert_to_homebank(&self, file_path: &Path) -> Result<()> {
        self.inner().convert_to_homebank(file_path)
    }
}

/// Try every format in [`SourceFormat::ALL`] order and return the first
/// parser that reads `file_path` without error, already parsed.
///
/// This is first match, not best match: a file that happens to satisfy an
/// earlier format is reported as that format.
pub fn guess_parser(file_path: &Path) -> Option<FormatParser> {
    for format in SourceFormat::ALL {
        let mut parser = format.parser();
        match parser.parse(file_path) {
            Ok(()) => {
                debug!("{} detected as {format}", file_path.display());
                return Some(parser);
            }
            Err(e) => debug!("{} is not {format}: {e}", file_path.display()),
        }
    }
    None
}

/// Parse `file_path` with the given format, or autodetect it when `format`
/// is `None`.
pub fn load_parser(file_path: &Path, format: Option<SourceFormat>) -> Result<FormatParser> {
    match format {
        Some(format) => {
            let mut parser = format.parser();
            parser.parse(file_path)?;
            Ok(parser)
        }
        None => guess_parser(file_path)
            .ok_or_else(|| ConvertError::NoFormatDetected(file_path.to_path_buf())),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn read_file(file_path: &Path) -> ParseResult<Vec<u8>> {
    std::fs::read(file_path).map_err(|_| ParserError::io())
}

/// Read all records of a UTF-8 delimited file. A leading BOM is ignored.
pub(crate) fn read_utf8_records(file_path: &Path, delimiter: u8) -> ParseResult<Vec<StringRecord>> {
    let data = read_file(file_path)?;
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(&data);
    read_records(data, delimiter)
}

/// Read all records of an ISO-8859-1 encoded delimited file.
pub(crate) fn read_latin1_records(file_path: &Path, delimiter: u8) -> ParseResult<Vec<StringRecord>> {
    let data = read_file(file_path)?;
    let text = decode_latin1(&data);
    read_records(text.as_bytes(), delimiter)
}

/// ISO-8859-1 maps every byte to the code point of the same value.
pub fn decode_latin1(data: &[u8]) -> String {
    data.iter().map(|&b| char::from(b)).collect()
}

fn read_records(data: &[u8], delimiter: u8) -> ParseResult<Vec<StringRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(data);
    rdr.records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| ParserError::io())
}

/// 1-based line on which `record` starts in the source file.
pub(crate) fn line_of(record: &StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

pub(crate) fn is_valid_header<'a, I>(fields: I, expected: &[&str]) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fields = fields.into_iter();
    for want in expected {
        match fields.next() {
            Some(got) if got == *want => {}
            _ => return false,
        }
    }
    fields.next().is_none()
}

pub(crate) fn find_header(records: &[StringRecord], expected: &[&str]) -> Option<usize> {
    records
        .iter()
        .position(|record| is_valid_header(record.iter(), expected))
}

/// Parse a date like "31.12.2024" (`%d.%m.%Y`) or any other chrono format.
pub fn parse_date(raw: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), format).ok()
}

pub fn parse_datetime(raw: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), format).ok()
}

fn strip_currency(raw: &str) -> String {
    raw.replace('€', "")
        .replace("EUR", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Parse a German style amount: thousands dot, decimal comma and an
/// optional currency suffix, e.g. "-1.234,56 €".
pub fn parse_amount_de(raw: &str) -> Option<Decimal> {
    let s = strip_currency(raw).replace('.', "").replace(',', ".");
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(&s).ok()
}

/// Parse a plain decimal amount; a comma is accepted as decimal separator.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim().replace(',', ".");
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(&s).ok()
}

/// The first `n` whitespace separated words of `s`, joined by single spaces.
/// Returns `s` unchanged if it has fewer than `n` words.
pub fn first_n_words(n: usize, s: &str) -> String {
    if n == 0 {
        return String::new();
    }
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() < n {
        return s.to_string();
    }
    words[..n].join(" ")
}
