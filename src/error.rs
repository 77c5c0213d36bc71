use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// What went wrong while reading a bank export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserErrorKind {
    /// The file could not be opened or decoded.
    Io,
    /// No row matching the expected header was found.
    Header,
    /// A field of a data row could not be parsed.
    DataParsing,
}

impl fmt::Display for ParserErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Io => "IOError",
            Self::Header => "HeaderError",
            Self::DataParsing => "DataParsingError",
        };
        f.write_str(s)
    }
}

/// Structured error returned by every parser.
///
/// `line` is 1-based; 0 means no specific row is implicated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}{}{}", line_suffix(.line), field_suffix(.field))]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub line: usize,
    pub field: Option<String>,
}

fn line_suffix(line: &usize) -> String {
    if *line > 0 {
        format!(" in line {line}")
    } else {
        String::new()
    }
}

fn field_suffix(field: &Option<String>) -> String {
    match field {
        Some(name) if !name.is_empty() => format!(" in field name '{name}'"),
        _ => String::new(),
    }
}

impl ParserError {
    pub fn io() -> Self {
        Self {
            kind: ParserErrorKind::Io,
            line: 0,
            field: None,
        }
    }

    pub fn header(line: usize) -> Self {
        Self {
            kind: ParserErrorKind::Header,
            line,
            field: None,
        }
    }

    pub fn data(line: usize, field: &str) -> Self {
        Self {
            kind: ParserErrorKind::DataParsing,
            line,
            field: Some(field.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Parser(#[from] ParserError),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("cannot deduce format for file '{}'", .0.display())]
    NoFormatDetected(PathBuf),

    #[error("Invalid batch convert set: {0}")]
    InvalidSet(String),

    #[error("Output directory is not a directory: {}", .0.display())]
    OutputDirNotDir(PathBuf),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
