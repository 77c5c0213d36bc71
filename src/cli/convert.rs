use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::parser::{load_parser, Parser, SourceFormat};

pub fn run(infile: &Path, outfile: &Path, format: Option<SourceFormat>) -> Result<()> {
    if !infile.is_file() {
        return Err(ConvertError::Other(format!(
            "input file '{}' does not exist",
            infile.display()
        )));
    }

    let format_desc = match format {
        Some(format) => format!("format '{format}'"),
        None => "autodetect format".to_string(),
    };
    println!(
        "Converting file '{}' ({format_desc}) to file '{}'",
        infile.display(),
        outfile.display()
    );

    let parser = load_parser(infile, format)?;
    if format.is_none() {
        println!("Detected format '{}'", parser.format());
    }
    println!("Found {} entries", parser.entry_count());
    parser.convert_to_homebank(outfile)
}
