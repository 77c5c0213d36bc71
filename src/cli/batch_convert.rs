use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use colored::{ColoredString, Colorize};

use crate::batch::{batch_convert, BatchStatus, ConversionStatus, FileStatus};
use crate::error::{ConvertError, Result};
use crate::settings::Settings;

/// Last status printed per input file, so repeated callbacks print only changes.
type LastSeen = HashMap<PathBuf, ConversionStatus>;

pub fn run(config: Option<&Path>) -> Result<()> {
    let (config_path, settings) = match config {
        Some(path) => (path.to_path_buf(), Settings::load_from_file(path)?),
        None => Settings::load_default()?,
    };
    println!("Loaded configuration from {}", config_path.display());

    settings.check_validity()?;
    let sets = &settings.batch_convert.sets;
    if sets.is_empty() {
        return Err(ConvertError::Settings(
            "no batch convert sets defined in config file".to_string(),
        ));
    }
    println!("Found {} sets:", sets.len());
    for set in sets {
        println!("  {} : {}", set.name.bold(), set.input_dir.display());
    }

    println!("Batch convert starting ...");
    let mut last_seen = LastSeen::new();
    let status = batch_convert(sets, Utc::now(), print_changes, &mut last_seen)?;
    for set in &status {
        let (done, left) = set.stats();
        println!("{}: {done} done, {left} left", set.name);
    }
    println!("Batch convert finished");
    Ok(())
}

fn status_label(status: ConversionStatus) -> Option<ColoredString> {
    let label = status.to_string();
    match status {
        ConversionStatus::NotStarted => None,
        ConversionStatus::Skipped => Some(label.dimmed()),
        ConversionStatus::InProgress => Some(label.yellow()),
        ConversionStatus::Error => Some(label.red().bold()),
        ConversionStatus::Success => Some(label.green()),
    }
}

fn changed_files<'a>(status: &'a BatchStatus, last_seen: &mut LastSeen) -> Vec<&'a FileStatus> {
    status
        .iter()
        .flat_map(|set| &set.files)
        .filter(|file| last_seen.insert(file.input_file.clone(), file.status) != Some(file.status))
        .collect()
}

fn print_changes(status: &BatchStatus, last_seen: &mut LastSeen) {
    for file in changed_files(status, last_seen) {
        let Some(label) = status_label(file.status) else {
            continue;
        };
        match (&file.output_file, file.format) {
            (Some(output), Some(format)) if file.status == ConversionStatus::Success => println!(
                "  {label}: {} -> {} ({format})",
                file.input_file.display(),
                output.display()
            ),
            _ => println!("  {label}: {}", file.input_file.display()),
        }
    }
}
