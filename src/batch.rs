//! Batch conversion of whole directories of bank exports.
//!
//! Every configured set is scanned for input files, which are converted into
//! the set's output directory unless a converted file already exists there.
//! Progress is reported through a callback that sees the full status tree
//! after every change.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::error::{ConvertError, Result};
use crate::homebank;
use crate::parser::{load_parser, Parser, SourceFormat};
use crate::settings::{check_sets_validity, BatchConvertSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConversionStatus {
    #[default]
    NotStarted,
    /// The output file already existed.
    Skipped,
    InProgress,
    Error,
    Success,
}

impl ConversionStatus {
    pub fn can_transition_to(self, next: ConversionStatus) -> bool {
        use ConversionStatus::*;
        matches!(
            (self, next),
            (NotStarted, Skipped) | (NotStarted, InProgress) | (InProgress, Error) | (InProgress, Success)
        )
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "Not started",
            Self::Skipped => "Skipped",
            Self::InProgress => "In Progress",
            Self::Error => "Failed",
            Self::Success => "Success",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileStatus {
    pub input_file: PathBuf,
    /// Set once the file is picked up.
    pub output_file: Option<PathBuf>,
    pub status: ConversionStatus,
    /// The format used, once the conversion succeeded.
    pub format: Option<SourceFormat>,
}

impl FileStatus {
    fn new(input_file: PathBuf) -> Self {
        Self {
            input_file,
            output_file: None,
            status: ConversionStatus::NotStarted,
            format: None,
        }
    }

    pub fn set_status(&mut self, next: ConversionStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal status transition {} -> {next} for {}",
            self.status,
            self.input_file.display()
        );
        self.status = next;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSetStatus {
    pub name: String,
    pub files: Vec<FileStatus>,
}

impl BatchSetStatus {
    /// Number of files already handled and number still waiting.
    pub fn stats(&self) -> (usize, usize) {
        let left = self
            .files
            .iter()
            .filter(|f| f.status == ConversionStatus::NotStarted)
            .count();
        (self.files.len() - left, left)
    }
}

/// One entry per set, in configuration order.
pub type BatchStatus = Vec<BatchSetStatus>;

/// Oldest modification time a file may have; `None` when age is unlimited.
pub fn min_time_from_max_age_days(max_age_days: i64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if max_age_days <= 0 {
        return None;
    }
    Some(now - Duration::days(max_age_days))
}

/// Regular files in `input_dir` whose name matches `pattern` (empty matches
/// everything) and, if given, were modified at or after `min_time`. Sorted by
/// path. An input directory that cannot be listed yields no files.
pub fn find_files(
    input_dir: &Path,
    pattern: &str,
    min_time: Option<DateTime<Utc>>,
) -> Result<Vec<PathBuf>> {
    let pattern = if pattern.is_empty() { "*" } else { pattern };
    let matcher = glob::Pattern::new(pattern)
        .map_err(|e| ConvertError::InvalidSet(format!("file_glob_pattern '{pattern}': {e}")))?;

    let entries = match std::fs::read_dir(input_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("input directory {} does not exist", input_dir.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            warn!("cannot read input directory {}: {e}", input_dir.display());
            return Ok(Vec::new());
        }
    };

    let mut files = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !matcher.matches(name) {
            continue;
        }
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(e) => {
                warn!("cannot stat {}: {e}", path.display());
                continue;
            }
        };
        if let Some(min_time) = min_time {
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            let modified: DateTime<Utc> = modified.into();
            if modified < min_time {
                debug!("{} is too old", path.display());
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// `<output_dir>/<input file stem>.csv`
pub fn output_path_for(input_file: &Path, output_dir: &Path) -> PathBuf {
    let mut name = input_file.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(homebank::EXTENSION);
    output_dir.join(name)
}

fn convert_file(input: &Path, output: &Path, format: Option<SourceFormat>) -> Result<SourceFormat> {
    let parser = load_parser(input, format)?;
    parser.convert_to_homebank(output)?;
    Ok(parser.format())
}

/// Convert all files of all `sets`, calling `callback` after every status
/// change with the whole status tree and the caller's `context`.
///
/// Sets are validated before anything is read. Per-file failures are
/// recorded as [`ConversionStatus::Error`]; only invalid sets and unusable
/// output directories abort the run.
pub fn batch_convert<T, F>(
    sets: &[BatchConvertSet],
    now: DateTime<Utc>,
    mut callback: F,
    context: &mut T,
) -> Result<BatchStatus>
where
    F: FnMut(&BatchStatus, &mut T),
{
    let mut status = BatchStatus::new();
    if sets.is_empty() {
        return Ok(status);
    }
    check_sets_validity(sets)?;

    for set in sets {
        let metadata = std::fs::metadata(&set.output_dir)?;
        if !metadata.is_dir() {
            return Err(ConvertError::OutputDirNotDir(set.output_dir.clone()));
        }

        let min_time = min_time_from_max_age_days(set.file_max_age_days, now);
        let files = find_files(&set.input_dir, &set.file_glob_pattern, min_time)?;
        info!("set '{}': {} candidate file(s)", set.name, files.len());

        let set_idx = status.len();
        status.push(BatchSetStatus {
            name: set.name.clone(),
            files: files.into_iter().map(FileStatus::new).collect(),
        });
        callback(&status, context);

        for file_idx in 0..status[set_idx].files.len() {
            let entry = &mut status[set_idx].files[file_idx];
            let input = entry.input_file.clone();
            let output = output_path_for(&input, &set.output_dir);
            entry.output_file = Some(output.clone());

            if output.exists() {
                debug!("{} already converted", input.display());
                entry.set_status(ConversionStatus::Skipped);
                callback(&status, context);
                continue;
            }

            entry.set_status(ConversionStatus::InProgress);
            callback(&status, context);

            let result = convert_file(&input, &output, set.format);
            let entry = &mut status[set_idx].files[file_idx];
            match result {
                Ok(format) => {
                    info!("converted {} as {format}", input.display());
                    entry.format = Some(format);
                    entry.set_status(ConversionStatus::Success);
                }
                Err(e) => {
                    warn!("{}: {e}", input.display());
                    entry.set_status(ConversionStatus::Error);
                }
            }
            callback(&status, context);
        }
    }
    Ok(status)
}
