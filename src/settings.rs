use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::parser::SourceFormat;

const APP_DIR: &str = "homebank-csv";
const CONFIG_FILE: &str = "config.json";

/// One directory of bank exports to convert in a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConvertSet {
    /// Unique name of the set.
    pub name: String,
    pub input_dir: PathBuf,
    /// Must differ from `input_dir`.
    pub output_dir: PathBuf,
    /// `None` means autodetect per file.
    pub format: Option<SourceFormat>,
    /// Glob on file names; empty matches every file.
    pub file_glob_pattern: String,
    /// Only files modified within this many days are converted; 0 means no limit.
    pub file_max_age_days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConvertSettings {
    pub sets: Vec<BatchConvertSet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub batch_convert: BatchConvertSettings,
}

impl Settings {
    pub fn load_from_str(content: &str) -> Result<Self> {
        let mut settings: Settings =
            serde_json::from_str(content).map_err(|e| ConvertError::Settings(e.to_string()))?;
        settings.normalize_paths()?;
        Ok(settings)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::Settings(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::load_from_str(&content)
    }

    /// Load `<config dir>/homebank-csv/config.json`, returning the path used.
    pub fn load_default() -> Result<(PathBuf, Self)> {
        let path = default_config_path()?;
        if !path.is_file() {
            return Err(ConvertError::Settings(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let settings = Self::load_from_file(&path)?;
        Ok((path, settings))
    }

    pub fn check_validity(&self) -> Result<()> {
        check_sets_validity(&self.batch_convert.sets)
    }

    /// Expand `~` and `xdg:` shortcuts in every configured directory.
    pub fn normalize_paths(&mut self) -> Result<()> {
        for set in &mut self.batch_convert.sets {
            set.normalize_paths().map_err(|e| {
                ConvertError::Settings(format!("batch convert set '{}': {e}", set.name))
            })?;
        }
        Ok(())
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| ConvertError::Settings("cannot determine config directory".into()))?;
    Ok(dir.join(APP_DIR).join(CONFIG_FILE))
}

impl BatchConvertSet {
    pub fn check_validity(&self) -> Result<()> {
        let invalid = |msg: &str| Err(ConvertError::InvalidSet(msg.to_string()));
        if self.name.is_empty() {
            return invalid("name is empty");
        }
        if self.input_dir.as_os_str().is_empty() {
            return invalid("input_dir is empty");
        }
        if self.output_dir.as_os_str().is_empty() {
            return invalid("output_dir is empty");
        }
        if self.input_dir == self.output_dir {
            return invalid("input_dir == output_dir");
        }
        if self.file_max_age_days < 0 {
            return invalid("file_max_age_days < 0");
        }
        if glob::Pattern::new(&self.file_glob_pattern).is_err() {
            return invalid("file_glob_pattern is invalid");
        }
        // The pattern is matched against file names inside input_dir only.
        if self.file_glob_pattern.contains(['/', std::path::MAIN_SEPARATOR]) {
            return invalid("file_glob_pattern contains a path separator");
        }
        Ok(())
    }

    fn normalize_paths(&mut self) -> std::result::Result<(), String> {
        self.input_dir = expand_path(&self.input_dir).map_err(|e| format!("input_dir: {e}"))?;
        self.output_dir = expand_path(&self.output_dir).map_err(|e| format!("output_dir: {e}"))?;
        Ok(())
    }
}

/// Validate every set, then reject duplicate names and duplicate
/// input directory / glob pattern combinations.
pub fn check_sets_validity(sets: &[BatchConvertSet]) -> Result<()> {
    let mut names = HashSet::new();
    let mut sources = HashSet::new();
    for set in sets {
        set.check_validity()?;
        if !names.insert(set.name.as_str()) {
            return Err(ConvertError::InvalidSet(format!(
                "duplicate name '{}' detected",
                set.name
            )));
        }
        if !sources.insert((set.input_dir.as_path(), set.file_glob_pattern.as_str())) {
            return Err(ConvertError::InvalidSet(format!(
                "duplicate input_dir / file_glob_pattern combination detected ('{}', '{}')",
                set.input_dir.display(),
                set.file_glob_pattern
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Path shortcuts
// ---------------------------------------------------------------------------

fn expand_path(raw: &Path) -> std::result::Result<PathBuf, String> {
    let Some(text) = raw.to_str() else {
        return Ok(raw.to_path_buf());
    };
    if text.is_empty() {
        return Ok(PathBuf::new());
    }
    let expanded = if text.starts_with('~') {
        expand_home(text)?
    } else if text.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("xdg:")) {
        expand_xdg(&text[4..])?
    } else {
        PathBuf::from(text)
    };
    Ok(clean(&expanded))
}

fn split_first_segment(s: &str) -> (&str, &str) {
    match s.find(['/', '\\']) {
        Some(idx) => (&s[..idx], s[idx..].trim_start_matches(['/', '\\'])),
        None => (s, ""),
    }
}

fn expand_home(text: &str) -> std::result::Result<PathBuf, String> {
    let (head, rest) = split_first_segment(text);
    if head != "~" {
        return Err(format!("unsupported home shortcut '{text}'"));
    }
    let home = dirs::home_dir().ok_or("cannot resolve home directory")?;
    Ok(join_rest(home, rest))
}

fn expand_xdg(token_and_rest: &str) -> std::result::Result<PathBuf, String> {
    let (token, rest) = split_first_segment(token_and_rest);
    let base = match token.to_ascii_lowercase().as_str() {
        "documents" => dirs::document_dir().ok_or("xdg documents directory not found")?,
        "downloads" => dirs::download_dir().ok_or("xdg downloads directory not found")?,
        other => return Err(format!("unknown xdg shortcut '{other}'")),
    };
    Ok(join_rest(base, rest))
}

fn join_rest(base: PathBuf, rest: &str) -> PathBuf {
    if rest.is_empty() {
        base
    } else {
        base.join(rest)
    }
}

/// Lexically drop `.` components and repeated separators.
fn clean(path: &Path) -> PathBuf {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}
