use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::context::DEFAULT_CONTEXT_WINDOW;
use crate::highlight::DEFAULT_WORD_DIFF_MAX_LINE_LENGTH;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub context_lines: Option<u32>,
    pub word_diff_max_line_length: Option<usize>,
    pub format: Option<OutputFormat>,
}

impl AppConfig {
    pub fn context_lines(&self) -> u32 {
        self.context_lines.unwrap_or(DEFAULT_CONTEXT_WINDOW)
    }

    pub fn word_diff_max_line_length(&self) -> usize {
        self.word_diff_max_line_length
            .unwrap_or(DEFAULT_WORD_DIFF_MAX_LINE_LENGTH)
    }

    pub fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLoadOutcome {
    pub config: Option<AppConfig>,
    pub warnings: Vec<String>,
}

const KNOWN_KEYS: &[&str] = &["context_lines", "word_diff_max_line_length", "format"];

pub fn config_path() -> Result<PathBuf> {
    let xdg_config_home = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let appdata = std::env::var_os("APPDATA").map(PathBuf::from);

    config_path_from_parts(xdg_config_home, home, appdata)
}

pub fn config_path_hint() -> &'static str {
    #[cfg(windows)]
    {
        r"%APPDATA%\voom\config.toml"
    }

    #[cfg(not(windows))]
    {
        "$XDG_CONFIG_HOME/voom/config.toml (default: ~/.config/voom/config.toml)"
    }
}

fn config_path_from_parts(
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
    _appdata: Option<PathBuf>,
) -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let base = _appdata
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| anyhow!("Could not determine APPDATA for config directory"))?;
        return Ok(base.join("voom").join("config.toml"));
    }

    #[cfg(not(windows))]
    {
        if let Some(base) = xdg_config_home.filter(|p| !p.as_os_str().is_empty()) {
            return Ok(base.join("voom").join("config.toml"));
        }

        let home = home
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| anyhow!("Could not determine HOME for config directory"))?;
        Ok(home.join(".config").join("voom").join("config.toml"))
    }
}

pub fn load_config() -> Result<ConfigLoadOutcome> {
    let path = config_path()?;
    load_config_from_path(&path)
}

fn load_config_from_path(path: &Path) -> Result<ConfigLoadOutcome> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(ConfigLoadOutcome::default()),
        Err(err) => return Err(err.into()),
    };

    let value: Value = toml::from_str(&contents)?;
    let table = value
        .as_table()
        .ok_or_else(|| anyhow!("Config root must be a TOML table"))?;

    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    config.context_lines = positive_integer(table, "context_lines", &mut warnings)
        .and_then(|n| u32::try_from(n).ok());
    config.word_diff_max_line_length =
        positive_integer(table, "word_diff_max_line_length", &mut warnings)
            .and_then(|n| usize::try_from(n).ok());

    if let Some(format) = table.get("format") {
        match format.as_str().and_then(OutputFormat::parse) {
            Some(format) => config.format = Some(format),
            None => warnings.push(
                "Warning: Config key 'format' must be \"text\" or \"json\"; ignoring value"
                    .to_string(),
            ),
        }
    }

    for key in table.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warnings.push(format!("Warning: Unknown config key '{key}', ignoring"));
        }
    }

    Ok(ConfigLoadOutcome {
        config: Some(config),
        warnings,
    })
}

fn positive_integer(table: &Table, key: &str, warnings: &mut Vec<String>) -> Option<i64> {
    let value = table.get(key)?;
    match value.as_integer() {
        Some(n) if n >= 1 && n <= i64::from(u32::MAX) => Some(n),
        _ => {
            warnings.push(format!(
                "Warning: Config key '{key}' must be a positive integer; ignoring value"
            ));
            None
        }
    }
}
