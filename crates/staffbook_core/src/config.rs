//! Store configuration.
//!
//! # Responsibility
//! - Describe where documents live and how logging is set up.
//! - Load that description from TOML and reject unusable values early.
//!
//! # Invariants
//! - Directory and file names are single relative path components, so every
//!   document stays under `root`.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};

const DEFAULT_STAFF_DIR: &str = "staff";
const DEFAULT_TRANSCRIPTS_DIR: &str = "transcripts";
const DEFAULT_REMINDERS_FILE: &str = "reminders.md";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config TOML: {err}"),
            Self::InvalidValue { field, reason } => {
                write!(f, "invalid config value for `{field}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Location of the document tree plus optional logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Data root. Relative roots in a config file resolve against the file.
    pub root: PathBuf,
    #[serde(default = "default_staff_dir")]
    pub staff_dir: String,
    #[serde(default = "default_transcripts_dir")]
    pub transcripts_dir: String,
    #[serde(default = "default_reminders_file")]
    pub reminders_file: String,
    #[serde(default)]
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; logging stays off when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_staff_dir() -> String {
    DEFAULT_STAFF_DIR.to_string()
}

fn default_transcripts_dir() -> String {
    DEFAULT_TRANSCRIPTS_DIR.to_string()
}

fn default_reminders_file() -> String {
    DEFAULT_REMINDERS_FILE.to_string()
}

impl StoreConfig {
    /// Default layout under `root`, logging disabled.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            staff_dir: default_staff_dir(),
            transcripts_dir: default_transcripts_dir(),
            reminders_file: default_reminders_file(),
            log_level: None,
            log_dir: None,
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file; a relative `root` is taken relative to its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents)?;
        if config.root.is_relative() {
            if let Some(parent) = path.parent() {
                config.root = parent.join(&config.root);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "root",
                reason: "must not be empty".to_string(),
            });
        }
        check_component("staff_dir", &self.staff_dir)?;
        check_component("transcripts_dir", &self.transcripts_dir)?;
        check_component("reminders_file", &self.reminders_file)?;
        if self.staff_dir == self.transcripts_dir {
            return Err(ConfigError::InvalidValue {
                field: "transcripts_dir",
                reason: "must differ from staff_dir".to_string(),
            });
        }
        if let Some(level) = &self.log_level {
            if level.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "log_level",
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    field: "log_dir",
                    reason: "must be an absolute path".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn staff_dir_path(&self) -> PathBuf {
        self.root.join(&self.staff_dir)
    }

    pub fn transcripts_dir_path(&self) -> PathBuf {
        self.root.join(&self.transcripts_dir)
    }

    pub fn reminders_path(&self) -> PathBuf {
        self.root.join(&self.reminders_file)
    }
}

fn check_component(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigError::InvalidValue {
            field,
            reason: format!("`{value}` must be a single relative name"),
        }),
    }
}
