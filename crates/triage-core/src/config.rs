//! Configuration types for the triage dashboard.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{TeamId, User, UserId};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config at {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },
    #[error("failed to create config parent directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// User designated to receive silenced incidents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilenceTarget {
    pub user_id: String,
    pub user_name: String,
}

impl SilenceTarget {
    pub fn to_user(&self) -> User {
        User {
            id: UserId::new(self.user_id.clone()),
            name: self.user_name.clone(),
            email: None,
        }
    }
}

/// Dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TriageConfig {
    /// Teams whose incidents appear on the board. Empty means all teams.
    #[serde(default)]
    pub teams: Vec<String>,
    /// Editor override. Falls back to $VISUAL, $EDITOR, then vi.
    #[serde(default)]
    pub editor: Option<String>,
    #[serde(default)]
    pub silence: Option<SilenceTarget>,
}

impl TriageConfig {
    pub fn team_ids(&self) -> Vec<TeamId> {
        self.teams.iter().map(|t| TeamId(t.clone())).collect()
    }

    /// Candidate users for the silence action. Empty when unconfigured.
    pub fn silence_users(&self) -> Vec<User> {
        self.silence.iter().map(SilenceTarget::to_user).collect()
    }
}

pub fn parse_triage_config(contents: &str) -> Result<TriageConfig, toml::de::Error> {
    toml::from_str(contents)
}

pub fn load_triage_config(path: impl AsRef<Path>) -> Result<TriageConfig, ConfigError> {
    let path_ref = path.as_ref();
    let body = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
        path: path_ref.to_path_buf(),
        source,
    })?;
    parse_triage_config(&body).map_err(|source| ConfigError::Parse {
        path: path_ref.to_path_buf(),
        source,
    })
}

pub fn save_triage_config(path: impl AsRef<Path>, config: &TriageConfig) -> Result<(), ConfigError> {
    let path_ref = path.as_ref();
    let parent = path_ref.parent().map(Path::to_path_buf);
    if let Some(parent_dir) = parent {
        fs::create_dir_all(&parent_dir).map_err(|source| ConfigError::CreateDir {
            path: parent_dir,
            source,
        })?;
    }

    let body = toml::to_string_pretty(config).map_err(|source| ConfigError::Serialize {
        path: path_ref.to_path_buf(),
        source,
    })?;
    fs::write(path_ref, body).map_err(|source| ConfigError::Write {
        path: path_ref.to_path_buf(),
        source,
    })?;
    Ok(())
}
