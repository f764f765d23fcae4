use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Unknown profile '{0}'")]
    UnknownProfile(String),

    #[error("Failed to read profile file {path}: {source}")]
    ReadProfile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Profile '{name}' is not valid JSON or TOML: {reason}")]
    ParseProfile { name: String, reason: String },

    #[error("Profile '{name}' has unknown fields: {}", fields.join(", "))]
    UnknownFields { name: String, fields: Vec<String> },

    #[error("Profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },
}

impl SearchError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidProfile {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
