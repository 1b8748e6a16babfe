use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmsbootError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    #[error("Bootstrap error: {0}")]
    Bootstrap(#[from] crate::pipeline::BootstrapError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Settings validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Could not open specified file ({0}). Aborting.")]
    NotFound(String),

    #[error("Failed to read data source '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse data source '{name}': {source}")]
    ParseJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Data source '{name}' must be a JSON object at the top level")]
    NotAnObject { name: String },
}

pub type Result<T> = std::result::Result<T, CmsbootError>;
