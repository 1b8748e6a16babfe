pub mod components;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod store;

pub use config::{load_settings, Settings};
pub use db::{Database, DatabaseError};
pub use error::{CmsbootError, ConfigError, Result, SourceError};
pub use pipeline::{
    BootstrapError, LogProgress, Pipeline, PipelineConfig, PipelineContext, RunSummary,
};
pub use source::{resolve_source, BootstrapDocument, DataSource};
pub use store::Store;
