use thiserror::Error;

use super::plan::SectionKind;

#[derive(Error, Debug)]
pub enum BootstrapError {
    /// A name referenced by a later section was never produced.
    #[error("No entry named '{name}' in {section}")]
    NotFound { section: &'static str, name: String },

    #[error("Section '{0}' is missing and has no default")]
    MissingSection(SectionKind),

    #[error("Section '{section}' has an unexpected shape: {source}")]
    InvalidSection {
        section: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid entry '{name}' in section '{section}': {source}")]
    InvalidEntry {
        section: &'static str,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Section '{0}' was read before it ran")]
    SectionNotReady(SectionKind),

    #[error("Invalid plan: {0}")]
    Plan(#[from] PlanError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("section '{0}' is listed more than once")]
    Duplicate(SectionKind),

    #[error("section '{section}' requires '{requires}' to run before it")]
    MissingDependency {
        section: SectionKind,
        requires: SectionKind,
    },
}

/// Problems that were tolerated during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineWarning {
    /// A permission named an app/model pair with no content type; its
    /// permissions were skipped.
    MissingContentType { app_label: String, model: String },
}
