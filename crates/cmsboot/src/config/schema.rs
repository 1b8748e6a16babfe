use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pipeline::SectionKind;

/// Settings for the bootstrap command. Every field has a default, so an
/// empty JSON object is a valid settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Sources run by `--all`, in order.
    #[serde(default = "default_sources")]
    pub default_sources: Vec<String>,
    /// Used when a document carries no `email_domain` of its own.
    #[serde(default)]
    pub email_domain: Option<String>,
    /// Sections to run, in order. Checked against section dependencies
    /// when the pipeline is configured.
    #[serde(default = "default_sections")]
    pub sections: Vec<SectionKind>,
}

fn default_database_path() -> PathBuf {
    crate::db::default_database_path().unwrap_or_else(|| PathBuf::from("cmsboot.db"))
}

fn default_sections() -> Vec<SectionKind> {
    SectionKind::ALL.to_vec()
}

fn default_sources() -> Vec<String> {
    vec!["roles".to_string(), "demo".to_string()]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            default_sources: default_sources(),
            email_domain: None,
            sections: default_sections(),
        }
    }
}
