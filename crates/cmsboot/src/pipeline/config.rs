use crate::config::Settings;

use super::error::BootstrapError;
use super::plan::Plan;

pub struct PipelineConfig {
    pub plan: Plan,
    pub default_email_domain: Option<String>,
}

impl PipelineConfig {
    /// Builds the plan from the configured sections. An order that breaks
    /// a section dependency is rejected here, before anything runs.
    pub fn from_settings(settings: &Settings) -> Result<Self, BootstrapError> {
        Ok(Self {
            plan: Plan::new(settings.sections.iter().copied())?,
            default_email_domain: settings.email_domain.clone(),
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            plan: Plan::standard(),
            default_email_domain: None,
        }
    }
}
