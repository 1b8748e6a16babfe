use tracing::{info, warn};

use super::plan::SectionKind;

/// Events emitted by the pipeline while it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started {
        document: String,
    },
    SectionStarted {
        section: SectionKind,
    },
    SectionCompleted {
        section: SectionKind,
        entities: usize,
    },
    Failed {
        section: SectionKind,
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Writes progress to the log.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { document } => info!("Bootstrapping from {}", document),
            ProgressEvent::SectionStarted { section } => info!("Loading {}...", section),
            ProgressEvent::SectionCompleted { section, entities } => {
                info!("Loaded {} ({} entries)", section, entities)
            }
            ProgressEvent::Failed { section, error } => {
                warn!("Failed while loading {}: {}", section, error)
            }
        }
    }
}
