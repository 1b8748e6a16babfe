pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod plan;
pub mod progress;
pub mod runner;
pub mod section;

pub use component::{apply, Component};
pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use error::{BootstrapError, PipelineWarning, PlanError};
pub use plan::{Plan, SectionKind};
pub use progress::{LogProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use runner::{Pipeline, RunSummary};
pub use section::Section;
