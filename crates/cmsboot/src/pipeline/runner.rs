use std::sync::Arc;

use tracing::{debug, info_span};

use crate::components::{Collections, Groups, Pages, Permissions, Users, Workflows};
use crate::db::Database;
use crate::error::CmsbootError;
use crate::source::{load_sources, BootstrapDocument};
use crate::store::Store;

use super::component::apply;
use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::error::{BootstrapError, PipelineWarning};
use super::plan::SectionKind;
use super::progress::{ProgressEvent, ProgressReporter};

/// What one document produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub document: String,
    pub sections: Vec<(SectionKind, usize)>,
    pub warnings: Vec<PipelineWarning>,
}

impl RunSummary {
    fn from_context(ctx: PipelineContext<'_>) -> Self {
        Self {
            document: ctx.document().name().to_string(),
            sections: ctx.completed,
            warnings: ctx.warnings,
        }
    }
}

pub struct Pipeline {
    config: Arc<PipelineConfig>,
}

impl Pipeline {
    pub fn from_config(config: Arc<PipelineConfig>) -> Self {
        Self { config }
    }

    /// Runs every section of the plan, in order, against one document.
    /// The first failing section aborts the run.
    pub fn run<'d>(
        &self,
        document: &'d BootstrapDocument,
        store: &dyn Store,
        progress: &dyn ProgressReporter,
    ) -> Result<PipelineContext<'d>, BootstrapError> {
        let _pipeline_span = info_span!("pipeline", document = %document.name()).entered();
        progress.report(ProgressEvent::Started {
            document: document.name().to_string(),
        });

        let mut ctx = PipelineContext::new(document, self.config.default_email_domain.clone());

        for &section in self.config.plan.sections() {
            let _step = info_span!("section", section = %section).entered();
            progress.report(ProgressEvent::SectionStarted { section });

            match self.step(section, &mut ctx, store) {
                Ok(entities) => {
                    debug!("{} produced {} entries", section, entities);
                    ctx.completed.push((section, entities));
                    progress.report(ProgressEvent::SectionCompleted { section, entities });
                }
                Err(e) => {
                    progress.report(ProgressEvent::Failed {
                        section,
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            }
        }

        Ok(ctx)
    }

    /// Runs all documents inside a single database transaction. Any
    /// failure rolls back everything written by every document.
    pub fn bootstrap(
        &self,
        db: &Database,
        documents: &[BootstrapDocument],
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<RunSummary>, BootstrapError> {
        db.transaction(|conn| {
            documents
                .iter()
                .map(|document| {
                    self.run(document, conn, progress)
                        .map(RunSummary::from_context)
                })
                .collect()
        })
    }

    /// Loads the named sources and bootstraps them. Every source is parsed
    /// before the transaction starts.
    pub fn bootstrap_sources<S: AsRef<str>>(
        &self,
        db: &Database,
        sources: &[S],
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<RunSummary>, CmsbootError> {
        let documents = load_sources(sources)?;
        Ok(self.bootstrap(db, &documents, progress)?)
    }

    fn step(
        &self,
        section: SectionKind,
        ctx: &mut PipelineContext<'_>,
        store: &dyn Store,
    ) -> Result<usize, BootstrapError> {
        match section {
            SectionKind::Users => apply::<Users>(ctx, store),
            SectionKind::Groups => apply::<Groups>(ctx, store),
            SectionKind::Permissions => apply::<Permissions>(ctx, store),
            SectionKind::Pages => apply::<Pages>(ctx, store),
            SectionKind::Workflows => apply::<Workflows>(ctx, store),
            SectionKind::Collections => apply::<Collections>(ctx, store),
        }
    }
}
