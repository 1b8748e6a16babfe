//! Collections: logical name → a moderation collection that gathers the
//! latest versions of some pages for review.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::entities::{CollectionId, NewCollection};
use crate::pipeline::component::{decode, entries};
use crate::pipeline::{BootstrapError, Component, PipelineContext, Section, SectionKind};
use crate::store::Store;

const SECTION: &str = "collections";

#[derive(Debug, Deserialize)]
struct CollectionSpec {
    #[serde(default)]
    name: Option<String>,
    user: String,
    workflow: String,
    #[serde(default)]
    pages: Vec<String>,
}

pub struct Collections;

impl Component for Collections {
    const KIND: SectionKind = SectionKind::Collections;

    type Output = Section<CollectionId>;

    fn default_data() -> Option<Value> {
        Some(json!({}))
    }

    fn parse(
        ctx: &PipelineContext<'_>,
        store: &dyn Store,
        raw: Value,
    ) -> Result<Section<CollectionId>, BootstrapError> {
        let users = ctx.users()?;
        let pages = ctx.pages()?;
        let workflows = &ctx.workflows()?.workflows;

        let mut collections = Section::new(SECTION);
        for (key, data) in entries(SECTION, raw)? {
            let spec: CollectionSpec = decode(SECTION, &key, data)?;
            let name = spec.name.as_deref().unwrap_or(&key);
            let author = users.id(&spec.user)?;

            let (collection, created) = store.get_or_create_collection(&NewCollection {
                name,
                author,
                workflow: workflows.id(&spec.workflow)?,
            })?;

            if created {
                for page in &spec.pages {
                    let page_id = pages.id(page)?;
                    let version = store.latest_version(page_id)?.ok_or_else(|| {
                        BootstrapError::NotFound {
                            section: "versions",
                            name: page.clone(),
                        }
                    })?;
                    store.add_moderation_request(collection, version.version, author)?;
                }
                info!(collection = %name, requests = spec.pages.len(), "collection created");
            } else {
                debug!(collection = %name, "collection exists, left unchanged");
            }
            collections.insert(key, collection);
        }
        Ok(collections)
    }

    fn bind(ctx: &mut PipelineContext<'_>, output: Section<CollectionId>) -> usize {
        let len = output.len();
        ctx.collections = Some(output);
        len
    }
}
