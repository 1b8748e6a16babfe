//! Pages: logical name → page attributes, user assignments and a plugin
//! tree for the page's `content` placeholder.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::db::page_repo::CONTENT_SLOT;
use crate::entities::{NewPage, NewPlugin, PageGrants, PageId, PlaceholderId, PluginId};
use crate::pipeline::component::{decode, entries};
use crate::pipeline::{BootstrapError, Component, PipelineContext, Section, SectionKind};
use crate::store::Store;

const SECTION: &str = "pages";

/// Template value meaning "inherit from the parent page".
pub const TEMPLATE_INHERIT: &str = "INHERIT";

fn default_template() -> String {
    TEMPLATE_INHERIT.to_string()
}

/// One page entry. Control flags are separate fields, so `attributes`
/// only carries what goes onto the page content itself.
#[derive(Debug, Deserialize)]
struct PageSpec {
    title: String,
    #[serde(default = "default_template")]
    template: String,
    language: String,
    created_by: String,
    #[serde(default)]
    is_home: bool,
    #[serde(default)]
    publish: bool,
    #[serde(default)]
    assignments: Vec<AssignmentSpec>,
    #[serde(default)]
    content: Vec<PluginSpec>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct AssignmentSpec {
    user: String,
    #[serde(flatten)]
    grants: PageGrants,
}

/// A node of the plugin tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PluginSpec {
    #[serde(rename = "type")]
    pub plugin_type: String,
    #[serde(default)]
    pub children: Vec<PluginSpec>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

pub struct Pages;

impl Component for Pages {
    const KIND: SectionKind = SectionKind::Pages;

    type Output = Section<PageId>;

    fn default_data() -> Option<Value> {
        Some(json!({}))
    }

    fn parse(
        ctx: &PipelineContext<'_>,
        store: &dyn Store,
        raw: Value,
    ) -> Result<Section<PageId>, BootstrapError> {
        let mut pages = Section::new(SECTION);
        for (name, data) in entries(SECTION, raw)? {
            let spec: PageSpec = decode(SECTION, &name, data)?;
            let page = create_page(ctx, store, &name, spec)?;
            pages.insert(name, page);
        }
        Ok(pages)
    }

    fn bind(ctx: &mut PipelineContext<'_>, output: Section<PageId>) -> usize {
        let len = output.len();
        ctx.pages = Some(output);
        len
    }
}

fn create_page(
    ctx: &PipelineContext<'_>,
    store: &dyn Store,
    name: &str,
    spec: PageSpec,
) -> Result<PageId, BootstrapError> {
    let users = ctx.users()?;
    let created_by = users.id(&spec.created_by)?;

    let page = store.create_page(&NewPage {
        title: &spec.title,
        template: &spec.template,
        language: &spec.language,
        created_by,
        attributes: &spec.attributes,
    })?;
    debug!(page = %name, id = %page, "page created");

    if spec.is_home {
        store.set_home(page)?;
    }

    let version = store
        .latest_version(page)?
        .ok_or_else(|| BootstrapError::NotFound {
            section: "versions",
            name: name.to_string(),
        })?;
    let placeholder = store
        .find_placeholder(version.content, CONTENT_SLOT)?
        .ok_or_else(|| BootstrapError::NotFound {
            section: "placeholders",
            name: format!("{}.{}", name, CONTENT_SLOT),
        })?;

    for assignment in &spec.assignments {
        let user = users.id(&assignment.user)?;
        store.assign_user_to_page(page, user, &assignment.grants)?;
    }

    add_plugins(store, placeholder, &spec.language, spec.content)?;

    if spec.publish {
        store.publish_version(version.version, created_by)?;
    }

    Ok(page)
}

/// Materializes a plugin forest into a placeholder, parents before
/// children and siblings in document order. Each child targets the plugin
/// created for its parent; roots have no target.
pub fn add_plugins(
    store: &dyn Store,
    placeholder: PlaceholderId,
    language: &str,
    roots: Vec<PluginSpec>,
) -> Result<Vec<PluginId>, BootstrapError> {
    let mut created = Vec::new();
    let mut stack: Vec<(PluginSpec, Option<PluginId>)> =
        roots.into_iter().rev().map(|root| (root, None)).collect();

    while let Some((spec, target)) = stack.pop() {
        let PluginSpec {
            plugin_type,
            children,
            fields,
        } = spec;

        let plugin = store.add_plugin(&NewPlugin {
            placeholder,
            plugin_type: &plugin_type,
            language,
            target,
            fields: &fields,
        })?;
        created.push(plugin);

        stack.extend(children.into_iter().rev().map(|child| (child, Some(plugin))));
    }

    Ok(created)
}
