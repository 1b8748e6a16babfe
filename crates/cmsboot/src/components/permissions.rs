//! Permissions: grants permission triples, or aliases expanding to them,
//! to users and groups from earlier sections.
//!
//! A triple is `[codename, app_label, model]`. Triples are looked up in
//! batches per `(app_label, model)`; a pair with no content type is
//! skipped with a warning instead of failing the run.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::entities::PermissionId;
use crate::pipeline::{
    BootstrapError, Component, PipelineContext, PipelineWarning, Section, SectionKind,
};
use crate::store::Store;

const SECTION: &str = "permissions";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct PermissionTriple(pub String, pub String, pub String);

impl PermissionTriple {
    pub fn new(codename: &str, app_label: &str, model: &str) -> Self {
        Self(codename.into(), app_label.into(), model.into())
    }

    pub fn codename(&self) -> &str {
        &self.0
    }

    /// The content type's natural key.
    pub fn natural_key(&self) -> (&str, &str) {
        (&self.1, &self.2)
    }
}

/// An entry in a user's or group's permission list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PermissionRef {
    Triple(PermissionTriple),
    Alias(String),
}

/// What an alias expands to: one triple or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AliasTarget {
    One(PermissionTriple),
    Many(Vec<PermissionTriple>),
}

impl AliasTarget {
    fn triples(&self) -> &[PermissionTriple] {
        match self {
            AliasTarget::One(triple) => std::slice::from_ref(triple),
            AliasTarget::Many(triples) => triples,
        }
    }
}

pub type Aliases = IndexMap<String, AliasTarget>;

#[derive(Debug, Default, Deserialize)]
struct PermissionsSpec {
    #[serde(default)]
    aliases: Aliases,
    #[serde(default)]
    users: IndexMap<String, Vec<PermissionRef>>,
    #[serde(default)]
    groups: IndexMap<String, Vec<PermissionRef>>,
}

/// Permissions granted per user and per group by this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrants {
    pub users: Section<BTreeSet<PermissionId>>,
    pub groups: Section<BTreeSet<PermissionId>>,
    pub skipped: Vec<(String, String)>,
}

pub struct Permissions;

impl Component for Permissions {
    const KIND: SectionKind = SectionKind::Permissions;

    type Output = PermissionGrants;

    fn parse(
        ctx: &PipelineContext<'_>,
        store: &dyn Store,
        raw: Value,
    ) -> Result<PermissionGrants, BootstrapError> {
        let spec: PermissionsSpec = serde_json::from_value(raw)
            .map_err(|source| BootstrapError::InvalidSection {
                section: SECTION,
                source,
            })?;
        let aliases = collect_aliases(ctx, spec.aliases)?;
        let mut skipped = Vec::new();

        let users = ctx.users()?;
        let mut user_grants = Section::new("permissions.users");
        for (username, perms) in &spec.users {
            let user = users.id(username)?;
            let found = get_permissions(store, &resolve_aliases(&aliases, perms)?, &mut skipped)?;
            store.grant_user_permissions(user, &found.iter().copied().collect::<Vec<_>>())?;
            debug!(user = %username, count = found.len(), "granted user permissions");
            user_grants.insert(username.clone(), found);
        }

        let groups = ctx.groups()?;
        let mut group_grants = Section::new("permissions.groups");
        for (group_name, perms) in &spec.groups {
            let group = groups.id(group_name)?;
            let found = get_permissions(store, &resolve_aliases(&aliases, perms)?, &mut skipped)?;
            store.grant_group_permissions(group, &found.iter().copied().collect::<Vec<_>>())?;
            debug!(group = %group_name, count = found.len(), "granted group permissions");
            group_grants.insert(group_name.clone(), found);
        }

        Ok(PermissionGrants {
            users: user_grants,
            groups: group_grants,
            skipped,
        })
    }

    fn bind(ctx: &mut PipelineContext<'_>, output: PermissionGrants) -> usize {
        let len = output.users.len() + output.groups.len();
        ctx.warnings.extend(
            output
                .skipped
                .iter()
                .map(|(app_label, model)| PipelineWarning::MissingContentType {
                    app_label: app_label.clone(),
                    model: model.clone(),
                }),
        );
        ctx.permissions = Some(output);
        len
    }
}

/// Aliases visible to the section: the legacy document-level
/// `permission_aliases`, overridden by document-level `aliases`,
/// overridden by the section's own `aliases`.
fn collect_aliases(
    ctx: &PipelineContext<'_>,
    section_aliases: Aliases,
) -> Result<Aliases, BootstrapError> {
    let mut aliases = Aliases::new();
    for key in ["permission_aliases", "aliases"] {
        if let Some(raw) = ctx.document().section(key) {
            let level: Aliases = serde_json::from_value(raw.clone())
                .map_err(|source| BootstrapError::InvalidSection { section: key, source })?;
            aliases.extend(level);
        }
    }
    aliases.extend(section_aliases);
    Ok(aliases)
}

/// Passes triples through and expands alias names, in input order.
pub fn resolve_aliases(
    aliases: &Aliases,
    perms: &[PermissionRef],
) -> Result<Vec<PermissionTriple>, BootstrapError> {
    let mut resolved = Vec::with_capacity(perms.len());
    for perm in perms {
        match perm {
            PermissionRef::Triple(triple) => resolved.push(triple.clone()),
            PermissionRef::Alias(name) => {
                let target = aliases.get(name).ok_or_else(|| BootstrapError::NotFound {
                    section: "aliases",
                    name: name.clone(),
                })?;
                resolved.extend(target.triples().iter().cloned());
            }
        }
    }
    Ok(resolved)
}

/// Looks up the permissions named by `triples`, grouped by content type.
/// Content types that do not exist are recorded in `skipped` and left out.
pub fn get_permissions(
    store: &dyn Store,
    triples: &[PermissionTriple],
    skipped: &mut Vec<(String, String)>,
) -> Result<BTreeSet<PermissionId>, BootstrapError> {
    let mut by_content_type: IndexMap<(&str, &str), Vec<&str>> = IndexMap::new();
    for triple in triples {
        by_content_type
            .entry(triple.natural_key())
            .or_default()
            .push(triple.codename());
    }
    by_content_type.sort_keys();

    let mut found = BTreeSet::new();
    for ((app_label, model), codenames) in by_content_type {
        let Some(content_type) = store.find_content_type(app_label, model)? else {
            warn!("Missing content type: {}.{}", app_label, model);
            skipped.push((app_label.to_string(), model.to_string()));
            continue;
        };
        found.extend(store.find_permissions(content_type, &codenames)?);
    }
    Ok(found)
}
