//! Entity handles and creation records shared by the store and the
//! bootstrap components.
//!
//! Components never hold entity rows, only the typed ids the store hands
//! back.

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

macro_rules! entity_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub i64);

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl ToSql for $name {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    self.0.to_sql()
                }
            }

            impl FromSql for $name {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    i64::column_result(value).map(Self)
                }
            }
        )+
    };
}

entity_id!(
    UserId,
    GroupId,
    ContentTypeId,
    PermissionId,
    PageId,
    PageContentId,
    VersionId,
    PlaceholderId,
    PluginId,
    RoleId,
    WorkflowId,
    WorkflowStepId,
    CollectionId,
    ModerationRequestId,
);

/// Attributes for a user created on first sight.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Any other attribute from the document, stored verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

/// Attributes for a page and its first content row.
#[derive(Debug, Clone)]
pub struct NewPage<'a> {
    pub title: &'a str,
    pub template: &'a str,
    pub language: &'a str,
    pub created_by: UserId,
    pub attributes: &'a Map<String, Value>,
}

/// The content row of a page together with the version wrapping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageVersion {
    pub content: PageContentId,
    pub version: VersionId,
}

/// Grant flags for a user assigned to a page.
///
/// `grant_on` follows the CMS access levels: 1 page, 2 children,
/// 3 page and children, 4 descendants, 5 page and descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGrants {
    #[serde(default = "default_grant_on")]
    pub grant_on: u8,
    #[serde(default)]
    pub grant_all: bool,
    #[serde(default)]
    pub can_add: bool,
    #[serde(default)]
    pub can_change: bool,
    #[serde(default)]
    pub can_delete: bool,
    #[serde(default)]
    pub can_publish: bool,
    #[serde(default)]
    pub can_move_page: bool,
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_change_permissions: bool,
    #[serde(default)]
    pub can_change_advanced_settings: bool,
    #[serde(default = "default_true")]
    pub can_recover_page: bool,
}

fn default_grant_on() -> u8 {
    5
}

impl Default for PageGrants {
    fn default() -> Self {
        Self {
            grant_on: default_grant_on(),
            grant_all: false,
            can_add: false,
            can_change: false,
            can_delete: false,
            can_publish: false,
            can_move_page: false,
            can_view: false,
            can_change_permissions: false,
            can_change_advanced_settings: false,
            can_recover_page: true,
        }
    }
}

impl PageGrants {
    /// Expands `grant_all` into every individual flag.
    pub fn effective(&self) -> Self {
        if !self.grant_all {
            return self.clone();
        }
        Self {
            grant_on: self.grant_on,
            grant_all: true,
            can_add: true,
            can_change: true,
            can_delete: true,
            can_publish: true,
            can_move_page: true,
            can_view: true,
            can_change_permissions: true,
            can_change_advanced_settings: true,
            can_recover_page: true,
        }
    }
}

/// A plugin to place into a placeholder. `target` is the parent plugin,
/// `None` for root-level plugins.
#[derive(Debug, Clone)]
pub struct NewPlugin<'a> {
    pub placeholder: PlaceholderId,
    pub plugin_type: &'a str,
    pub language: &'a str,
    pub target: Option<PluginId>,
    pub fields: &'a Map<String, Value>,
}

/// A moderation role bound to a user or a group.
#[derive(Debug, Clone)]
pub struct NewRole<'a> {
    pub name: &'a str,
    pub user: Option<UserId>,
    pub group: Option<GroupId>,
    pub attributes: &'a Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct NewWorkflow<'a> {
    pub name: &'a str,
    pub is_default: bool,
    pub attributes: &'a Map<String, Value>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewWorkflowStep {
    pub role: RoleId,
    pub is_required: bool,
    pub order: i64,
}

/// A moderation collection. `author` and `workflow` only apply when the
/// collection is created.
#[derive(Debug, Clone)]
pub struct NewCollection<'a> {
    pub name: &'a str,
    pub author: UserId,
    pub workflow: WorkflowId,
}
