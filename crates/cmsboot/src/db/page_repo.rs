//! Page repository: pages, their content rows, versions, placeholders,
//! plugins and user assignments.

use rusqlite::{params, Connection, OptionalExtension};

use super::{encode_json, DatabaseError};
use crate::entities::{
    NewPage, NewPlugin, PageContentId, PageGrants, PageId, PageVersion, PlaceholderId, PluginId,
    UserId, VersionId,
};

/// Slot of the placeholder every page content gets on creation.
pub const CONTENT_SLOT: &str = "content";

/// Version states.
pub const DRAFT: &str = "draft";
pub const PUBLISHED: &str = "published";

/// A plugin row, used for inspecting a materialized tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRow {
    pub id: PluginId,
    pub parent: Option<PluginId>,
    pub plugin_type: String,
    pub position: i64,
    pub fields: String,
}

/// Creates a page with one content row, a draft version wrapping it and
/// the default `content` placeholder.
pub fn create_page(conn: &Connection, page: &NewPage<'_>) -> Result<PageId, DatabaseError> {
    let now = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO pages (created_by, is_home, created_at) VALUES (?1, 0, ?2)",
        params![page.created_by, now],
    )?;
    let page_id = PageId(conn.last_insert_rowid());

    conn.execute(
        "INSERT INTO page_contents (page_id, language, title, template, attributes,
         created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            page_id,
            page.language,
            page.title,
            page.template,
            encode_json("page_contents.attributes", page.attributes)?,
            page.created_by,
            now,
        ],
    )?;
    let content_id = PageContentId(conn.last_insert_rowid());

    conn.execute(
        "INSERT INTO versions (content_id, state, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![content_id, DRAFT, page.created_by, now],
    )?;

    conn.execute(
        "INSERT INTO placeholders (content_id, slot) VALUES (?1, ?2)",
        params![content_id, CONTENT_SLOT],
    )?;

    Ok(page_id)
}

/// Marks a page as the site home. At most one page is home at a time.
pub fn set_home(conn: &Connection, page: PageId) -> Result<(), DatabaseError> {
    conn.execute("UPDATE pages SET is_home = 0 WHERE is_home = 1", [])?;
    conn.execute("UPDATE pages SET is_home = 1 WHERE id = ?1", params![page])?;
    Ok(())
}

/// The most recent version of a page: the content row with the greatest
/// primary key, then the version wrapping it.
pub fn latest_version(
    conn: &Connection,
    page: PageId,
) -> Result<Option<PageVersion>, DatabaseError> {
    let found = conn
        .query_row(
            "SELECT c.id, v.id FROM page_contents c
             JOIN versions v ON v.content_id = c.id
             WHERE c.id = (SELECT MAX(id) FROM page_contents WHERE page_id = ?1)",
            params![page],
            |r| {
                Ok(PageVersion {
                    content: r.get(0)?,
                    version: r.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(found)
}

/// Finds the placeholder with the given slot on a content row.
pub fn find_placeholder(
    conn: &Connection,
    content: PageContentId,
    slot: &str,
) -> Result<Option<PlaceholderId>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM placeholders WHERE content_id = ?1 AND slot = ?2",
            params![content, slot],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Grants a user access to a page.
pub fn assign_user(
    conn: &Connection,
    page: PageId,
    user: UserId,
    grants: &PageGrants,
) -> Result<(), DatabaseError> {
    let grants = grants.effective();
    conn.execute(
        "INSERT INTO page_user_assignments (page_id, user_id, grant_on, grants)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            page,
            user,
            grants.grant_on,
            encode_json("page_user_assignments.grants", &grants)?
        ],
    )?;
    Ok(())
}

/// Adds a plugin after its existing siblings.
pub fn add_plugin(conn: &Connection, plugin: &NewPlugin<'_>) -> Result<PluginId, DatabaseError> {
    let position: i64 = conn.query_row(
        "SELECT COUNT(*) FROM plugins WHERE placeholder_id = ?1 AND parent_id IS ?2",
        params![plugin.placeholder, plugin.target],
        |r| r.get(0),
    )?;

    conn.execute(
        "INSERT INTO plugins (placeholder_id, parent_id, plugin_type, language, position, fields)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            plugin.placeholder,
            plugin.target,
            plugin.plugin_type,
            plugin.language,
            position,
            encode_json("plugins.fields", plugin.fields)?,
        ],
    )?;
    Ok(PluginId(conn.last_insert_rowid()))
}

/// Lists a placeholder's plugins in creation order.
pub fn list_plugins(
    conn: &Connection,
    placeholder: PlaceholderId,
) -> Result<Vec<PluginRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, parent_id, plugin_type, position, fields FROM plugins
         WHERE placeholder_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![placeholder], |r| {
            Ok(PluginRow {
                id: r.get(0)?,
                parent: r.get(1)?,
                plugin_type: r.get(2)?,
                position: r.get(3)?,
                fields: r.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Publishes a version on behalf of `user`.
pub fn publish_version(
    conn: &Connection,
    version: VersionId,
    user: UserId,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE versions SET state = ?2, published_by = ?3, published_at = ?4 WHERE id = ?1",
        params![version, PUBLISHED, user, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Returns the state of a version (`draft` or `published`).
pub fn version_state(conn: &Connection, version: VersionId) -> Result<Option<String>, DatabaseError> {
    let state = conn
        .query_row(
            "SELECT state FROM versions WHERE id = ?1",
            params![version],
            |r| r.get(0),
        )
        .optional()?;
    Ok(state)
}
