//! Moderation repository: roles, workflows, workflow steps, collections
//! and moderation requests.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{encode_json, DatabaseError};
use crate::entities::{
    CollectionId, ModerationRequestId, NewCollection, NewRole, NewWorkflow, NewWorkflowStep,
    RoleId, UserId, VersionId, WorkflowId, WorkflowStepId,
};

/// Status of a freshly created collection.
pub const COLLECTING: &str = "COLLECTING";

/// A raw collection row from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRow {
    pub id: CollectionId,
    pub name: String,
    pub author: UserId,
    pub workflow: WorkflowId,
    pub status: String,
    pub date_created: String,
}

impl CollectionRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            author: row.get("author_id")?,
            workflow: row.get("workflow_id")?,
            status: row.get("status")?,
            date_created: row.get("date_created")?,
        })
    }
}

/// Creates a role, or rewrites the stored attributes of the role with the
/// same name.
pub fn upsert_role(conn: &Connection, role: &NewRole<'_>) -> Result<RoleId, DatabaseError> {
    let attributes = encode_json("moderation_roles.attributes", role.attributes)?;
    let id = conn.query_row(
        "INSERT INTO moderation_roles (name, user_id, group_id, attributes)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(name) DO UPDATE SET
             user_id = excluded.user_id,
             group_id = excluded.group_id,
             attributes = excluded.attributes
         RETURNING id",
        params![role.name, role.user, role.group, attributes],
        |r| r.get(0),
    )?;
    Ok(id)
}

/// Returns the workflow with this name, creating it when missing.
/// An existing workflow is returned unchanged.
pub fn get_or_create_workflow(
    conn: &Connection,
    workflow: &NewWorkflow<'_>,
) -> Result<(WorkflowId, bool), DatabaseError> {
    let existing: Option<WorkflowId> = conn
        .query_row(
            "SELECT id FROM workflows WHERE name = ?1",
            params![workflow.name],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok((id, false));
    }

    conn.execute(
        "INSERT INTO workflows (name, is_default, attributes, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            workflow.name,
            workflow.is_default,
            encode_json("workflows.attributes", workflow.attributes)?,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok((WorkflowId(conn.last_insert_rowid()), true))
}

pub fn add_workflow_step(
    conn: &Connection,
    workflow: WorkflowId,
    step: &NewWorkflowStep,
) -> Result<WorkflowStepId, DatabaseError> {
    conn.execute(
        "INSERT INTO workflow_steps (workflow_id, role_id, is_required, step_order)
         VALUES (?1, ?2, ?3, ?4)",
        params![workflow, step.role, step.is_required, step.order],
    )?;
    Ok(WorkflowStepId(conn.last_insert_rowid()))
}

/// Number of steps attached to a workflow.
pub fn count_workflow_steps(conn: &Connection, workflow: WorkflowId) -> Result<u32, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM workflow_steps WHERE workflow_id = ?1",
        params![workflow],
        |r| r.get(0),
    )?;
    Ok(count)
}

pub fn find_collection(
    conn: &Connection,
    name: &str,
) -> Result<Option<CollectionRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM moderation_collections WHERE name = ?1",
            params![name],
            CollectionRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Returns the collection with this name, creating it when missing.
/// Author and workflow are only written on creation.
pub fn get_or_create_collection(
    conn: &Connection,
    collection: &NewCollection<'_>,
) -> Result<(CollectionId, bool), DatabaseError> {
    if let Some(existing) = find_collection(conn, collection.name)? {
        return Ok((existing.id, false));
    }

    conn.execute(
        "INSERT INTO moderation_collections (name, author_id, workflow_id, status, date_created)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            collection.name,
            collection.author,
            collection.workflow,
            COLLECTING,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok((CollectionId(conn.last_insert_rowid()), true))
}

/// Attaches a version to a collection. Attaching the same version twice
/// returns the existing request.
pub fn add_moderation_request(
    conn: &Connection,
    collection: CollectionId,
    version: VersionId,
    author: UserId,
) -> Result<ModerationRequestId, DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO moderation_requests (collection_id, version_id, author_id, date_sent)
         VALUES (?1, ?2, ?3, ?4)",
        params![collection, version, author, chrono::Utc::now().to_rfc3339()],
    )?;
    let id = conn.query_row(
        "SELECT id FROM moderation_requests WHERE collection_id = ?1 AND version_id = ?2",
        params![collection, version],
        |r| r.get(0),
    )?;
    Ok(id)
}

/// Versions attached to a collection, in attachment order.
pub fn collection_versions(
    conn: &Connection,
    collection: CollectionId,
) -> Result<Vec<VersionId>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT version_id FROM moderation_requests WHERE collection_id = ?1 ORDER BY id",
    )?;
    let versions = stmt
        .query_map(params![collection], |r| r.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(versions)
}
