//! Auth repository: users, groups, content types and permissions.

use rusqlite::{params, Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};

use super::{encode_json, DatabaseError};
use crate::entities::{ContentTypeId, GroupId, NewUser, PermissionId, UserId};

/// A raw user row from the database.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub attributes: String,
    pub date_joined: String,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            email: row.get("email")?,
            password: row.get("password")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            is_staff: row.get("is_staff")?,
            is_superuser: row.get("is_superuser")?,
            is_active: row.get("is_active")?,
            attributes: row.get("attributes")?,
            date_joined: row.get("date_joined")?,
        })
    }
}

/// Hashes a password as `sha256$<salt>$<hex digest>`.
pub fn hash_password(raw: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    format!("sha256${}${}", salt, digest(&salt, raw))
}

/// Checks a raw password against a value produced by [`hash_password`].
pub fn verify_password(raw: &str, encoded: &str) -> bool {
    let mut parts = encoded.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("sha256"), Some(salt), Some(expected)) => digest(salt, raw) == expected,
        _ => false,
    }
}

fn digest(salt: &str, raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Finds a user by username.
pub fn find_user(conn: &Connection, username: &str) -> Result<Option<UserRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM users WHERE username = ?1",
            params![username],
            UserRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Returns the existing user with this username, or creates it.
/// An existing user is returned unchanged.
pub fn get_or_create_user(
    conn: &Connection,
    user: &NewUser,
) -> Result<(UserId, bool), DatabaseError> {
    if let Some(existing) = find_user(conn, &user.username)? {
        return Ok((existing.id, false));
    }

    conn.execute(
        "INSERT INTO users (username, email, password, first_name, last_name, is_staff,
         is_superuser, is_active, attributes, date_joined)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            user.username,
            user.email,
            hash_password(&user.password),
            user.first_name,
            user.last_name,
            user.is_staff,
            user.is_superuser,
            user.is_active,
            encode_json("users.attributes", &user.extra)?,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok((UserId(conn.last_insert_rowid()), true))
}

/// Returns the group with this display name, creating it when missing.
pub fn get_or_create_group(conn: &Connection, name: &str) -> Result<(GroupId, bool), DatabaseError> {
    let existing: Option<GroupId> = conn
        .query_row(
            "SELECT id FROM auth_groups WHERE name = ?1",
            params![name],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok((id, false));
    }

    conn.execute("INSERT INTO auth_groups (name) VALUES (?1)", params![name])?;
    Ok((GroupId(conn.last_insert_rowid()), true))
}

/// Adds a user to a group. Adding an existing membership is a no-op.
pub fn add_user_to_group(
    conn: &Connection,
    user: UserId,
    group: GroupId,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO user_groups (user_id, group_id) VALUES (?1, ?2)",
        params![user, group],
    )?;
    Ok(())
}

/// Looks up a content type by its natural key.
pub fn find_content_type(
    conn: &Connection,
    app_label: &str,
    model: &str,
) -> Result<Option<ContentTypeId>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM content_types WHERE app_label = ?1 AND model = ?2",
            params![app_label, model],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Registers a content type together with its default
/// `add`/`change`/`delete`/`view` permissions.
pub fn ensure_content_type(
    conn: &Connection,
    app_label: &str,
    model: &str,
) -> Result<ContentTypeId, DatabaseError> {
    if let Some(id) = find_content_type(conn, app_label, model)? {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO content_types (app_label, model) VALUES (?1, ?2)",
        params![app_label, model],
    )?;
    let id = ContentTypeId(conn.last_insert_rowid());
    for action in ["add", "change", "delete", "view"] {
        conn.execute(
            "INSERT OR IGNORE INTO permissions (content_type_id, codename, name)
             VALUES (?1, ?2, ?3)",
            params![
                id,
                format!("{}_{}", action, model),
                format!("Can {} {}", action, model)
            ],
        )?;
    }
    Ok(id)
}

/// Selects the permissions of one content type by codename.
/// Unknown codenames are ignored.
pub fn find_permissions(
    conn: &Connection,
    content_type: ContentTypeId,
    codenames: &[&str],
) -> Result<Vec<PermissionId>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM permissions WHERE content_type_id = ?1 AND codename = ?2",
    )?;
    let mut found = Vec::new();
    for codename in codenames {
        if let Some(id) = stmt
            .query_row(params![content_type, codename], |r| r.get(0))
            .optional()?
        {
            found.push(id);
        }
    }
    Ok(found)
}

/// Adds permissions to a user's own permission set.
pub fn grant_user_permissions(
    conn: &Connection,
    user: UserId,
    permissions: &[PermissionId],
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO user_permissions (user_id, permission_id) VALUES (?1, ?2)",
    )?;
    for permission in permissions {
        stmt.execute(params![user, permission])?;
    }
    Ok(())
}

/// Adds permissions to a group's permission set.
pub fn grant_group_permissions(
    conn: &Connection,
    group: GroupId,
    permissions: &[PermissionId],
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO group_permissions (group_id, permission_id) VALUES (?1, ?2)",
    )?;
    for permission in permissions {
        stmt.execute(params![group, permission])?;
    }
    Ok(())
}

/// Codenames granted directly to a user, sorted.
pub fn user_permission_codenames(
    conn: &Connection,
    user: UserId,
) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.codename FROM user_permissions up
         JOIN permissions p ON p.id = up.permission_id
         WHERE up.user_id = ?1 ORDER BY p.codename",
    )?;
    let codenames = stmt
        .query_map(params![user], |r| r.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(codenames)
}

/// Codenames granted to a group, sorted.
pub fn group_permission_codenames(
    conn: &Connection,
    group: GroupId,
) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.codename FROM group_permissions gp
         JOIN permissions p ON p.id = gp.permission_id
         WHERE gp.group_id = ?1 ORDER BY p.codename",
    )?;
    let codenames = stmt
        .query_map(params![group], |r| r.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(codenames)
}
