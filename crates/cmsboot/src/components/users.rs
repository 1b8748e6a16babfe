//! Users: a list of bare usernames or attribute objects.
//!
//! Each entry gets computed defaults (`email`, `password`, `is_staff`)
//! that explicit attributes override. Existing users are fetched, not
//! modified.

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::entities::{NewUser, UserId};
use crate::pipeline::component::decode;
use crate::pipeline::{BootstrapError, Component, PipelineContext, Section, SectionKind};
use crate::store::Store;

const SECTION: &str = "users";

pub struct Users;

impl Component for Users {
    const KIND: SectionKind = SectionKind::Users;

    type Output = Section<UserId>;

    fn default_data() -> Option<Value> {
        Some(json!([]))
    }

    fn parse(
        ctx: &PipelineContext<'_>,
        store: &dyn Store,
        raw: Value,
    ) -> Result<Section<UserId>, BootstrapError> {
        let entries: Vec<Value> = serde_json::from_value(raw)
            .map_err(|source| BootstrapError::InvalidSection {
                section: SECTION,
                source,
            })?;

        let email_domain = ctx.email_domain();
        if email_domain.is_none() && !entries.is_empty() {
            warn!("No email_domain configured; generated addresses will have an empty domain");
        }

        let mut users = Section::new(SECTION);
        for entry in entries {
            let user = prepare_user(entry, email_domain.unwrap_or_default())?;
            let (id, created) = store.get_or_create_user(&user)?;
            debug!(username = %user.username, created, "user resolved");
            users.insert(user.username, id);
        }
        Ok(users)
    }

    fn bind(ctx: &mut PipelineContext<'_>, output: Section<UserId>) -> usize {
        let len = output.len();
        ctx.users = Some(output);
        len
    }
}

/// Normalizes one entry and merges the computed defaults under its
/// explicit attributes.
pub fn prepare_user(entry: Value, email_domain: &str) -> Result<NewUser, BootstrapError> {
    let attributes = match entry {
        Value::String(username) => {
            let mut map = Map::new();
            map.insert("username".to_string(), Value::String(username));
            map
        }
        Value::Object(map) => map,
        other => {
            return Err(BootstrapError::InvalidEntry {
                section: SECTION,
                name: other.to_string(),
                source: serde::de::Error::custom("expected a username or an object"),
            })
        }
    };

    let username = match attributes.get("username").and_then(Value::as_str) {
        Some(username) => username.to_string(),
        None => {
            return Err(BootstrapError::InvalidEntry {
                section: SECTION,
                name: Value::Object(attributes).to_string(),
                source: serde::de::Error::missing_field("username"),
            })
        }
    };

    let mut merged = Map::new();
    merged.insert("username".to_string(), json!(username));
    merged.insert(
        "email".to_string(),
        json!(format!("{}@{}", username, email_domain)),
    );
    merged.insert("password".to_string(), json!(username));
    merged.insert("is_staff".to_string(), json!(true));
    merged.extend(attributes);

    decode(SECTION, &username, Value::Object(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{auth_repo, Database};
    use crate::pipeline::apply;
    use crate::source::BootstrapDocument;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prepare_bare_username() {
        let user = prepare_user(json!("alice"), "example.com").unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.password, "alice");
        assert!(user.is_staff);
        assert!(user.extra.is_empty());
    }

    #[test]
    fn test_prepare_object_matches_bare_username() {
        let from_object = prepare_user(json!({"username": "alice"}), "example.com").unwrap();
        let from_string = prepare_user(json!("alice"), "example.com").unwrap();
        assert_eq!(from_object, from_string);
    }

    #[test]
    fn test_prepare_keeps_extra_attributes() {
        let user = prepare_user(json!({"username": "alice", "foo": "bar"}), "example.com").unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.password, "alice");
        assert!(user.is_staff);
        assert_eq!(user.extra.get("foo"), Some(&json!("bar")));
    }

    #[test]
    fn test_explicit_attributes_override_defaults() {
        let user = prepare_user(
            json!({
                "username": "root",
                "email": "admin@corp.example",
                "password": "s3cret",
                "is_staff": false,
                "is_superuser": true,
            }),
            "example.com",
        )
        .unwrap();
        assert_eq!(user.email, "admin@corp.example");
        assert_eq!(user.password, "s3cret");
        assert!(!user.is_staff);
        assert!(user.is_superuser);
    }

    #[test]
    fn test_prepare_without_username_fails() {
        let err = prepare_user(json!({"email": "x@y"}), "example.com").unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidEntry { section: "users", .. }));
        assert!(prepare_user(json!(42), "example.com").is_err());
    }

    #[test]
    fn test_parse_creates_and_then_fetches() {
        let db = Database::open_in_memory().unwrap();
        let doc = BootstrapDocument::from_value(
            "t",
            json!({"email_domain": "example.com", "users": ["alice", {"username": "bob"}]}),
        )
        .unwrap();

        db.with_conn(|conn| {
            let mut ctx = PipelineContext::new(&doc, None);
            assert_eq!(apply::<Users>(&mut ctx, conn).unwrap(), 2);
            let alice = ctx.users().unwrap().id("alice").unwrap();

            let mut again = PipelineContext::new(&doc, None);
            apply::<Users>(&mut again, conn).unwrap();
            assert_eq!(again.users().unwrap().id("alice").unwrap(), alice);

            let count: u32 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
            assert_eq!(count, 2);
            let row = auth_repo::find_user(conn, "bob")?.unwrap();
            assert_eq!(row.email, "bob@example.com");
            assert!(row.is_staff);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_missing_section_defaults_to_empty_list() {
        let db = Database::open_in_memory().unwrap();
        let doc = BootstrapDocument::from_value("t", json!({})).unwrap();
        db.with_conn(|conn| {
            let mut ctx = PipelineContext::new(&doc, None);
            assert_eq!(apply::<Users>(&mut ctx, conn).unwrap(), 0);
            assert!(ctx.users().unwrap().is_empty());
            Ok(())
        })
        .unwrap();
    }
}
