//! Groups: logical name → `{name, users?}`. Groups are matched on their
//! display name; listed users are added as members.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::entities::GroupId;
use crate::pipeline::component::{decode, entries};
use crate::pipeline::{BootstrapError, Component, PipelineContext, Section, SectionKind};
use crate::store::Store;

const SECTION: &str = "groups";

#[derive(Debug, Deserialize)]
struct GroupSpec {
    name: String,
    #[serde(default)]
    users: Vec<String>,
}

pub struct Groups;

impl Component for Groups {
    const KIND: SectionKind = SectionKind::Groups;

    type Output = Section<GroupId>;

    fn parse(
        ctx: &PipelineContext<'_>,
        store: &dyn Store,
        raw: Value,
    ) -> Result<Section<GroupId>, BootstrapError> {
        let users = ctx.users()?;
        let mut groups = Section::new(SECTION);

        for (name, data) in entries(SECTION, raw)? {
            let spec: GroupSpec = decode(SECTION, &name, data)?;
            let (group, created) = store.get_or_create_group(&spec.name)?;
            debug!(group = %spec.name, created, "group resolved");

            for username in &spec.users {
                store.add_user_to_group(users.id(username)?, group)?;
            }
            groups.insert(name, group);
        }
        Ok(groups)
    }

    fn bind(ctx: &mut PipelineContext<'_>, output: Section<GroupId>) -> usize {
        let len = output.len();
        ctx.groups = Some(output);
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Users;
    use crate::db::Database;
    use crate::pipeline::apply;
    use crate::source::BootstrapDocument;
    use serde_json::json;

    fn run(db: &Database, value: Value) -> Result<Section<GroupId>, BootstrapError> {
        let doc = BootstrapDocument::from_value("t", value).unwrap();
        db.with_conn(|conn| {
            let mut ctx = PipelineContext::new(&doc, Some("example.com".to_string()));
            let result = apply::<Users>(&mut ctx, conn)
                .and_then(|_| apply::<Groups>(&mut ctx, conn))
                .map(|_| ctx.groups.take().unwrap());
            Ok(result)
        })
        .unwrap()
    }

    #[test]
    fn test_parse_keys_by_logical_name() {
        let db = Database::open_in_memory().unwrap();
        let groups = run(
            &db,
            json!({"users": [], "groups": {"editors": {"name": "Site editors"}}}),
        )
        .unwrap();
        assert!(groups.contains("editors"));
        assert!(!groups.contains("Site editors"));
    }

    #[test]
    fn test_parse_adds_members() {
        let db = Database::open_in_memory().unwrap();
        run(
            &db,
            json!({
                "users": ["user1", "user2"],
                "groups": {"editors": {"name": "Editors", "users": ["user1", "user2"]}},
            }),
        )
        .unwrap();

        db.with_conn(|conn| {
            let members: u32 =
                conn.query_row("SELECT COUNT(*) FROM user_groups", [], |r| r.get(0))?;
            assert_eq!(members, 2);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_unknown_member_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = run(
            &db,
            json!({"users": [], "groups": {"editors": {"name": "Editors", "users": ["ghost"]}}}),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::NotFound { section: "users", ref name } if name == "ghost"
        ));
    }

    #[test]
    fn test_rerun_does_not_duplicate_groups() {
        let db = Database::open_in_memory().unwrap();
        let doc = json!({
            "users": ["user1"],
            "groups": {"editors": {"name": "Editors", "users": ["user1"]}},
        });
        let first = run(&db, doc.clone()).unwrap();
        let second = run(&db, doc).unwrap();
        assert_eq!(first.id("editors").unwrap(), second.id("editors").unwrap());

        db.with_conn(|conn| {
            let groups: u32 = conn.query_row(
                "SELECT COUNT(*) FROM auth_groups WHERE name = 'Editors'",
                [],
                |r| r.get(0),
            )?;
            assert_eq!(groups, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_missing_section_is_a_configuration_error() {
        let db = Database::open_in_memory().unwrap();
        let err = run(&db, json!({"users": []})).unwrap_err();
        assert!(matches!(err, BootstrapError::MissingSection(SectionKind::Groups)));
    }
}
