//! End-to-end tests for the bootstrap pipeline against a file-backed
//! database.

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use cmsboot::db::{auth_repo, moderation_repo, page_repo};
use cmsboot::pipeline::{PipelineWarning, SectionKind};
use cmsboot::{resolve_source, BootstrapDocument, BootstrapError, Database};

use common::{site_document, DocumentBuilder, TestHarness};

#[test]
fn test_full_site_bootstrap() {
    let harness = TestHarness::new();
    let summaries = harness.bootstrap(&[site_document().build()]).unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(
        summaries[0].sections,
        vec![
            (SectionKind::Users, 2),
            (SectionKind::Groups, 2),
            (SectionKind::Permissions, 2),
            (SectionKind::Pages, 1),
            (SectionKind::Workflows, 2),
            (SectionKind::Collections, 1),
        ]
    );
    assert!(summaries[0].warnings.is_empty());

    harness
        .db
        .with_conn(|conn| {
            let editor = auth_repo::find_user(conn, "editor")?.unwrap();
            assert_eq!(editor.email, "editor@example.com");
            assert!(auth_repo::verify_password("editor", &editor.password));
            assert_eq!(
                auth_repo::user_permission_codenames(conn, editor.id)?,
                vec!["add_page", "change_page"]
            );

            let collection = moderation_repo::find_collection(conn, "launch")?.unwrap();
            assert_eq!(collection.author, editor.id);
            let home: cmsboot::entities::PageId =
                conn.query_row("SELECT id FROM pages WHERE is_home = 1", [], |r| r.get(0))?;
            let version = page_repo::latest_version(conn, home)?.unwrap();
            assert_eq!(
                moderation_repo::collection_versions(conn, collection.id)?,
                vec![version.version]
            );
            Ok(())
        })
        .unwrap();

    assert_eq!(harness.count("plugins"), 1);
    assert_eq!(harness.count("workflow_steps"), 1);
}

#[test]
fn test_rerun_creates_only_new_pages_and_keeps_existing_rows() {
    let harness = TestHarness::new();
    harness.bootstrap(&[site_document().build()]).unwrap();
    let before = harness.snapshot();
    let stored_before = stored_rows(&harness);

    let rerun = site_document()
        .workflow(
            "default",
            json!({"name": "Default", "is_default": false, "note": "changed", "steps": []}),
        )
        .collection(
            "launch",
            json!({"user": "reviewer", "workflow": "default", "pages": ["home"]}),
        );
    harness.bootstrap(&[rerun.build()]).unwrap();
    let after = harness.snapshot();
    assert_eq!(stored_rows(&harness), stored_before);

    let changed: Vec<&str> = before
        .iter()
        .zip(&after)
        .filter(|(b, a)| b.1 != a.1)
        .map(|(b, _)| b.0)
        .collect();
    assert_eq!(
        changed,
        vec!["pages", "page_contents", "versions", "placeholders", "plugins"]
    );
    assert_eq!(harness.count("users"), 2);
    assert_eq!(harness.count("moderation_collections"), 1);
    assert_eq!(harness.count("moderation_requests"), 1);
}

type StoredWorkflow = (bool, String, String);

/// Collection and workflow rows as stored, for comparison across runs.
fn stored_rows(harness: &TestHarness) -> (moderation_repo::CollectionRow, StoredWorkflow) {
    harness
        .db
        .with_conn(|conn| {
            let collection = moderation_repo::find_collection(conn, "launch")?.unwrap();
            let workflow = conn.query_row(
                "SELECT is_default, attributes, created_at FROM workflows WHERE name = 'Default'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )?;
            Ok((collection, workflow))
        })
        .unwrap()
}

#[test]
fn test_failure_rolls_back_every_document() {
    let harness = TestHarness::new();
    let good = site_document().build();
    let bad = DocumentBuilder::new("bad")
        .users(json!(["someone"]))
        .group("crew", "Crew", &["nobody"])
        .build();

    let err = harness.bootstrap(&[good, bad]).unwrap_err();
    assert!(matches!(
        err,
        BootstrapError::NotFound { section: "users", ref name } if name == "nobody"
    ));

    for (table, count) in harness.snapshot() {
        assert_eq!(count, 0, "{} should be empty after rollback", table);
    }
}

#[test]
fn test_missing_required_section_fails() {
    let harness = TestHarness::new();
    let doc = DocumentBuilder::new("no-groups").without("groups").build();
    let err = harness.bootstrap(&[doc]).unwrap_err();
    assert!(matches!(err, BootstrapError::MissingSection(SectionKind::Groups)));
}

#[test]
fn test_unknown_content_type_is_skipped_with_warning() {
    let harness = TestHarness::new();
    let doc = DocumentBuilder::new("perm")
        .users(json!(["alice"]))
        .section(
            "permissions",
            json!({"users": {"alice": [
                ["add_widget", "shop", "widget"],
                ["view_page", "cms", "page"],
            ]}}),
        )
        .build();

    let summaries = harness.bootstrap(&[doc]).unwrap();
    assert_eq!(
        summaries[0].warnings,
        vec![PipelineWarning::MissingContentType {
            app_label: "shop".to_string(),
            model: "widget".to_string(),
        }]
    );
    assert_eq!(harness.count("user_permissions"), 1);
}

#[test]
fn test_builtin_sources_run_in_order() {
    let harness = TestHarness::new();
    let documents: Vec<BootstrapDocument> = ["roles", "demo"]
        .iter()
        .map(|name| resolve_source(name).unwrap().load().unwrap())
        .collect();

    let summaries = harness.bootstrap(&documents).unwrap();
    assert_eq!(summaries[0].document, "roles");
    assert_eq!(summaries[1].document, "demo");
    assert!(summaries.iter().all(|s| s.warnings.is_empty()));

    assert_eq!(harness.count("workflows"), 1);
    assert_eq!(harness.count("workflow_steps"), 2);
    assert_eq!(harness.count("moderation_requests"), 2);
}

#[test]
fn test_file_source_is_resolved_by_path() {
    let harness = TestHarness::new();
    let path = harness.write_source(
        "site.json",
        &serde_json::to_string(&site_document().to_value()).unwrap(),
    );

    let document = resolve_source(&path.display().to_string())
        .unwrap()
        .load()
        .unwrap();
    harness.bootstrap(&[document]).unwrap();
    assert_eq!(harness.count("moderation_collections"), 1);
}

#[test]
fn test_data_survives_reopen() {
    let harness = TestHarness::new();
    harness.bootstrap(&[site_document().build()]).unwrap();

    let reopened = Database::open(&harness.db_path).unwrap();
    let users: u32 = reopened
        .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
        .unwrap();
    assert_eq!(users, 2);
}
