//! Builder for bootstrap documents.

#![allow(dead_code)]

use serde_json::{json, Map, Value};

use cmsboot::BootstrapDocument;

/// Builds a document whose required sections start out empty.
pub struct DocumentBuilder {
    name: String,
    sections: Map<String, Value>,
}

impl DocumentBuilder {
    pub fn new(name: &str) -> Self {
        let mut sections = Map::new();
        sections.insert("email_domain".to_string(), json!("example.com"));
        sections.insert("users".to_string(), json!([]));
        sections.insert("groups".to_string(), json!({}));
        sections.insert("permissions".to_string(), json!({}));
        sections.insert("workflows".to_string(), json!({}));
        Self {
            name: name.to_string(),
            sections,
        }
    }

    pub fn users(self, users: Value) -> Self {
        self.section("users", users)
    }

    pub fn group(mut self, key: &str, name: &str, members: &[&str]) -> Self {
        self.entry("groups", key, json!({"name": name, "users": members}));
        self
    }

    pub fn page(mut self, key: &str, page: Value) -> Self {
        self.entry("pages", key, page);
        self
    }

    pub fn role(mut self, key: &str, role: Value) -> Self {
        self.entry("roles", key, role);
        self
    }

    pub fn workflow(mut self, key: &str, workflow: Value) -> Self {
        self.entry("workflows", key, workflow);
        self
    }

    pub fn collection(mut self, key: &str, collection: Value) -> Self {
        self.entry("collections", key, collection);
        self
    }

    /// Replaces or removes a whole section.
    pub fn section(mut self, name: &str, value: Value) -> Self {
        self.sections.insert(name.to_string(), value);
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.sections.remove(name);
        self
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.sections.clone())
    }

    pub fn build(self) -> BootstrapDocument {
        BootstrapDocument::from_value(self.name, Value::Object(self.sections))
            .expect("builder always produces an object")
    }

    fn entry(&mut self, section: &str, key: &str, value: Value) {
        let slot = self
            .sections
            .entry(section.to_string())
            .or_insert_with(|| json!({}));
        if let Value::Object(map) = slot {
            map.insert(key.to_string(), value);
        }
    }
}

/// A small site touching every section.
pub fn site_document() -> DocumentBuilder {
    DocumentBuilder::new("site")
        .users(json!(["editor", {"username": "reviewer", "first_name": "Rita"}]))
        .group("editors", "Editors", &["editor"])
        .group("reviewers", "Reviewers", &["reviewer"])
        .section(
            "permissions",
            json!({
                "aliases": {"edit": [["add_page", "cms", "page"], ["change_page", "cms", "page"]]},
                "users": {"editor": ["edit"]},
                "groups": {"reviewers": [["view_page", "cms", "page"]]},
            }),
        )
        .page(
            "home",
            json!({
                "title": "Home",
                "language": "en",
                "created_by": "editor",
                "is_home": true,
                "content": [{"type": "TextPlugin", "body": "Hello"}],
            }),
        )
        .role("review", json!({"name": "Review", "group": "reviewers"}))
        .workflow(
            "default",
            json!({"name": "Default", "is_default": true, "steps": [{"role": "review"}]}),
        )
        .collection(
            "launch",
            json!({"user": "editor", "workflow": "default", "pages": ["home"]}),
        )
}
