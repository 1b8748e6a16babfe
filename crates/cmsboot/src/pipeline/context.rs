use crate::components::{PermissionGrants, ResolvedWorkflows};
use crate::entities::{CollectionId, GroupId, PageId, UserId};
use crate::source::BootstrapDocument;

use super::error::{BootstrapError, PipelineWarning};
use super::plan::SectionKind;
use super::section::Section;

/// Results of the sections that have run so far.
pub struct PipelineContext<'a> {
    // Input
    document: &'a BootstrapDocument,
    default_email_domain: Option<String>,

    pub users: Option<Section<UserId>>,
    pub groups: Option<Section<GroupId>>,
    pub permissions: Option<PermissionGrants>,
    pub pages: Option<Section<PageId>>,
    pub workflows: Option<ResolvedWorkflows>,
    pub collections: Option<Section<CollectionId>>,

    // Sections in the order they completed, with their entity counts
    pub completed: Vec<(SectionKind, usize)>,

    // Non-fatal warnings
    pub warnings: Vec<PipelineWarning>,
}

impl<'a> PipelineContext<'a> {
    pub fn new(document: &'a BootstrapDocument, default_email_domain: Option<String>) -> Self {
        Self {
            document,
            default_email_domain,
            users: None,
            groups: None,
            permissions: None,
            pages: None,
            workflows: None,
            collections: None,
            completed: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn document(&self) -> &'a BootstrapDocument {
        self.document
    }

    /// Domain for generated email addresses: the document's own
    /// `email_domain`, else the configured fallback.
    pub fn email_domain(&self) -> Option<&str> {
        self.document
            .str_key("email_domain")
            .or(self.default_email_domain.as_deref())
    }

    pub fn users(&self) -> Result<&Section<UserId>, BootstrapError> {
        self.users
            .as_ref()
            .ok_or(BootstrapError::SectionNotReady(SectionKind::Users))
    }

    pub fn groups(&self) -> Result<&Section<GroupId>, BootstrapError> {
        self.groups
            .as_ref()
            .ok_or(BootstrapError::SectionNotReady(SectionKind::Groups))
    }

    pub fn permissions(&self) -> Result<&PermissionGrants, BootstrapError> {
        self.permissions
            .as_ref()
            .ok_or(BootstrapError::SectionNotReady(SectionKind::Permissions))
    }

    pub fn pages(&self) -> Result<&Section<PageId>, BootstrapError> {
        self.pages
            .as_ref()
            .ok_or(BootstrapError::SectionNotReady(SectionKind::Pages))
    }

    pub fn workflows(&self) -> Result<&ResolvedWorkflows, BootstrapError> {
        self.workflows
            .as_ref()
            .ok_or(BootstrapError::SectionNotReady(SectionKind::Workflows))
    }

    pub fn collections(&self) -> Result<&Section<CollectionId>, BootstrapError> {
        self.collections
            .as_ref()
            .ok_or(BootstrapError::SectionNotReady(SectionKind::Collections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sections_not_ready_before_they_run() {
        let doc = BootstrapDocument::from_value("t", json!({})).unwrap();
        let ctx = PipelineContext::new(&doc, None);
        assert!(matches!(
            ctx.users(),
            Err(BootstrapError::SectionNotReady(SectionKind::Users))
        ));
        assert!(ctx.workflows().is_err());
    }

    #[test]
    fn test_email_domain_prefers_document() {
        let doc =
            BootstrapDocument::from_value("t", json!({"email_domain": "doc.example"})).unwrap();
        let ctx = PipelineContext::new(&doc, Some("fallback.example".to_string()));
        assert_eq!(ctx.email_domain(), Some("doc.example"));

        let doc = BootstrapDocument::from_value("t", json!({})).unwrap();
        let ctx = PipelineContext::new(&doc, Some("fallback.example".to_string()));
        assert_eq!(ctx.email_domain(), Some("fallback.example"));
    }
}
