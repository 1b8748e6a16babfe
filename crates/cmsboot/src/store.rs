//! The persistence contract the bootstrap components write through.
//!
//! Components only see `&dyn Store`. The SQLite implementation lives on
//! `rusqlite::Connection`, so a transaction (which derefs to a connection)
//! can be handed to the pipeline directly.

use rusqlite::Connection;

use crate::db::{auth_repo, moderation_repo, page_repo, DatabaseError};
use crate::entities::{
    CollectionId, ContentTypeId, GroupId, ModerationRequestId, NewCollection, NewPage, NewPlugin,
    NewRole, NewUser, NewWorkflow, NewWorkflowStep, PageContentId, PageGrants, PageId,
    PageVersion, PermissionId, PlaceholderId, PluginId, RoleId, UserId, VersionId, WorkflowId,
    WorkflowStepId,
};

/// Create, get-or-create and update operations on CMS entities.
///
/// `get_or_create_*` methods return the entity id and whether it was
/// created by this call. They never modify an entity that already exists.
pub trait Store {
    fn get_or_create_user(&self, user: &NewUser) -> Result<(UserId, bool), DatabaseError>;
    fn get_or_create_group(&self, name: &str) -> Result<(GroupId, bool), DatabaseError>;
    fn add_user_to_group(&self, user: UserId, group: GroupId) -> Result<(), DatabaseError>;

    fn find_content_type(
        &self,
        app_label: &str,
        model: &str,
    ) -> Result<Option<ContentTypeId>, DatabaseError>;
    fn ensure_content_type(&self, app_label: &str, model: &str)
        -> Result<ContentTypeId, DatabaseError>;
    fn find_permissions(
        &self,
        content_type: ContentTypeId,
        codenames: &[&str],
    ) -> Result<Vec<PermissionId>, DatabaseError>;
    fn grant_user_permissions(
        &self,
        user: UserId,
        permissions: &[PermissionId],
    ) -> Result<(), DatabaseError>;
    fn grant_group_permissions(
        &self,
        group: GroupId,
        permissions: &[PermissionId],
    ) -> Result<(), DatabaseError>;

    fn create_page(&self, page: &NewPage<'_>) -> Result<PageId, DatabaseError>;
    fn set_home(&self, page: PageId) -> Result<(), DatabaseError>;
    fn latest_version(&self, page: PageId) -> Result<Option<PageVersion>, DatabaseError>;
    fn find_placeholder(
        &self,
        content: PageContentId,
        slot: &str,
    ) -> Result<Option<PlaceholderId>, DatabaseError>;
    fn assign_user_to_page(
        &self,
        page: PageId,
        user: UserId,
        grants: &PageGrants,
    ) -> Result<(), DatabaseError>;
    fn add_plugin(&self, plugin: &NewPlugin<'_>) -> Result<PluginId, DatabaseError>;
    fn publish_version(&self, version: VersionId, user: UserId) -> Result<(), DatabaseError>;

    fn upsert_role(&self, role: &NewRole<'_>) -> Result<RoleId, DatabaseError>;
    fn get_or_create_workflow(
        &self,
        workflow: &NewWorkflow<'_>,
    ) -> Result<(WorkflowId, bool), DatabaseError>;
    fn add_workflow_step(
        &self,
        workflow: WorkflowId,
        step: &NewWorkflowStep,
    ) -> Result<WorkflowStepId, DatabaseError>;
    fn get_or_create_collection(
        &self,
        collection: &NewCollection<'_>,
    ) -> Result<(CollectionId, bool), DatabaseError>;
    fn add_moderation_request(
        &self,
        collection: CollectionId,
        version: VersionId,
        author: UserId,
    ) -> Result<ModerationRequestId, DatabaseError>;
}

impl Store for Connection {
    fn get_or_create_user(&self, user: &NewUser) -> Result<(UserId, bool), DatabaseError> {
        auth_repo::get_or_create_user(self, user)
    }

    fn get_or_create_group(&self, name: &str) -> Result<(GroupId, bool), DatabaseError> {
        auth_repo::get_or_create_group(self, name)
    }

    fn add_user_to_group(&self, user: UserId, group: GroupId) -> Result<(), DatabaseError> {
        auth_repo::add_user_to_group(self, user, group)
    }

    fn find_content_type(
        &self,
        app_label: &str,
        model: &str,
    ) -> Result<Option<ContentTypeId>, DatabaseError> {
        auth_repo::find_content_type(self, app_label, model)
    }

    fn ensure_content_type(
        &self,
        app_label: &str,
        model: &str,
    ) -> Result<ContentTypeId, DatabaseError> {
        auth_repo::ensure_content_type(self, app_label, model)
    }

    fn find_permissions(
        &self,
        content_type: ContentTypeId,
        codenames: &[&str],
    ) -> Result<Vec<PermissionId>, DatabaseError> {
        auth_repo::find_permissions(self, content_type, codenames)
    }

    fn grant_user_permissions(
        &self,
        user: UserId,
        permissions: &[PermissionId],
    ) -> Result<(), DatabaseError> {
        auth_repo::grant_user_permissions(self, user, permissions)
    }

    fn grant_group_permissions(
        &self,
        group: GroupId,
        permissions: &[PermissionId],
    ) -> Result<(), DatabaseError> {
        auth_repo::grant_group_permissions(self, group, permissions)
    }

    fn create_page(&self, page: &NewPage<'_>) -> Result<PageId, DatabaseError> {
        page_repo::create_page(self, page)
    }

    fn set_home(&self, page: PageId) -> Result<(), DatabaseError> {
        page_repo::set_home(self, page)
    }

    fn latest_version(&self, page: PageId) -> Result<Option<PageVersion>, DatabaseError> {
        page_repo::latest_version(self, page)
    }

    fn find_placeholder(
        &self,
        content: PageContentId,
        slot: &str,
    ) -> Result<Option<PlaceholderId>, DatabaseError> {
        page_repo::find_placeholder(self, content, slot)
    }

    fn assign_user_to_page(
        &self,
        page: PageId,
        user: UserId,
        grants: &PageGrants,
    ) -> Result<(), DatabaseError> {
        page_repo::assign_user(self, page, user, grants)
    }

    fn add_plugin(&self, plugin: &NewPlugin<'_>) -> Result<PluginId, DatabaseError> {
        page_repo::add_plugin(self, plugin)
    }

    fn publish_version(&self, version: VersionId, user: UserId) -> Result<(), DatabaseError> {
        page_repo::publish_version(self, version, user)
    }

    fn upsert_role(&self, role: &NewRole<'_>) -> Result<RoleId, DatabaseError> {
        moderation_repo::upsert_role(self, role)
    }

    fn get_or_create_workflow(
        &self,
        workflow: &NewWorkflow<'_>,
    ) -> Result<(WorkflowId, bool), DatabaseError> {
        moderation_repo::get_or_create_workflow(self, workflow)
    }

    fn add_workflow_step(
        &self,
        workflow: WorkflowId,
        step: &NewWorkflowStep,
    ) -> Result<WorkflowStepId, DatabaseError> {
        moderation_repo::add_workflow_step(self, workflow, step)
    }

    fn get_or_create_collection(
        &self,
        collection: &NewCollection<'_>,
    ) -> Result<(CollectionId, bool), DatabaseError> {
        moderation_repo::get_or_create_collection(self, collection)
    }

    fn add_moderation_request(
        &self,
        collection: CollectionId,
        version: VersionId,
        author: UserId,
    ) -> Result<ModerationRequestId, DatabaseError> {
        moderation_repo::add_moderation_request(self, collection, version, author)
    }
}
