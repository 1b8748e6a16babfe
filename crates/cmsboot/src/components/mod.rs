//! The six bootstrap sections, in the order the standard plan runs them.

pub mod collections;
pub mod groups;
pub mod pages;
pub mod permissions;
pub mod users;
pub mod workflows;

pub use collections::Collections;
pub use groups::Groups;
pub use pages::Pages;
pub use permissions::{PermissionGrants, PermissionRef, PermissionTriple, Permissions};
pub use users::Users;
pub use workflows::{ResolvedWorkflows, Workflows};
