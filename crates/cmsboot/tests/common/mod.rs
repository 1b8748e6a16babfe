//! Shared utilities for cmsboot integration tests.
//!
//! - `TestHarness`: a file-backed database in a temp directory
//! - `DocumentBuilder`: bootstrap documents built section by section

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
