//! Which sections run, in which order.
//!
//! A [`Plan`] is validated when it is built: every section appears at most
//! once and only after the sections it reads from.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::PlanError;

/// The six bootstrap sections.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Users,
    Groups,
    Permissions,
    Pages,
    Workflows,
    Collections,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Users,
        SectionKind::Groups,
        SectionKind::Permissions,
        SectionKind::Pages,
        SectionKind::Workflows,
        SectionKind::Collections,
    ];

    /// Top-level document key holding this section's data.
    pub fn field_name(self) -> &'static str {
        match self {
            SectionKind::Users => "users",
            SectionKind::Groups => "groups",
            SectionKind::Permissions => "permissions",
            SectionKind::Pages => "pages",
            SectionKind::Workflows => "workflows",
            SectionKind::Collections => "collections",
        }
    }

    /// Sections whose results this section looks names up in.
    pub fn dependencies(self) -> &'static [SectionKind] {
        match self {
            SectionKind::Users => &[],
            SectionKind::Groups => &[SectionKind::Users],
            SectionKind::Permissions => &[SectionKind::Users, SectionKind::Groups],
            SectionKind::Pages => &[SectionKind::Users],
            SectionKind::Workflows => &[SectionKind::Users, SectionKind::Groups],
            SectionKind::Collections => &[
                SectionKind::Users,
                SectionKind::Pages,
                SectionKind::Workflows,
            ],
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    sections: Vec<SectionKind>,
}

impl Plan {
    pub fn new(sections: impl IntoIterator<Item = SectionKind>) -> Result<Self, PlanError> {
        let mut ordered: Vec<SectionKind> = Vec::new();
        for section in sections {
            if ordered.contains(&section) {
                return Err(PlanError::Duplicate(section));
            }
            if let Some(missing) = section
                .dependencies()
                .iter()
                .find(|dep| !ordered.contains(dep))
            {
                return Err(PlanError::MissingDependency {
                    section,
                    requires: *missing,
                });
            }
            ordered.push(section);
        }
        Ok(Self { sections: ordered })
    }

    /// Users, Groups, Permissions, Pages, Workflows, Collections.
    pub fn standard() -> Self {
        Self {
            sections: SectionKind::ALL.to_vec(),
        }
    }

    pub fn sections(&self) -> &[SectionKind] {
        &self.sections
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::standard()
    }
}
