use indexmap::IndexMap;

use super::error::BootstrapError;

/// Logical name → entity mapping produced by one component.
///
/// Names are unique; inserting a name twice keeps the last entity.
/// Lookups of unknown names fail with [`BootstrapError::NotFound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<E> {
    label: &'static str,
    entries: IndexMap<String, E>,
}

impl<E> Section<E> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, entity: E) {
        self.entries.insert(name.into(), entity);
    }

    pub fn get(&self, name: &str) -> Result<&E, BootstrapError> {
        self.entries.get(name).ok_or_else(|| BootstrapError::NotFound {
            section: self.label,
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &E)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<E: Copy> Section<E> {
    /// Copies an id-like entity out of the section.
    pub fn id(&self, name: &str) -> Result<E, BootstrapError> {
        self.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_unknown_name_is_not_found() {
        let mut section = Section::new("users");
        section.insert("alice", 1);
        assert_eq!(section.id("alice").unwrap(), 1);

        let err = section.get("bob").unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::NotFound { section: "users", ref name } if name == "bob"
        ));
        assert_eq!(err.to_string(), "No entry named 'bob' in users");
    }

    #[test]
    fn test_last_write_wins_and_order_is_kept() {
        let mut section = Section::new("groups");
        section.insert("b", 1);
        section.insert("a", 2);
        section.insert("b", 3);
        assert_eq!(section.len(), 2);
        assert_eq!(section.id("b").unwrap(), 3);
        let names: Vec<&str> = section.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
