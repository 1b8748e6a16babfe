//! Bootstrap documents and where they come from.
//!
//! A document is a JSON object whose top-level keys name the sections the
//! pipeline consumes (`users`, `groups`, ...) plus a few auxiliary keys
//! (`email_domain`, `roles`, `aliases`). Named sources resolve to one of
//! the built-in documents first and to a file path otherwise.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::SourceError;

/// Documents shipped with the crate, addressable by name.
pub const BUILTIN_SOURCES: &[(&str, &str)] = &[
    ("roles", include_str!("../data/roles.json")),
    ("demo", include_str!("../data/demo.json")),
];

/// A parsed bootstrap document. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapDocument {
    name: String,
    sections: Map<String, Value>,
}

impl BootstrapDocument {
    pub fn from_value(name: impl Into<String>, value: Value) -> Result<Self, SourceError> {
        let name = name.into();
        match value {
            Value::Object(sections) => Ok(Self { name, sections }),
            _ => Err(SourceError::NotAnObject { name }),
        }
    }

    pub fn from_json(name: impl Into<String>, content: &str) -> Result<Self, SourceError> {
        let name = name.into();
        let value = serde_json::from_str(content).map_err(|source| SourceError::ParseJson {
            name: name.clone(),
            source,
        })?;
        Self::from_value(name, value)
    }

    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self, SourceError> {
        let name = name.into();
        let value = serde_json::from_reader(reader).map_err(|source| SourceError::ParseJson {
            name: name.clone(),
            source,
        })?;
        Self::from_value(name, value)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| SourceError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_reader(path.display().to_string(), std::io::BufReader::new(file))
    }

    /// Name the document was loaded under (built-in name or file path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw data of a top-level key. An explicit `null` counts as absent.
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.sections.get(key).filter(|v| !v.is_null())
    }

    /// A top-level key holding a string.
    pub fn str_key(&self, key: &str) -> Option<&str> {
        self.section(key).and_then(Value::as_str)
    }
}

/// A named data source resolved to either a built-in document or a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Builtin {
        name: &'static str,
        content: &'static str,
    },
    File(PathBuf),
}

impl DataSource {
    pub fn load(&self) -> Result<BootstrapDocument, SourceError> {
        match self {
            DataSource::Builtin { name, content } => BootstrapDocument::from_json(*name, content),
            DataSource::File(path) => BootstrapDocument::from_path(path),
        }
    }
}

/// Resolves a source name: built-in documents first, then a path on disk.
pub fn resolve_source(name: &str) -> Result<DataSource, SourceError> {
    if let Some(&(builtin, content)) = BUILTIN_SOURCES.iter().find(|(n, _)| *n == name) {
        return Ok(DataSource::Builtin {
            name: builtin,
            content,
        });
    }

    let path = PathBuf::from(name);
    if path.is_file() {
        Ok(DataSource::File(path))
    } else {
        Err(SourceError::NotFound(name.to_string()))
    }
}

/// Resolves and parses sources in order. The first missing or malformed
/// source stops the load.
pub fn load_sources<S: AsRef<str>>(names: &[S]) -> Result<Vec<BootstrapDocument>, SourceError> {
    names
        .iter()
        .map(|name| resolve_source(name.as_ref())?.load())
        .collect()
}
