//! The contract every bootstrap section implements.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::context::PipelineContext;
use super::error::BootstrapError;
use super::plan::SectionKind;
use crate::store::Store;

/// One section of the bootstrap document.
///
/// `parse` reads the section's raw data and earlier sections' results from
/// the context, and writes through the store. `bind` publishes the result
/// on the context for the sections that run later.
pub trait Component {
    const KIND: SectionKind;

    type Output;

    /// Data to parse when the document has no such section. Sections
    /// without a default fail with [`BootstrapError::MissingSection`].
    fn default_data() -> Option<Value> {
        None
    }

    fn parse(
        ctx: &PipelineContext<'_>,
        store: &dyn Store,
        raw: Value,
    ) -> Result<Self::Output, BootstrapError>;

    /// Stores the output on the context and returns how many named
    /// entities it holds.
    fn bind(ctx: &mut PipelineContext<'_>, output: Self::Output) -> usize;
}

/// Runs one component against the context's document.
pub fn apply<C: Component>(
    ctx: &mut PipelineContext<'_>,
    store: &dyn Store,
) -> Result<usize, BootstrapError> {
    let raw = match ctx.document().section(C::KIND.field_name()) {
        Some(raw) => raw.clone(),
        None => C::default_data().ok_or(BootstrapError::MissingSection(C::KIND))?,
    };
    let output = C::parse(ctx, store, raw)?;
    Ok(C::bind(ctx, output))
}

/// Reads a section that maps logical names to entries.
pub(crate) fn entries(
    section: &'static str,
    raw: Value,
) -> Result<Map<String, Value>, BootstrapError> {
    serde_json::from_value(raw).map_err(|source| BootstrapError::InvalidSection { section, source })
}

/// Decodes a single named entry of a section.
pub(crate) fn decode<T: DeserializeOwned>(
    section: &'static str,
    name: &str,
    value: Value,
) -> Result<T, BootstrapError> {
    serde_json::from_value(value).map_err(|source| BootstrapError::InvalidEntry {
        section,
        name: name.to_string(),
        source,
    })
}
