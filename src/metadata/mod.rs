//! Parameter metadata decoded from the metadata service.
mod defaults;
mod tree;

pub use defaults::DefaultValueBucket;
pub use tree::parse_document;

use defaults::resolve_default_values;
use tree::MetaDocument;

use crate::normalize::collapse_whitespace;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// One parameter of a tool: its leaf metadata fields and resolved defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub fields: BTreeMap<String, String>,
    pub defaults: DefaultValueBucket,
}

impl Parameter {
    /// Decode a `parameterdetails` response for `name`.
    pub fn from_details(name: &str, xml: &str) -> Result<Self> {
        let document =
            parse_document(xml).with_context(|| format!("parse details of parameter {name}"))?;
        if document.root_tag != "parameter" {
            tracing::debug!(parameter = name, root = %document.root_tag, "unexpected details root");
        }
        Ok(Self::from_document(name, &document))
    }

    fn from_document(name: &str, document: &MetaDocument) -> Self {
        Self {
            name: name.to_string(),
            fields: document.leaf_fields(),
            defaults: resolve_default_values(name, &document.root),
        }
    }

    /// Display label, falling back to the parameter name.
    pub fn label(&self) -> String {
        match self.fields.get("name") {
            Some(label) if !label.trim().is_empty() => collapse_whitespace(label),
            _ => self.name.clone(),
        }
    }

    pub fn doc(&self) -> String {
        self.fields
            .get("description")
            .map(|text| collapse_whitespace(text))
            .unwrap_or_default()
    }
}
