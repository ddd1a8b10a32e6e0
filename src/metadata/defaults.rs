//! Context-bucketed default values for one parameter.
//!
//! A parameter's `<values>` list may flag entries as the default either
//! generically (`defaultValue=true`) or per sequence context through a
//! `defaultValueContexts` property. Both are collected here, in list order.
use super::tree::MetaNode;
use serde::Serialize;

/// Sequence-type discriminator; its defaults are not context-relevant.
pub const STYPE_PARAMETER: &str = "stype";

pub const CONTEXTS_PROPERTY_KEY: &str = "defaultValueContexts";

/// Sequence contexts a default may be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceContext {
    Protein,
    Nucleotide,
    Vector,
}

impl SequenceContext {
    pub const ALL: [SequenceContext; 3] = [
        SequenceContext::Protein,
        SequenceContext::Nucleotide,
        SequenceContext::Vector,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SequenceContext::Protein => "protein",
            SequenceContext::Nucleotide => "nucleotide",
            SequenceContext::Vector => "vector",
        }
    }
}

/// Default values grouped by the context they apply to.
///
/// Lists are append-only and never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefaultValueBucket {
    pub protein: Vec<String>,
    pub nucleotide: Vec<String>,
    pub vector: Vec<String>,
    pub generic: Vec<String>,
}

impl DefaultValueBucket {
    fn context_mut(&mut self, context: SequenceContext) -> &mut Vec<String> {
        match context {
            SequenceContext::Protein => &mut self.protein,
            SequenceContext::Nucleotide => &mut self.nucleotide,
            SequenceContext::Vector => &mut self.vector,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.protein.is_empty()
            && self.nucleotide.is_empty()
            && self.vector.is_empty()
            && self.generic.is_empty()
    }

    /// The emitted default: generic values joined by commas.
    pub fn generic_joined(&self) -> String {
        self.generic.join(",")
    }
}

/// Resolve the default buckets for `name` from its `<parameter>` tree.
///
/// Shapes that do not match the expected layout contribute nothing.
pub fn resolve_default_values(name: &str, parameter: &MetaNode) -> DefaultValueBucket {
    let mut bucket = DefaultValueBucket::default();
    if name == STYPE_PARAMETER {
        return bucket;
    }
    for entry in value_entries(parameter) {
        collect_context_defaults(entry, &mut bucket);
        collect_generic_default(entry, &mut bucket);
    }
    bucket
}

fn value_entries(parameter: &MetaNode) -> &[MetaNode] {
    parameter
        .get("values")
        .and_then(|values| values.get("value"))
        .map(MetaNode::as_items)
        .unwrap_or_default()
}

fn properties(entry: &MetaNode) -> &[MetaNode] {
    entry
        .get("properties")
        .and_then(|props| props.get("property"))
        .map(MetaNode::as_items)
        .unwrap_or_default()
}

/// Contexts named by a `defaultValueContexts` property, if `property` is one.
fn property_contexts(property: &MetaNode) -> Option<impl Iterator<Item = SequenceContext> + '_> {
    let key = property.text_at("key")?;
    let value = property.text_at("value")?;
    if key != CONTEXTS_PROPERTY_KEY {
        return None;
    }
    Some(
        SequenceContext::ALL
            .into_iter()
            .filter(move |context| value.contains(context.as_str())),
    )
}

fn collect_context_defaults(entry: &MetaNode, bucket: &mut DefaultValueBucket) {
    let Some(value) = entry.text_at("value") else {
        return;
    };
    for property in properties(entry) {
        if let Some(contexts) = property_contexts(property) {
            for context in contexts {
                bucket.context_mut(context).push(value.to_string());
            }
        }
    }
}

fn collect_generic_default(entry: &MetaNode, bucket: &mut DefaultValueBucket) {
    if entry.text_at("defaultValue") != Some("true") {
        return;
    }
    if let Some(value) = entry.text_at("value") {
        bucket.generic.push(value.to_string());
    }
}

#[cfg(test)]
#[path = "defaults_tests.rs"]
mod tests;
