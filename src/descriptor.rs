//! Input-field synthesis for generated CWL descriptors.
//!
//! Parameters are filtered, given CLI-binding positions in metadata order, and
//! rendered as indented YAML blocks that the template splices into `inputs:`.
use crate::metadata::Parameter;
use serde::Serialize;
use std::collections::BTreeMap;

/// Tools taking two sequence inputs; they reserve one more leading position.
pub const TWO_SEQUENCE_TOOLS: &[&str] = &[
    "emboss_needle",
    "emboss_stretcher",
    "emboss_water",
    "emboss_matcher",
    "lalign",
    "genewise",
    "emboss_dotmatcher",
    "emboss_dotpath",
    "emboss_dottup",
    "promoterwise",
    "wise2dba",
];

pub const SINGLE_SEQUENCE_BASE_POSITION: u32 = 8;
pub const TWO_SEQUENCE_BASE_POSITION: u32 = 9;

/// Parameters whose names contain this are bound as sequence inputs elsewhere.
const SEQUENCE_MARKER: &str = "sequence";

const INPUT_TYPE: &str = "string?";

const COMPUTED_FIELDS: &[&str] = &[
    "id",
    "url",
    "lang",
    "lang_ext",
    "docker",
    "two_sequence",
    "inputs_req",
    "inputs_opt",
];

pub fn is_two_sequence_tool(tool_id: &str) -> bool {
    TWO_SEQUENCE_TOOLS.contains(&tool_id)
}

/// Last position reserved ahead of a tool's optional inputs.
pub fn base_position(tool_id: &str) -> u32 {
    if is_two_sequence_tool(tool_id) {
        TWO_SEQUENCE_BASE_POSITION
    } else {
        SINGLE_SEQUENCE_BASE_POSITION
    }
}

/// Whether a parameter becomes an optional input. The match is case-sensitive.
pub fn is_optional_input(name: &str) -> bool {
    !name.contains(SEQUENCE_MARKER)
}

/// An optional input with its assigned binding position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionedInput<'a> {
    pub parameter: &'a Parameter,
    pub position: u32,
}

/// Keep eligible parameters in their given order and number them from
/// `base + 1`.
pub fn assign_positions(parameters: &[Parameter], base: u32) -> Vec<PositionedInput<'_>> {
    let mut position = base;
    parameters
        .iter()
        .filter(|parameter| is_optional_input(&parameter.name))
        .map(|parameter| {
            position += 1;
            PositionedInput {
                parameter,
                position,
            }
        })
        .collect()
}

/// Render one optional input block.
pub fn render_input_field(input: &PositionedInput<'_>) -> String {
    let parameter = input.parameter;
    let name = &parameter.name;
    let mut out = String::new();
    out.push_str(&format!("  {name}:\n"));
    out.push_str(&format!("    type: {INPUT_TYPE}\n"));
    out.push_str(&format!("    label: \"{}\"\n", escape_quoted(&parameter.label())));
    out.push_str(&format!("    doc: \"{}\"\n", escape_quoted(&parameter.doc())));
    out.push_str("    inputBinding:\n");
    out.push_str(&format!("      prefix: --{name}\n"));
    out.push_str(&format!("      position: {}\n", input.position));
    let default = parameter.defaults.generic_joined();
    if !default.is_empty() {
        out.push_str(&format!("    default: \"{}\"\n", escape_quoted(&default)));
    }
    out
}

/// The `inputs_opt` section: every eligible parameter's block, in position order.
pub fn render_optional_inputs(parameters: &[Parameter], base: u32) -> Vec<String> {
    assign_positions(parameters, base)
        .iter()
        .map(render_input_field)
        .collect()
}

fn escape_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Everything the template needs to render one tool's descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub id: String,
    pub url: String,
    pub filename: String,
    pub lang: String,
    pub lang_ext: String,
    pub description: String,
    pub docker: bool,
    pub two_sequence: bool,
    pub inputs_req: String,
    pub inputs_opt: String,
    pub outputs: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ToolDescriptor {
    pub fn new(id: &str, url: String, lang: &str, lang_ext: &str) -> Self {
        Self {
            id: id.to_string(),
            url,
            filename: format!("{id}.cwl"),
            lang: lang.to_string(),
            lang_ext: lang_ext.to_string(),
            description: String::new(),
            docker: false,
            two_sequence: is_two_sequence_tool(id),
            inputs_req: String::new(),
            inputs_opt: String::new(),
            outputs: String::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Fill the input sections from the tool's parameters, in metadata order.
    pub fn set_inputs(&mut self, parameters: &[Parameter]) {
        // Sequence and account inputs are declared by the template itself.
        self.inputs_req.clear();
        self.inputs_opt = render_optional_inputs(parameters, base_position(&self.id)).join("\n");
    }

    /// Merge static per-tool configuration.
    ///
    /// `filename`, `description` and `outputs` replace the computed values and
    /// keys naming other computed fields are ignored. Everything else is
    /// exposed to the template as an extra field.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, String>) {
        for (key, value) in overrides {
            match key.as_str() {
                "filename" => self.filename = value.clone(),
                "description" => self.description = value.clone(),
                "outputs" => self.outputs = value.clone(),
                reserved if COMPUTED_FIELDS.contains(&reserved) => {
                    tracing::warn!(tool = %self.id, key = reserved, "ignoring override of computed field");
                }
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
