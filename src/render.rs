//! Descriptor rendering through a Jinja template.
//!
//! The built-in template ships with the binary; a user template may replace it
//! and receives the same `tool` context.
use crate::descriptor::ToolDescriptor;
use crate::templates::{CLIENT_CWL_TEMPLATE, CLIENT_CWL_TEMPLATE_NAME};
use anyhow::{Context, Result};
use minijinja::{context, AutoEscape, Environment};
use std::fs;
use std::path::Path;

/// Template source used to render descriptors.
#[derive(Debug, Clone)]
pub struct DescriptorTemplate {
    name: String,
    source: String,
}

impl DescriptorTemplate {
    pub fn builtin() -> Self {
        Self {
            name: CLIENT_CWL_TEMPLATE_NAME.to_string(),
            source: CLIENT_CWL_TEMPLATE.to_string(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("read template {}", path.display()))?;
        Ok(Self {
            name: path.display().to_string(),
            source,
        })
    }

    /// Load `path` when given, otherwise the built-in template.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::builtin()),
        }
    }

    /// Render one descriptor; the result always ends with a newline.
    pub fn render(&self, tool: &ToolDescriptor) -> Result<String> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.add_template(&self.name, &self.source)
            .with_context(|| format!("compile template {}", self.name))?;
        let template = env
            .get_template(&self.name)
            .with_context(|| format!("load template {}", self.name))?;
        let mut rendered = template
            .render(context! { tool => tool })
            .with_context(|| format!("render {} for {}", self.name, tool.id))?;
        if !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        Ok(rendered)
    }
}
