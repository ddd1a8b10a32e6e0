use crate::cli::{GenerateArgs, ParamsArgs};
use crate::config::load_config;
use crate::descriptor::{assign_positions, base_position, is_optional_input, ToolDescriptor};
use crate::fetch::{fetch_tool, HttpFetcher, MetadataFetcher};
use crate::metadata::{DefaultValueBucket, Parameter};
use crate::output::OutputDir;
use crate::render::DescriptorTemplate;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Client languages descriptors can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientLanguage {
    Python,
    Perl,
}

impl ClientLanguage {
    /// Parse a language name, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "python" => Ok(ClientLanguage::Python),
            "perl" => Ok(ClientLanguage::Perl),
            other => Err(anyhow!("{other} not yet implemented")),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClientLanguage::Python => "python",
            ClientLanguage::Perl => "perl",
        }
    }

    /// Script extension of the client the descriptor invokes.
    pub fn extension(self) -> &'static str {
        match self {
            ClientLanguage::Python => "py",
            ClientLanguage::Perl => "pl",
        }
    }
}

/// One tool to generate for one language.
pub struct ToolRequest<'a> {
    pub id: &'a str,
    pub overrides: &'a BTreeMap<String, String>,
    pub lang: ClientLanguage,
    pub base_url: &'a str,
    pub docker: bool,
    pub jobs: usize,
}

impl ToolRequest<'_> {
    pub fn tool_url(&self) -> String {
        format!("{}{}", self.base_url, self.id)
    }
}

pub fn run_generate(args: GenerateArgs) -> Result<()> {
    let fetcher = HttpFetcher::new();
    generate_all(&args, &fetcher)?;
    Ok(())
}

/// Generate every selected tool for every requested language.
///
/// Languages are validated before anything is fetched. A failing tool aborts
/// the run; descriptors already written are kept.
pub fn generate_all(args: &GenerateArgs, fetcher: &dyn MetadataFetcher) -> Result<Vec<PathBuf>> {
    let langs = args
        .langs
        .iter()
        .map(|raw| ClientLanguage::parse(raw))
        .collect::<Result<Vec<_>>>()?;
    let config = load_config(&args.config)?;
    let template = DescriptorTemplate::load(args.template.as_deref())?;
    let out = OutputDir::new(args.out_dir.clone());
    let tools = config.selected_tools(&args.client);
    if tools.is_empty() {
        tracing::warn!(config = %args.config.display(), "no tools selected");
    }

    let mut written = Vec::new();
    for lang in langs {
        for (id, overrides) in &tools {
            let request = ToolRequest {
                id: *id,
                overrides,
                lang,
                base_url: &args.baseurl,
                docker: args.docker,
                jobs: args.jobs,
            };
            let path = generate_tool(fetcher, &template, &out, &request)
                .with_context(|| format!("generate {id} for {}", lang.name()))?;
            println!("Generated CWL for {}", request.tool_url());
            written.push(path);
        }
    }
    tracing::info!(
        out_dir = %out.root().display(),
        descriptors = written.len(),
        "generation complete"
    );
    Ok(written)
}

/// Fetch, synthesize, render and write one descriptor.
pub fn generate_tool(
    fetcher: &dyn MetadataFetcher,
    template: &DescriptorTemplate,
    out: &OutputDir,
    request: &ToolRequest<'_>,
) -> Result<PathBuf> {
    let url = request.tool_url();
    let metadata = fetch_tool(fetcher, &url, request.jobs)?;
    let mut descriptor = ToolDescriptor::new(
        request.id,
        url,
        request.lang.name(),
        request.lang.extension(),
    );
    descriptor.description = metadata.description;
    descriptor.docker = request.docker;
    descriptor.apply_overrides(request.overrides);
    descriptor.set_inputs(&metadata.parameters);
    let contents = template.render(&descriptor)?;
    out.write(&descriptor.filename, &contents)
}

#[derive(Debug, Serialize)]
struct ParameterReport<'a> {
    name: &'a str,
    fields: &'a BTreeMap<String, String>,
    defaults: &'a DefaultValueBucket,
    optional_input: bool,
    position: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ToolReport<'a> {
    tool: &'a str,
    url: &'a str,
    description: &'a str,
    base_position: u32,
    parameters: Vec<ParameterReport<'a>>,
}

pub fn run_params(args: ParamsArgs) -> Result<()> {
    let fetcher = HttpFetcher::new();
    let text = params_report(&args, &fetcher)?;
    println!("{text}");
    Ok(())
}

/// Resolved parameters of one tool as pretty JSON.
pub fn params_report(args: &ParamsArgs, fetcher: &dyn MetadataFetcher) -> Result<String> {
    let url = format!("{}{}", args.baseurl, args.tool);
    let metadata = fetch_tool(fetcher, &url, args.jobs)?;
    let base = base_position(&args.tool);
    let positions: BTreeMap<&str, u32> = assign_positions(&metadata.parameters, base)
        .into_iter()
        .map(|input| (input.parameter.name.as_str(), input.position))
        .collect();
    let report = ToolReport {
        tool: &args.tool,
        url: &url,
        description: &metadata.description,
        base_position: base,
        parameters: metadata
            .parameters
            .iter()
            .map(|parameter: &Parameter| ParameterReport {
                name: &parameter.name,
                fields: &parameter.fields,
                defaults: &parameter.defaults,
                optional_input: is_optional_input(&parameter.name),
                position: positions.get(parameter.name.as_str()).copied(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report).context("serialize parameter report")
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
