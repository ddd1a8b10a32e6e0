//! Metadata service access.
//!
//! The service exposes, per tool, a description document, a parameter-name
//! list and one details document per parameter. Every request is attempted
//! once; any failure aborts the tool being generated.
use crate::metadata::{parse_document, Parameter};
use crate::normalize::collapse_whitespace;
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeSet;
use std::time::Instant;

/// Text-over-URL boundary to the metadata service.
pub trait MetadataFetcher: Sync {
    fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataFetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        let start = Instant::now();
        let mut response = self
            .agent
            .get(url)
            .call()
            .with_context(|| format!("GET {url}"))?;
        let text = response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("read response body from {url}"))?;
        tracing::info!(
            url,
            elapsed_ms = start.elapsed().as_millis(),
            response_bytes = text.len(),
            "metadata fetch complete"
        );
        Ok(text)
    }
}

pub fn parameters_url(tool_url: &str) -> String {
    format!("{tool_url}/parameters")
}

pub fn parameter_details_url(tool_url: &str, name: &str) -> String {
    format!("{tool_url}/parameterdetails/{name}")
}

/// A tool's description and its parameters in service order.
#[derive(Debug, Clone)]
pub struct ToolMetadata {
    pub description: String,
    pub parameters: Vec<Parameter>,
}

/// Fetch a tool's description and every parameter's details.
///
/// Details are fetched with up to `jobs` workers; the result keeps the order
/// of the service's parameter list.
pub fn fetch_tool(
    fetcher: &dyn MetadataFetcher,
    tool_url: &str,
    jobs: usize,
) -> Result<ToolMetadata> {
    let description = fetch_description(fetcher, tool_url)?;
    let names = fetch_parameter_names(fetcher, tool_url)?;
    let parameters = fetch_parameters(fetcher, tool_url, &names, jobs)?;
    Ok(ToolMetadata {
        description,
        parameters,
    })
}

pub fn fetch_description(fetcher: &dyn MetadataFetcher, tool_url: &str) -> Result<String> {
    let text = fetcher.fetch_text(tool_url)?;
    let document =
        parse_document(&text).with_context(|| format!("parse tool description from {tool_url}"))?;
    Ok(collapse_whitespace(document.root_text().unwrap_or_default()))
}

/// Parameter names in service order. A repeated name keeps its first place.
pub fn fetch_parameter_names(fetcher: &dyn MetadataFetcher, tool_url: &str) -> Result<Vec<String>> {
    let url = parameters_url(tool_url);
    let text = fetcher.fetch_text(&url)?;
    let document =
        parse_document(&text).with_context(|| format!("parse parameter list from {url}"))?;
    let mut seen = BTreeSet::new();
    let mut names = Vec::new();
    for name in document.child_texts() {
        if seen.insert(name.clone()) {
            names.push(name);
        } else {
            tracing::debug!(parameter = %name, "duplicate parameter name skipped");
        }
    }
    Ok(names)
}

fn fetch_parameter(
    fetcher: &dyn MetadataFetcher,
    tool_url: &str,
    name: &str,
) -> Result<Parameter> {
    let text = fetcher.fetch_text(&parameter_details_url(tool_url, name))?;
    let parameter = Parameter::from_details(name, &text)?;
    tracing::debug!(
        parameter = name,
        has_defaults = !parameter.defaults.is_empty(),
        "parameter details resolved"
    );
    Ok(parameter)
}

fn fetch_parameters(
    fetcher: &dyn MetadataFetcher,
    tool_url: &str,
    names: &[String],
    jobs: usize,
) -> Result<Vec<Parameter>> {
    let jobs = jobs.max(1);
    if jobs == 1 || names.len() <= 1 {
        return names
            .iter()
            .map(|name| fetch_parameter(fetcher, tool_url, name))
            .collect();
    }

    let chunk_size = names.len().div_ceil(jobs);
    let chunks: Vec<Result<Vec<Parameter>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = names
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|name| fetch_parameter(fetcher, tool_url, name))
                        .collect::<Result<Vec<_>>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| anyhow!("parameter fetch worker panicked"))?
            })
            .collect()
    });

    let mut parameters = Vec::with_capacity(names.len());
    for chunk in chunks {
        parameters.extend(chunk?);
    }
    Ok(parameters)
}
