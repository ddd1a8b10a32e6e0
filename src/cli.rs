//! CLI argument parsing for descriptor generation.
use crate::config::{ALL_TOOLS, DEFAULT_CONFIG_PATH};
use crate::output::DEFAULT_OUTPUT_DIR;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Job dispatcher REST root; tool ids are appended directly.
pub const DEFAULT_BASE_URL: &str = "https://www.ebi.ac.uk/Tools/services/rest/";

#[derive(Parser, Debug)]
#[command(
    name = "cwlgen",
    version,
    about = "Generate CWL descriptors for EBI web-service clients",
    after_help = "Examples:\n  cwlgen generate python\n  cwlgen generate python,perl --client ncbiblast,clustalo --docker\n  cwlgen params emboss_needle",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Generate(GenerateArgs),
    Params(ParamsArgs),
}

/// Generate command inputs.
#[derive(Parser, Debug)]
#[command(about = "Generate CWL descriptors for Python or Perl clients")]
pub struct GenerateArgs {
    /// Client languages, comma separated (python, perl)
    #[arg(value_name = "LANGS", value_delimiter = ',', required = true)]
    pub langs: Vec<String>,

    /// Tools to generate, comma separated, or "all"
    #[arg(long, value_name = "IDS", value_delimiter = ',', default_value = ALL_TOOLS)]
    pub client: Vec<String>,

    /// Add a DockerRequirement hint to each descriptor
    #[arg(long)]
    pub docker: bool,

    /// Metadata service base URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub baseurl: String,

    /// Clients config with per-tool overrides
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Jinja template replacing the built-in descriptor template
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Directory receiving generated descriptors
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub out_dir: PathBuf,

    /// Parameter details fetched concurrently per tool
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub jobs: usize,

    /// Log each metadata request
    #[arg(long)]
    pub verbose: bool,
}

/// Params command inputs.
#[derive(Parser, Debug)]
#[command(about = "Print a tool's resolved parameters as JSON")]
pub struct ParamsArgs {
    /// Tool id, e.g. ncbiblast
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Metadata service base URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub baseurl: String,

    /// Parameter details fetched concurrently
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub jobs: usize,

    /// Log each metadata request
    #[arg(long)]
    pub verbose: bool,
}

impl Command {
    pub fn verbose(&self) -> bool {
        match self {
            Command::Generate(args) => args.verbose,
            Command::Params(args) => args.verbose,
        }
    }
}
