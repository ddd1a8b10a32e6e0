use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod descriptor;
mod fetch;
mod metadata;
mod normalize;
mod output;
mod render;
mod templates;
mod workflow;

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = cli::RootArgs::parse();
    init_tracing(args.command.verbose());

    match args.command {
        cli::Command::Generate(args) => workflow::run_generate(args),
        cli::Command::Params(args) => workflow::run_params(args),
    }
}
