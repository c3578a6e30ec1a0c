pub mod clean;
pub mod cli;
pub mod error;
pub mod io_utils;
pub mod pipeline;
pub mod record;
pub mod rules;
pub mod stages;
pub mod store;
pub mod summary;
pub mod table;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands},
    rules::CleaningRules,
};

pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use record::{LayoffRecord, RecordDate};
pub use store::{CsvStore, MemoryStore, RecordStore};
pub use summary::CleanSummary;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("layoffs_cleaner", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Clean(args) => clean::execute(&args),
        Commands::Rules(args) => handle_rules(&args),
    }
}

fn handle_rules(args: &cli::RulesArgs) -> Result<()> {
    let rules = CleaningRules::default();
    match &args.output {
        Some(path) => {
            rules
                .save(path)
                .with_context(|| format!("Writing rules to {path:?}"))?;
            info!("Default cleaning rules written to {:?}", path);
        }
        None => {
            let yaml = rules.to_yaml()?;
            std::io::stdout()
                .write_all(yaml.as_bytes())
                .context("Writing rules to stdout")?;
        }
    }
    Ok(())
}
