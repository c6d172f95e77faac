use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use qb_config::QbConfig;

mod cmd_compile;
mod cmd_run;
mod tracing_init;

#[derive(Parser)]
#[command(name = "qbc", about = "Query join compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a query file and print the result
    Compile {
        /// Query file
        file: PathBuf,
        /// Print the compiled output as JSON
        #[arg(long)]
        json: bool,
        /// Path to qb.toml config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Compile a query file and run any deferred joins against `[vars]`
    Run {
        /// Query file
        file: PathBuf,
        /// Path to qb.toml config file
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { file, json, config } => {
            let (qb_config, base_dir) = match config {
                Some(path) => load_config(&path)?,
                None => (QbConfig::default(), std::env::current_dir()?),
            };
            let _guard = tracing_init::init_tracing(&qb_config.logging, &base_dir)?;
            cmd_compile::run(&file, json, &qb_config)
        }
        Commands::Run { file, config } => {
            let (qb_config, base_dir) = load_config(&config)?;
            let _guard = tracing_init::init_tracing(&qb_config.logging, &base_dir)?;
            cmd_run::run(&file, &qb_config)
        }
    }
}

/// Load `qb.toml` and return it with the directory relative paths resolve
/// against.
fn load_config(path: &Path) -> Result<(QbConfig, PathBuf)> {
    let config_path = path
        .canonicalize()
        .with_context(|| format!("config path '{}'", path.display()))?;
    let config = QbConfig::load(&config_path)?;
    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("config path '{}' has no parent", config_path.display()))?;
    Ok((config, base_dir))
}

/// Read, parse and compile a query file.
pub(crate) fn compile_file(file: &Path) -> Result<qb_lang::program::JoinOutput> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let doc = qb_lang::parse_query(&source)
        .with_context(|| format!("in {}", file.display()))?;
    let output = qb_lang::compile_query(&doc, &file.display().to_string())?;
    tracing::info!(
        domain = "build",
        file = %file.display(),
        joins = doc.joins.len(),
        deferred = output.as_deferred().is_some(),
        "query compiled"
    );
    Ok(output)
}
