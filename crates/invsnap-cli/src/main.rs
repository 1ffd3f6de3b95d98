//! invsnap CLI
//!
//! Rebuilds the derived inventory data directory from raw CSV exports.
//! Running `invsnap` with no subcommand performs a full rebuild.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use invsnap_engine::{ConfigOverrides, LogFormat, RebuildConfig};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "invsnap")]
#[command(about = "Inventory snapshot history and change reports", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Config file (default: ./invsnap.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory of raw .csv exports
    #[arg(long, global = true, env = "INVSNAP_INPUT_DIR", value_name = "DIR")]
    input: Option<PathBuf>,

    /// Directory the derived artifacts are published to
    #[arg(long, global = true, env = "INVSNAP_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Log output format: pretty or json
    #[arg(long, global = true, env = "INVSNAP_LOG_FORMAT", value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

impl GlobalArgs {
    fn load_config(&self) -> anyhow::Result<RebuildConfig> {
        let overrides = ConfigOverrides {
            input_dir: self.input.clone(),
            data_dir: self.data_dir.clone(),
            log_format: self.log_format,
        };
        Ok(RebuildConfig::load(self.config.as_deref(), overrides)?)
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Regenerate snapshots, reports and the index (the default)
    Rebuild,
    /// Print a summary of the current report
    Summary,
}

fn main() {
    let cli = Cli::parse();

    let result = cli.global.load_config().and_then(|config| {
        invsnap_core::logging_facility::init(config.log_format.profile());
        match cli.command.unwrap_or(Commands::Rebuild) {
            Commands::Rebuild => commands::rebuild::execute(&config),
            Commands::Summary => commands::summary::execute(&config),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
