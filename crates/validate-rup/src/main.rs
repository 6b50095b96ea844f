//! validate-rup: check RUP protocol documents and agent outputs against the RUP schema

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rup_yaml_validation::EngineConfig;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

use commands::Session;
use render::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "validate-rup")]
#[command(version)]
#[command(about = "Validate RUP protocol documents and agent outputs", long_about = None)]
struct Cli {
    /// Path to the RUP schema
    #[arg(long, global = true, value_name = "FILE", default_value = "rup-schema.json")]
    schema: PathBuf,

    /// Show every violation instead of the first few
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Report format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(flatten)]
    limits: Limits,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Limits {
    /// Reject files larger than this many bytes
    #[arg(long, global = true, env = "RUP_MAX_FILE_BYTES", default_value_t = 5_242_880)]
    max_file_bytes: u64,

    /// Reject YAML whose aliases expand more than this many times
    #[arg(long, global = true, env = "RUP_MAX_YAML_ALIASES", default_value_t = 50)]
    max_yaml_aliases: usize,

    /// Violations shown per file unless --verbose is given
    #[arg(long, global = true, env = "RUP_ERROR_DISPLAY_CAP", default_value_t = 10)]
    error_display_cap: usize,

    /// Deepest document nesting that is validated
    #[arg(long, global = true, env = "RUP_MAX_DEPTH", default_value_t = 64)]
    max_depth: usize,
}

impl Limits {
    fn config(&self, verbose: bool) -> EngineConfig {
        EngineConfig::default()
            .with_max_file_bytes(self.max_file_bytes)
            .with_max_yaml_aliases(self.max_yaml_aliases)
            .with_max_depth(self.max_depth)
            .with_error_display_cap((!verbose).then_some(self.error_display_cap))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a protocol document against the root schema
    Protocol {
        /// Protocol file (YAML or JSON)
        file: PathBuf,
    },

    /// Validate an agent output against the definition for its type
    Output {
        /// Output file (JSON or YAML)
        file: PathBuf,

        /// One of: discovery, plan, execution, verification
        #[arg(value_name = "TYPE")]
        doc_type: String,
    },

    /// Validate every protocol and output file under a directory
    All {
        /// Directory to search
        directory: PathBuf,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "validate_rup=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Returns whether everything validated.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    let config = cli.limits.config(cli.verbose);
    let session = Session::open(&cli.schema, config, cli.format)?;

    match &cli.command {
        Commands::Protocol { file } => commands::protocol::execute(&session, file),
        Commands::Output { file, doc_type } => commands::output::execute(&session, file, doc_type),
        Commands::All { directory } => commands::all::execute(&session, directory),
    }
}
