//! PaleoCO2 spreadsheet CLI
//!
//! ```bash
//! paleosheet verify config.json          # Check every spreadsheet in root_folder
//! paleosheet generate-json config.json   # Flatten spreadsheets into output_file
//! ```
//!
//! Diagnostics go to the configured log file, verdicts to stdout, and
//! tracing output to stderr (`RUST_LOG` controls its level).

use clap::{Parser, Subcommand};
use paleosheet::{generate_json, Configuration, Console, DiagnosticLog, Verifier};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "paleosheet")]
#[command(about = "Verify PaleoCO2 spreadsheets and flatten them to JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every spreadsheet in the configured root folder
    Verify {
        /// JSON configuration file
        config: PathBuf,
    },

    /// Flatten the spreadsheets in the root folder into one JSON file
    GenerateJson {
        /// JSON configuration file
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Verify { config } => cmd_verify(&config).await,
        Commands::GenerateJson { config } => cmd_generate_json(&config),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &Path) -> Result<Configuration, Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("Configuration file not found: {}", path.display()).into());
    }
    Ok(Configuration::load(path)?)
}

async fn cmd_verify(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let mut console = Console::new(config.palette()?);
    let mut log = DiagnosticLog::create(config.log_file().as_deref())?;
    let mut verifier = Verifier::from_config(config);

    console.print_header();
    let summary = verifier
        .run(&mut log, |report| console.print_file(&report.file_name, report.verdict()))
        .await?;
    console.print_summary(&summary);

    Ok(())
}

fn cmd_generate_json(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;

    let total = generate_json(&config, |file, count| {
        println!("Added {} datapoints from {}", count, file);
    })?;
    eprintln!("✅ Wrote {} datapoints", total);

    Ok(())
}
