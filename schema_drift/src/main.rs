use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use schema_drift::utils::logging::init_logging;
use schema_drift::{config, DatabaseConnection, ModelRegistry, SchemaAnalyzer, SchemaDriftClient};
use schema_drift::{DatabaseSchema, Difference, SchemaProvider};

/// Compare the schema declared by model definitions with a live database
#[derive(Parser, Debug)]
#[command(name = "schema_drift", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "schema_drift.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every difference between the database and the models
    Diff {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Exit with status 2 when differences exist
        #[arg(long)]
        check: bool,
    },
    /// Print one schema snapshot as JSON
    Dump {
        #[arg(long, value_enum)]
        source: Source,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Source {
    Database,
    Models,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli.config.to_string_lossy();
    let config = config::load_from_file(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Command::Diff { format, check } => {
            let client = SchemaDriftClient::new(config).await?;
            let (current, target) = client.load_schemas().await?;
            let differences = client.compare(&current, &target);

            print_differences(&differences, format)?;

            if check && !differences.is_empty() {
                return Ok(ExitCode::from(2));
            }
        }
        Command::Dump { source } => {
            let schema = match source {
                Source::Models => ModelRegistry::from_config(&config)?.produce_schema().await?,
                Source::Database => {
                    let connection = DatabaseConnection::connect(&config.database).await?;
                    SchemaAnalyzer::new(connection).produce_schema().await?
                }
            };

            print_schema(&schema)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_differences(differences: &[Difference<'_>], format: Format) -> anyhow::Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(differences)?),
        Format::Text if differences.is_empty() => println!("No differences found"),
        Format::Text => {
            for difference in differences {
                println!("{}", difference);
            }
        }
    }
    Ok(())
}

fn print_schema(schema: &DatabaseSchema) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(schema)?);
    Ok(())
}
