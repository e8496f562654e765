// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use rrstate::{
    api::ApiClient,
    config::RecordsFile,
    constants::{DEFAULT_CONFIG_PATH, DEFAULT_STATE_PATH},
    engine::Engine,
    lifecycle::RecordLifecycle,
    metrics::gather_metrics,
    record_key::{decode, RecordIdentifier, RecordKey},
};
use std::path::PathBuf;
use tracing::{debug, info};

/// Declarative DNS record sets, reconciled against the provider API
#[derive(Parser)]
#[command(name = "rrstate", version, about, long_about = None)]
struct Cli {
    /// Records file (YAML)
    #[arg(long, global = true, env = "RRSTATE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// State file (JSON)
    #[arg(long, global = true, env = "RRSTATE_STATE", default_value = DEFAULT_STATE_PATH)]
    state: PathBuf,

    /// Log output format
    #[arg(
        long,
        global = true,
        value_enum,
        env = "RUST_LOG_FORMAT",
        default_value_t = LogFormat::Text
    )]
    log_format: LogFormat,

    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Show what apply would change, without writing state
    Plan,
    /// Refresh state, then create, update and delete record sets to match the records file
    Apply,
    /// Realign state with the provider without changing any record set
    Refresh,
    /// Delete every record set in state
    Destroy,
    /// Bring an existing record set under management
    Import {
        /// Resource name to record it under
        name: String,
        /// Record identifier, `owner:zone:type`
        id: String,
    },
    /// Encode or decode record identifiers
    Id {
        #[command(subcommand)]
        command: IdCommand,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum IdCommand {
    /// Build the identifier of a record set
    Encode {
        /// Owner name
        #[arg(long)]
        owner: String,
        /// Zone name
        #[arg(long)]
        zone: String,
        /// Record type
        #[arg(long = "type")]
        record_type: String,
    },
    /// Split an identifier into owner, zone and type
    Decode {
        /// Record identifier
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("rrstate-worker")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

/// Initialize logging.
///
/// Format: timestamp file:line LEVEL message, written to stderr so command output
/// on stdout stays clean. Respects `RUST_LOG`, defaulting to `info`.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    debug!("Logging initialized with file and line number tracking");
}

async fn async_main(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "rrstate", &mut std::io::stdout());
            return Ok(());
        }
        Command::Id { command } => {
            run_id_command(command)?;
            return Ok(());
        }
        _ => {}
    }

    let records = RecordsFile::from_file(&cli.config)?;
    let mut provider = records.provider.clone();
    provider.apply_env_overrides();
    let client = ApiClient::new(&provider).context("Failed to configure provider API client")?;
    let engine = Engine::new(RecordLifecycle::new(client), &cli.state);
    let mut state = engine.load_state()?;

    info!(
        config = %cli.config.display(),
        state = %cli.state.display(),
        declared = records.records.len(),
        managed = state.resources.len(),
        "Loaded configuration and state"
    );

    match &cli.command {
        Command::Plan => {
            println!("{}", engine.preview(&records.records, &state).await?);
        }
        Command::Apply => {
            let summary = engine.apply(&records.records, &mut state).await?;
            println!("Apply complete: {summary}");
        }
        Command::Refresh => {
            let summary = engine.refresh(&mut state).await?;
            println!(
                "Refresh complete: {} checked, {} drifted, {} removed",
                summary.checked, summary.drifted, summary.removed
            );
        }
        Command::Destroy => {
            let summary = engine.destroy(&mut state).await?;
            println!("Destroy complete: {} deleted", summary.deleted);
        }
        Command::Import { name, id } => {
            let record = engine
                .import(name, &RecordIdentifier::from_raw(id.as_str()), &mut state)
                .await?;
            println!("{}", serde_yaml::to_string(&record)?);
        }
        Command::Id { .. } | Command::Completions { .. } => {}
    }

    if cli.print_metrics {
        print!("{}", gather_metrics()?);
    }

    Ok(())
}

fn run_id_command(command: &IdCommand) -> Result<()> {
    match command {
        IdCommand::Encode {
            owner,
            zone,
            record_type,
        } => {
            println!(
                "{}",
                RecordKey::new(owner.as_str(), zone.as_str(), record_type.as_str()).identifier()
            );
        }
        IdCommand::Decode { id } => {
            let key = decode(id)?;
            println!("owner: {}", key.owner);
            println!("zone:  {}", key.zone);
            println!("type:  {}", key.record_type);
        }
    }
    Ok(())
}
