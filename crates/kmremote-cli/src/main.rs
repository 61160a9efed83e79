//! kmremote CLI entry point.

mod args;

use anyhow::Context;
use clap::Parser;
use kmremote_core::client::RemoteClient;
use kmremote_core::config::ConnectionConfig;
use kmremote_core::error::Outcome;
use kmremote_core::macros::{find_by_name, group_by_category, MacroDescriptor};
use kmremote_core::outcome::OperationReport;
use tracing::error;

use crate::args::{Cli, Commands, ListArgs, RunArgs};

/// Exit code for settings rejected before any request.
const EXIT_INVALID_SETTINGS: i32 = 2;

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable with --json
    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Examples needs neither settings nor the server
    let Some(command) = cli_to_command(&cli) else {
        println!("{}", crate::args::EXAMPLES_TEXT);
        return;
    };

    let config = match cli.connection.settings().validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: invalid connection settings: {}", e);
            std::process::exit(EXIT_INVALID_SETTINGS);
        }
    };

    match run_command(command, cli.json, &config) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

/// A command that talks to the server.
#[derive(Debug, Clone, Copy)]
enum ServerCommand<'a> {
    Probe,
    List(&'a ListArgs),
    Run(&'a RunArgs),
}

/// Map CLI args to a server command.
///
/// Returns None for commands that don't contact the server.
fn cli_to_command(cli: &Cli) -> Option<ServerCommand<'_>> {
    match &cli.command {
        Commands::Probe => Some(ServerCommand::Probe),
        Commands::List(args) => Some(ServerCommand::List(args)),
        Commands::Run(args) => Some(ServerCommand::Run(args)),
        Commands::Examples => None,
    }
}

/// Run one command against the server. Returns whether it succeeded.
fn run_command(
    command: ServerCommand<'_>,
    json: bool,
    config: &ConnectionConfig,
) -> anyhow::Result<bool> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        let client = RemoteClient::new().context("Failed to create HTTP client")?;

        match command {
            ServerCommand::Probe => {
                let outcome = client.probe(config).await;
                emit(json, &OperationReport::probe(&outcome), || {
                    println!("Connected to Keyboard Maestro Server at {}", config.authority());
                })
            }
            ServerCommand::List(args) => list(json, &client, config, args).await,
            ServerCommand::Run(args) => run(json, &client, config, args).await,
        }
    })
}

async fn list(
    json: bool,
    client: &RemoteClient,
    config: &ConnectionConfig,
    args: &ListArgs,
) -> anyhow::Result<bool> {
    let outcome = client
        .list_macros(config)
        .await
        .map(|macros| filter_category(macros, args.category.as_deref()));

    let report = OperationReport::macros(&outcome);
    emit(json, &report, || {
        if let Ok(macros) = &outcome {
            print_macros(macros);
        }
    })
}

async fn run(
    json: bool,
    client: &RemoteClient,
    config: &ConnectionConfig,
    args: &RunArgs,
) -> anyhow::Result<bool> {
    let macro_id = match (&args.macro_id, &args.name) {
        (Some(id), _) => id.clone(),
        (None, Some(name)) => match resolve_name(client, config, name).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                eprintln!(
                    "Error: no macro named '{}' (run 'kmremote list' to see available macros)",
                    name
                );
                return Ok(false);
            }
            Err(e) => {
                let report = OperationReport::macros(&Err(e));
                return emit(json, &report, || {});
            }
        },
        (None, None) => anyhow::bail!("Either a macro id or --name is required"),
    };

    let outcome = client.execute_macro(config, &macro_id).await;
    emit(json, &OperationReport::executed(&macro_id, &outcome), || {
        println!("Executed macro {}", macro_id);
    })
}

async fn resolve_name(
    client: &RemoteClient,
    config: &ConnectionConfig,
    name: &str,
) -> Outcome<Option<String>> {
    let macros = client.list_macros(config).await?;
    Ok(find_by_name(&macros, name)
        .filter(|m| m.is_executable())
        .map(|m| m.id.clone()))
}

/// Print a report as JSON, or run the text renderer on success and print the
/// error on failure.
fn emit(json: bool, report: &OperationReport, on_success: impl FnOnce()) -> anyhow::Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else if report.success {
        on_success();
    } else if let Some(err) = &report.error {
        eprintln!("Error: {}", err);
    }
    Ok(report.success)
}

fn filter_category(macros: Vec<MacroDescriptor>, category: Option<&str>) -> Vec<MacroDescriptor> {
    match category {
        Some(wanted) => macros
            .into_iter()
            .filter(|m| m.display_category().eq_ignore_ascii_case(wanted.trim()))
            .collect(),
        None => macros,
    }
}

fn print_macros(macros: &[MacroDescriptor]) {
    if macros.is_empty() {
        println!("No macros found");
        return;
    }
    for (category, members) in group_by_category(macros) {
        println!("{}", category);
        for m in members {
            println!("  {}  {}", m.id, m.display_name());
        }
    }
}
