//! CLI argument parsing with clap derive macros.

use clap::{Parser, Subcommand};
use kmremote_core::config::{
    ConnectionSettings, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT_MS,
};

/// Remote control for Keyboard Maestro macros.
///
/// Talks to the web server built into Keyboard Maestro on a Mac: checks the
/// connection, lists the published macros and triggers them.
#[derive(Debug, Parser)]
#[command(name = "kmremote", version)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Print a JSON report instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Log request details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Args)]
pub struct ConnectionArgs {
    /// Host name or IP address of the Mac
    #[arg(long, global = true, env = "KMREMOTE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port of the Keyboard Maestro web server
    #[arg(short, long, global = true, env = "KMREMOTE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u32,

    /// Timeout in milliseconds
    #[arg(short, long, global = true, env = "KMREMOTE_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_MS, allow_negative_numbers = true)]
    pub timeout: i64,

    /// Connect over HTTPS
    #[arg(long, global = true, env = "KMREMOTE_HTTPS")]
    pub https: bool,
}

impl ConnectionArgs {
    pub fn settings(&self) -> ConnectionSettings {
        ConnectionSettings::new(self.host.clone(), self.port, self.timeout, self.https)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that the Keyboard Maestro web server is reachable
    #[command(after_help = "\
Examples:
  kmremote probe                          # Use defaults or KMREMOTE_* vars
  kmremote --host 192.168.1.30 -p 4490 probe")]
    Probe,

    /// List the macros published by the server
    #[command(after_help = "\
Examples:
  kmremote list                           # Grouped by category
  kmremote list --category Dev            # Only one category
  kmremote list --json | jq '.data.macros[].id'")]
    List(ListArgs),

    /// Trigger a macro by id or by name
    #[command(after_help = "\
Examples:
  kmremote run 3C1D8A52-7F0E-4E44-9B8A-2A1F1E5D9C11
  kmremote run --name 'Build App'         # Looks the id up first")]
    Run(RunArgs),

    /// Show an end-to-end usage example
    Examples,
}

#[derive(Debug, clap::Args)]
pub struct ListArgs {
    /// Only show macros in this category (case-insensitive)
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
pub struct RunArgs {
    /// Macro id as shown by 'kmremote list'
    pub macro_id: Option<String>,

    /// Macro name; resolved to an id with one extra request
    #[arg(short, long)]
    pub name: Option<String>,
}

/// End-to-end example text for the `examples` command.
pub const EXAMPLES_TEXT: &str = r#"End-to-end example: trigger a macro from another machine

On the Mac, enable Keyboard Maestro's web server
(Preferences > Web Server) and note its port.

# 1. Point kmremote at the Mac
export KMREMOTE_HOST=192.168.1.30
export KMREMOTE_PORT=4490

# 2. Check the connection
kmremote probe

# 3. See what can be triggered
kmremote list

# 4. Trigger a macro by id, or by name
kmremote run 3C1D8A52-7F0E-4E44-9B8A-2A1F1E5D9C11
kmremote run --name "Build"

# 5. Script it with JSON output
kmremote list --json | jq -r '.data.macros[] | "\(.id) \(.name)"'
"#;
