//! Clap derive structures for the `tago` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tago -- command-line host for a Tago lighting bridge
#[derive(Debug, Parser)]
#[command(
    name = "tago",
    version,
    about = "Drive a Tago lighting bridge from the command line",
    long_about = "Listens for keypad presses on a Tago lighting bridge and sends\n\
        ramp commands to its dimmer channels.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Bridge hostname or IP (overrides the config file)
    #[arg(long, short = 'H', env = "TAGO_HOST", global = true)]
    pub host: Option<String>,

    /// Config file to use instead of the platform default
    #[arg(long, env = "TAGO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TAGO_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the integration: print keypress events until interrupted
    Run,

    /// List the bridge's dimmer channels
    #[command(alias = "dev", alias = "d")]
    Devices,

    /// Control a single dimmer channel
    #[command(alias = "l")]
    Light(LightArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Light ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LightArgs {
    #[command(subcommand)]
    pub command: LightCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightCommand {
    /// Turn a light on, restoring its last level unless one is given
    On {
        /// Light unique ID (see `tago devices`)
        unique_id: String,

        /// Brightness 1-255
        #[arg(long, short = 'b', value_parser = clap::value_parser!(u8).range(1..))]
        brightness: Option<u8>,

        /// Transition in milliseconds
        #[arg(long, short = 't')]
        transition: Option<u64>,
    },

    /// Turn a light off
    Off {
        /// Light unique ID (see `tago devices`)
        unique_id: String,

        /// Transition in milliseconds
        #[arg(long, short = 't')]
        transition: Option<u64>,
    },

    /// Ramp a light to an explicit level (0 turns it off)
    Set {
        /// Light unique ID (see `tago devices`)
        unique_id: String,

        /// Brightness 0-255
        level: u8,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write an initial config file for the bridge given by --host
    Init {
        /// WebSocket event port
        #[arg(long)]
        event_port: Option<u16>,

        /// HTTP control port
        #[arg(long)]
        control_port: Option<u16>,

        /// Overwrite an existing config file
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Display the resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
