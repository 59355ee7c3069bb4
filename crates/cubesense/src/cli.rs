//! Clap derive structures for the `cubesense` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cubesense -- read CubeSensors environmental data
#[derive(Debug, Parser)]
#[command(
    name = "cubesense",
    version,
    about = "Read CubeSensors environmental data from the command line",
    long_about = "Lists CubeSensors devices with their latest readings.\n\n\
        Readings are fetched from the CubeSensors cloud and cached for a\n\
        short time-to-live, so repeated polls stay cheap.",
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
    /// API token (overrides keyring and config file)
    #[arg(long, env = "CUBESENSE_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// API root URL
    #[arg(long, env = "CUBESENSE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Seconds readings stay cached (0 = never expire)
    #[arg(long, env = "CUBESENSE_TTL", global = true)]
    pub ttl: Option<u64>,

    /// Per-request timeout in seconds (0 = none)
    #[arg(long, env = "CUBESENSE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CUBESENSE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

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
    /// Plain text, one device id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every device with its latest readings
    #[command(alias = "dev", alias = "ls")]
    Devices(DevicesArgs),

    /// Show one device as an accessory with all of its services
    Show(ShowArgs),

    /// Poll readings on an interval until interrupted
    Watch(WatchArgs),

    /// Force a refresh from the cloud, ignoring the cache
    Refresh,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Only list full environmental cubes
    #[arg(long)]
    pub cubes: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Device id
    pub id: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between polls
    #[arg(long, short = 'i', default_value = "30")]
    pub interval: u64,

    /// Stop after this many polls
    #[arg(long, short = 'n')]
    pub count: Option<u32>,

    /// Refresh in the background every ttl instead of on demand
    #[arg(long)]
    pub background: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the resolved configuration (token redacted)
    Show,

    /// Prompt for an API token and store it
    SetToken {
        /// Write the token to the config file instead of the system keyring
        #[arg(long)]
        plaintext: bool,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
