//! Clap derive structures for the `stockscan` CLI.
//!
//! Also compiled by `build.rs` for man pages, so it may only depend on
//! clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// stockscan -- barcode-driven stock movements and inventory counts
#[derive(Debug, Parser)]
#[command(
    name = "stockscan",
    version,
    about = "Scan stock entries, exits and inventory counts against a stock server",
    long_about = "Operator tooling for a small retail inventory server.\n\n\
        Scanned barcodes are picked up from the server's barcode slot (or typed\n\
        by hand), counted per product, exported to a spreadsheet and pushed back\n\
        to the inventory and transaction log.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "STOCKSCAN_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Inventory server URL (overrides profile)
    #[arg(long, short = 'u', env = "STOCKSCAN_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token sent to the server
    #[arg(long, env = "STOCKSCAN_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Directory spreadsheets are written to (overrides profile)
    #[arg(long, env = "STOCKSCAN_EXPORT_DIR", global = true)]
    pub export_dir: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STOCKSCAN_OUTPUT",
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

    /// Write logs to this file instead of stderr
    #[arg(long, env = "STOCKSCAN_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "STOCKSCAN_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// Plain text, one value per line (scripting)
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Count stock entries and exits, then export and submit them
    #[command(alias = "s")]
    Scan(ScanArgs),

    /// Count the stock on hand and compare it with the inventory
    #[command(alias = "v")]
    Validate(SessionArgs),

    /// List or edit inventory products
    #[command(alias = "inv", alias = "i")]
    Inventory(InventoryArgs),

    /// Show the transaction log, newest first
    #[command(alias = "log")]
    History(HistoryArgs),

    /// Movement totals and most active products
    Stats(StatsArgs),

    /// Inspect or acknowledge the server's barcode slot
    Barcode(BarcodeArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Scan sessions ────────────────────────────────────────────────────

/// Options shared by the interactive counting sessions.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Do not poll the server barcode slot; typed input only
    #[arg(long)]
    pub no_poll: bool,

    /// Barcode slot polling period in milliseconds (overrides profile)
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Quiet period before typed input is submitted, in milliseconds
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Read one identifier or `:command` per line even on a terminal
    #[arg(long)]
    pub line_mode: bool,
}

#[derive(Debug, Args)]
#[command(after_help = "\
Keys: type an identifier (auto-submitted after a pause), Enter submits now,\n\
Tab toggles entries/exits, Ctrl-E exports, Ctrl-L shows the counts,\n\
Ctrl-R reloads the inventory, Esc or Ctrl-C quits.\n\n\
Line mode (piped stdin or --line-mode): one identifier per line, or\n\
:toggle, :export, :show, :reload, :quit")]
pub struct ScanArgs {
    /// Bucket counted into first
    #[arg(long, short = 'm', default_value = "entries", value_enum)]
    pub mode: ScanMode,

    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScanMode {
    /// Goods coming in
    Entries,
    /// Goods going out
    Exits,
}

// ── Inventory ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InventoryArgs {
    #[command(subcommand)]
    pub command: InventoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum InventoryCommand {
    /// List products with their stock
    #[command(alias = "ls")]
    List {
        /// Only products whose ID or name contains this text
        #[arg(long, short = 'f')]
        filter: Option<String>,

        /// Order rows by this column (inventory order when omitted)
        #[arg(long, short = 's', value_enum)]
        sort: Option<InventorySort>,

        /// Reverse the order
        #[arg(long, short = 'r')]
        reverse: bool,
    },

    /// Add a product or overwrite an existing one
    Set {
        /// Product identifier (the barcode value)
        id: String,

        /// Display name
        #[arg(long, short = 'n')]
        name: String,

        /// Stock on hand
        #[arg(long = "quantity", short = 'Q')]
        quantity: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InventorySort {
    Id,
    Name,
    Stock,
    /// Transactions recorded today
    Daily,
}

// ── History & stats ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Only this transaction type
    #[arg(long = "type", short = 't', value_enum)]
    pub kind: Option<TransactionKind>,

    /// Show at most this many transactions
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TransactionKind {
    /// Stock entries
    Entree,
    /// Stock exits
    Sortie,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Only this product
    #[arg(long)]
    pub product: Option<String>,

    /// First day included (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Last day included (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,
}

// ── Barcode slot ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BarcodeArgs {
    #[command(subcommand)]
    pub command: BarcodeCommand,
}

#[derive(Debug, Subcommand)]
pub enum BarcodeCommand {
    /// Print the code waiting in the slot, if any
    Pending,

    /// Clear the slot after consuming CODE
    #[command(alias = "nullify")]
    Ack {
        /// The code being acknowledged
        code: String,
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
    /// Interactive configuration wizard
    Init,

    /// Show the effective configuration, tokens masked
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a bearer token for the active profile (or `--profile`) in the
    /// system keyring
    SetToken,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
