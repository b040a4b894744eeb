//! CLI argument definitions using clap derive

use crate::store::Region;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tempcache - owner-scoped temporary cache
///
/// Stores dashboard filter state and explore form data under
/// per-session, per-tab keys that only their owner may change.
#[derive(Parser, Debug)]
#[command(name = "tempcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TEMPCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a value and print its key
    Create(CreateArgs),

    /// Print the value stored under a key
    Get(GetArgs),

    /// Overwrite a value you own and print the key to use next
    Update(UpdateArgs),

    /// Delete a value you own
    Delete(DeleteArgs),

    /// Print freshly minted random keys
    Keygen(KeygenArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Who is acting and where the value lives
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Resource id (dashboard, chart or dataset)
    #[arg(short, long)]
    pub resource: String,

    /// Acting user
    #[arg(short, long, env = "TEMPCACHE_USER")]
    pub user: String,

    /// Session id of the acting user
    #[arg(short, long, env = "TEMPCACHE_SESSION", default_value = "cli")]
    pub session: String,

    /// Browser tab id (0 = not tab scoped)
    #[arg(short, long)]
    pub tab: Option<u32>,

    /// Cache region
    #[arg(long, value_enum, default_value = "filter-state")]
    pub region: RegionArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the create command
#[derive(Parser, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Value to store
    #[arg(long)]
    pub value: String,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Key returned by create or update
    #[arg(short, long)]
    pub key: Option<String>,
}

/// Arguments for the update command
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Key returned by create or update
    #[arg(short, long)]
    pub key: Option<String>,

    /// New value
    #[arg(long)]
    pub value: String,
}

/// Arguments for the delete command
#[derive(Parser, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Key returned by create or update
    #[arg(short, long)]
    pub key: Option<String>,
}

/// Arguments for the keygen command
#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Number of keys to print
    #[arg(short = 'n', long, default_value = "1")]
    pub count: u32,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Cache region selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RegionArg {
    /// Dashboard filter state
    FilterState,
    /// Explore form data
    FormData,
}

impl From<RegionArg> for Region {
    fn from(arg: RegionArg) -> Self {
        match arg {
            RegionArg::FilterState => Region::FilterState,
            RegionArg::FormData => Region::ExploreFormData,
        }
    }
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bare values, one per line
    Text,
    /// JSON object
    Json,
}
