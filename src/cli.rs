use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "domainjoin")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Join this computer to a directory domain, or leave it", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to <config dir>/domainjoin/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Filesystem prefix the modules operate under
    #[arg(long, global = true)]
    pub root: Option<String>,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Include full error cause chains in messages
    #[arg(long, global = true)]
    pub show_traces: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Join a domain
    Join(JoinArgs),

    /// Leave the currently joined domain
    Leave(LeaveArgs),

    /// Show the recorded domain membership
    Query,

    /// List the configuration modules in join order
    Modules,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Join / Leave
// ============================================================================

#[derive(Args)]
pub struct JoinArgs {
    /// Domain to join (e.g. corp.example.com)
    pub domain: String,

    /// Organizational unit for the computer account
    #[arg(long)]
    pub ou: Option<String>,

    /// Short (NetBIOS) domain name
    #[arg(long)]
    pub short_domain: Option<String>,

    /// Computer name to use in the domain
    #[arg(long)]
    pub computer: Option<String>,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(flatten)]
    pub modules: ModuleArgs,
}

#[derive(Args)]
pub struct LeaveArgs {
    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(flatten)]
    pub modules: ModuleArgs,
}

#[derive(Args)]
pub struct CredentialArgs {
    /// Account used to join or leave (user or user@domain)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password for the account
    #[arg(long, env = "DOMAINJOIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct ModuleArgs {
    /// Enable a module that is disabled by default
    #[arg(long = "enable", value_name = "MODULE")]
    pub enable: Vec<String>,

    /// Disable a module that would otherwise run
    #[arg(long = "disable", value_name = "MODULE")]
    pub disable: Vec<String>,

    /// Show what would run and validate, without making changes
    #[arg(long)]
    pub preview: bool,

    /// Print the module table as JSON
    #[arg(long)]
    pub json: bool,
}
