// ABOUTME: Command-line interface definitions using clap
// ABOUTME: Defines export/authorize subcommands and global flags

use crate::config::CollisionPolicy;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hatena-export")]
#[command(about = "Export Hatena Blog entries to Markdown with local media", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (overrides HATENA_EXPORT_CONFIG and ./config.yml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Export root directory
    #[arg(long, global = true)]
    pub out_dir: Option<PathBuf>,

    /// How to name entries that map to an already written file
    #[arg(long, global = true, value_enum)]
    pub on_collision: Option<CollisionPolicy>,

    /// Download media without the OAuth Authorization header
    #[arg(long, global = true)]
    pub no_media_auth: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Export all entries to Markdown (default)
    Export,

    /// Obtain an access token through the OAuth1 PIN flow
    Authorize {
        /// Print the authorization URL without opening a browser
        #[arg(long)]
        no_browser: bool,

        /// Write the access token into the config file
        #[arg(long)]
        save: bool,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Export)
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
