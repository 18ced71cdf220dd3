use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wsimon")]
#[command(about = "Monitors a whole-slide-imaging scanner's output directory", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Watch the scanner output directory (default command)")]
    Watch {
        #[arg(short, long, help = "Directory the scanner writes into")]
        dir: Option<PathBuf>,
        #[arg(short, long, help = "Poll interval in seconds")]
        interval: Option<u64>,
        #[arg(long, help = "Seconds a .tmp file may exist before a stall alert")]
        max_pending_age: Option<u64>,
        #[arg(long, help = "Quiet seconds before a batch is considered complete")]
        no_pending_timeout: Option<u64>,
        #[arg(long, help = "Log alerts only, skip desktop notifications")]
        no_desktop: bool,
    },
    #[command(about = "Manage configuration")]
    Config {
        #[command(subcommand)]
        action: ConfigActions,
    },
    #[command(about = "View recent alerts")]
    History {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum ConfigActions {
    #[command(about = "Show current configuration")]
    Show,
    #[command(about = "Set a configuration value")]
    Set {
        #[arg(short, long)]
        key: String,
        #[arg(short, long)]
        value: String,
    },
    #[command(about = "Print the config file path")]
    Path,
}

impl Cli {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}
