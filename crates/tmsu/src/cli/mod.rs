pub mod info;
pub mod init;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tmsu", about = "Tag files and query them by tag", version)]
pub struct Cli {
    /// Database to use: a file path, or scheme://address for a networked database
    #[arg(short = 'D', long, env = "TMSU_DB", global = true)]
    pub database: Option<String>,

    /// Log more (-v info, -vv debug, -vvv statements)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a database under each PATH (default: the working directory)
    Init {
        /// Directories to initialize
        paths: Vec<String>,
        /// Root for relative paths; networked databases only
        #[arg(short = 'P', long = "root-path")]
        root_path: Option<String>,
    },
    /// Show the database in use and its schema version
    Info,
}
