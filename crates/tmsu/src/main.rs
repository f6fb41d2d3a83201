use std::env;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tmsu::cli::{Cli, Commands};
use tmsu_core::{locate, Registry};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(cli.verbose))
        .with_writer(io::stderr)
        .init();

    let registry = Registry::default();
    let database = cli.database.as_deref();

    let warnings = match cli.command {
        Commands::Init { paths, root_path } => {
            let cwd = env::current_dir().context("could not identify working directory")?;
            tmsu::cli::init::run(&registry, &cwd, database, &paths, root_path.as_deref())
        }
        Commands::Info => {
            let path = locate::resolve(database)?;
            tmsu::cli::info::run(&registry, &path, &mut io::stdout().lock())?;
            Vec::new()
        }
    };

    for warning in &warnings {
        eprintln!("tmsu: warning: {warning}");
    }

    Ok(if warnings.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn env_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(level)
    })
}
