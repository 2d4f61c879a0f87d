//! Command-line runner for nelly git workflow scripts.
//!
//! # Usage
//!
//! ```bash
//! # Run a script against real repositories
//! nelly run release.nly
//!
//! # Show the commands a script would run without touching git
//! nelly run release.nly --dry-run
//!
//! # Use a specific git binary and push to "upstream"
//! nelly run release.nly --git /opt/git/bin/git --remote upstream
//!
//! # Only check that a script parses
//! nelly check release.nly
//! ```
//!
//! Exit status is 0 on success, 1 when a git command fails, 2 for a script
//! that does not parse, 3 for any other runtime error and 4 when the script
//! file cannot be read.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use nelly_core::{parser, CommandRegistry, ExecutionState};
use nelly_git::{DryRun, GitCommands, NellyConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Runner for nelly git workflow scripts.
#[derive(Parser)]
#[command(name = "nelly")]
#[command(about = "Bootstrap and drive git repositories with nelly scripts")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to nelly.log in this directory instead of stderr
    #[arg(long, global = true, env = "NELLY_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a script
    Run {
        /// Path to the script file
        script: PathBuf,
        /// Print the commands instead of running git
        #[arg(long)]
        dry_run: bool,
        /// Path to the git executable
        #[arg(long, env = "NELLY_GIT")]
        git: Option<PathBuf>,
        /// Remote used by track and push
        #[arg(long, env = "NELLY_REMOTE")]
        remote: Option<String>,
        /// Directory repositories are cloned or initialized in
        #[arg(long)]
        workdir: Option<PathBuf>,
    },

    /// Parse a script without running it
    Check {
        /// Path to the script file
        script: PathBuf,
    },
}

#[derive(Debug)]
enum CliError {
    Read { path: PathBuf, source: std::io::Error },
    Script(nelly_core::Error),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Read { .. } => ExitCode::from(4),
            CliError::Script(e) => ExitCode::from(e.exit_code() as u8),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Read { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            CliError::Script(e) => write!(f, "{}", e),
        }
    }
}

impl From<nelly_core::Error> for CliError {
    fn from(e: nelly_core::Error) -> Self {
        CliError::Script(e)
    }
}

impl From<nelly_core::ParseError> for CliError {
    fn from(e: nelly_core::ParseError) -> Self {
        CliError::Script(e.into())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_dir.as_deref());

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code()
        }
    }
}

fn init_logging(verbose: bool, log_dir: Option<&Path>) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).ok();
            let file_appender = tracing_appender::rolling::never(dir, "nelly.log");
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file_appender)
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn read_script(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Run {
            script,
            dry_run,
            git,
            remote,
            workdir,
        } => {
            let source = read_script(&script)?;

            let mut config = NellyConfig::load();
            if git.is_some() {
                config.git_binary = git;
            }
            if remote.is_some() {
                config.remote = remote;
            }
            if workdir.is_some() {
                config.workdir = workdir;
            }
            debug!(?config, dry_run, "resolved configuration");

            let mut registry = CommandRegistry::new();
            if dry_run {
                DryRun::register(&mut registry);
            } else {
                GitCommands::from_config(&config).register(&mut registry);
            }

            info!(script = %script.display(), "running script");
            let state = ExecutionState::new();
            nelly_core::run_script(&source, &registry, &state)?;
            Ok(())
        }
        Command::Check { script } => {
            let source = read_script(&script)?;
            let program = parser::parse(&source)?;
            debug!(statements = program.statements.len(), "script parsed");
            println!("ok");
            Ok(())
        }
    }
}
