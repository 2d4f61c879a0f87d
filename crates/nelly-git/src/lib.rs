//! # nelly-git
//!
//! Command handlers that give nelly scripts their effect on real repositories.
//!
//! ## Modules
//!
//! - [`git`] - Wrapper around the `git` binary
//! - [`commands`] - Handlers for `clone`, `init`, `checkout`, `createBranch`,
//!   `track`, `push`, `commit` and `tag`
//! - [`dry_run`] - Stand-ins that only report the calls they receive
//! - [`config`] - Settings persisted in `~/.nelly/config.json`
//!
//! ## Example
//!
//! ```no_run
//! use nelly_core::{run_script, CommandRegistry, ExecutionState};
//! use nelly_git::{GitCommands, NellyConfig};
//!
//! let mut registry = CommandRegistry::new();
//! GitCommands::from_config(&NellyConfig::load()).register(&mut registry);
//!
//! let script = "#! widgets : main\ncommit .message(\"initial\")\ntag .name(v0.1.0)";
//! run_script(script, &registry, &ExecutionState::new()).expect("script failed");
//! ```

pub mod commands;
pub mod config;
pub mod dry_run;
mod error;
pub mod git;

pub use commands::{GitCommands, COMMANDS, DEFAULT_REMOTE};
pub use config::NellyConfig;
pub use dry_run::DryRun;
pub use error::GitError;
