//! Handlers that report what would run instead of touching any repository.

use nelly_core::{CommandOptions, CommandRegistry, ExecutionState};
use tracing::info;

use crate::commands::COMMANDS;

/// Logging-only stand-ins for the git handlers.
///
/// Each call is written to stderr as `name key=value ...`. Branch and
/// repository markers are still recorded so scripts that inspect them behave
/// as they would for real.
pub struct DryRun;

impl DryRun {
    pub fn register(registry: &mut CommandRegistry) {
        for name in COMMANDS {
            registry.register(name, move |state, options| {
                let line = Self::format_call(name, options);
                info!(command = name, "dry run");
                eprintln!("{}", line);
                Self::record(name, state, options);
                Ok(())
            });
        }
    }

    /// Renders a call as `name key=value ...`, quoting values with spaces.
    pub fn format_call(name: &str, options: &CommandOptions) -> String {
        let mut line = name.to_string();
        for (key, value) in options {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            if value.is_empty() || value.contains(char::is_whitespace) {
                line.push_str(&format!("{:?}", value));
            } else {
                line.push_str(value);
            }
        }
        line
    }

    fn record(name: &str, state: &ExecutionState, options: &CommandOptions) {
        match name {
            "clone" => {
                if let Some(dir) = options.get("directory").cloned().or_else(|| {
                    options.get("url").and_then(|url| crate::git::clone_dir(url))
                }) {
                    state.set_repo(dir);
                }
            }
            "init" => {
                if let Some(dir) = options.get("directory") {
                    state.set_repo(dir.as_str());
                }
            }
            "checkout" | "createBranch" => {
                if let Some(branch) = options.get("name") {
                    state.set_branch(branch.as_str());
                }
            }
            _ => {}
        }
    }
}
