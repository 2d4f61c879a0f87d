//! Shared test helpers for nelly-core integration tests.
//!
//! Provides a registry of fake command handlers that record every invocation,
//! and a harness that runs a script with `print` output captured.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use nelly_core::{run_script_with_output, CommandOptions, CommandRegistry, Error, ExecutionState};

/// Names the header bootstrap may dispatch.
pub const BOOTSTRAP_COMMANDS: [&str; 6] = ["clone", "checkout", "init", "createBranch", "track", "push"];

pub type CallLog = Arc<Mutex<Vec<(String, CommandOptions)>>>;

/// A registry whose handlers log their calls and fail on demand.
pub struct Recorder {
    pub registry: CommandRegistry,
    pub calls: CallLog,
}

impl Recorder {
    /// Records the bootstrap commands plus `extra`, failing every command in `failing`.
    pub fn new(extra: &[&str], failing: &[&str]) -> Self {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let failing: HashSet<String> = failing.iter().map(|s| s.to_string()).collect();
        let mut registry = CommandRegistry::new();

        for name in BOOTSTRAP_COMMANDS.iter().chain(extra) {
            let calls = Arc::clone(&calls);
            let owned = name.to_string();
            let fails = failing.contains(*name);
            registry.register(*name, move |_, opts| {
                calls.lock().unwrap().push((owned.clone(), opts.clone()));
                if fails {
                    Err(format!("{} exploded", owned).into())
                } else {
                    Ok(())
                }
            });
        }

        Self { registry, calls }
    }

    /// Command names invoked so far, in order.
    pub fn names(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Options of the `index`-th invocation.
    pub fn options(&self, index: usize) -> CommandOptions {
        self.calls.lock().unwrap()[index].1.clone()
    }

    /// Runs `source`, returning the result, captured output and final state.
    pub fn run(&self, source: &str) -> (Result<(), Error>, String, ExecutionState) {
        let state = ExecutionState::new();
        let mut out = Vec::new();
        let result = run_script_with_output(source, &self.registry, &state, &mut out);
        (result, String::from_utf8(out).unwrap(), state)
    }
}

/// Prefixes `body` with a local-repository header.
pub fn local(body: &str) -> String {
    format!("#! myrepo : main\n{}", body)
}
