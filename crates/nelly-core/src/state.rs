//! The mutable environment shared by one script execution.
//!
//! Variables live in a single flat map: `let` bindings and loop variables made
//! inside blocks stay visible after the block ends. Every accessor takes the
//! one internal lock, so a command handler may hand the state to helper
//! threads while the interpreter itself stays single-threaded.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::value::Value;

#[derive(Debug, Default)]
struct Inner {
    vars: HashMap<String, Value>,
    current_repo: Option<String>,
    current_branch: Option<String>,
}

/// Variable bindings plus the active repository and branch markers.
#[derive(Debug, Default)]
pub struct ExecutionState {
    inner: Mutex<Inner>,
}

impl ExecutionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_var(&self, name: &str) -> Option<Value> {
        self.inner.lock().vars.get(name).cloned()
    }

    /// Binds `name`, replacing any previous binding.
    pub fn set_var(&self, name: impl Into<String>, value: Value) {
        self.inner.lock().vars.insert(name.into(), value);
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.inner.lock().vars.contains_key(name)
    }

    /// Snapshot of all bindings.
    pub fn vars(&self) -> HashMap<String, Value> {
        self.inner.lock().vars.clone()
    }

    pub fn current_repo(&self) -> Option<String> {
        self.inner.lock().current_repo.clone()
    }

    pub fn set_repo(&self, repo: impl Into<String>) {
        self.inner.lock().current_repo = Some(repo.into());
    }

    pub fn current_branch(&self) -> Option<String> {
        self.inner.lock().current_branch.clone()
    }

    pub fn set_branch(&self, branch: impl Into<String>) {
        self.inner.lock().current_branch = Some(branch.into());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_state_starts_empty() {
        let state = ExecutionState::new();
        assert!(state.vars().is_empty());
        assert_eq!(state.get_var("x"), None);
        assert_eq!(state.current_repo(), None);
        assert_eq!(state.current_branch(), None);
    }

    #[test]
    fn test_set_var_overwrites() {
        let state = ExecutionState::new();
        state.set_var("x", Value::Number(1.0));
        state.set_var("x", Value::from("two"));
        assert_eq!(state.get_var("x"), Some(Value::from("two")));
        assert!(state.has_var("x"));
    }

    #[test]
    fn test_repo_and_branch_markers() {
        let state = ExecutionState::new();
        state.set_repo("myrepo");
        state.set_branch("main");
        assert_eq!(state.current_repo().as_deref(), Some("myrepo"));
        assert_eq!(state.current_branch().as_deref(), Some("main"));
    }

    #[test]
    fn test_concurrent_access() {
        let state = Arc::new(ExecutionState::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    for j in 0..100 {
                        state.set_var(format!("v{}_{}", i, j), Value::Number(j as f64));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(state.vars().len(), 800);
    }
}
