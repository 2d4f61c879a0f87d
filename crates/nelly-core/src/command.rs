//! The boundary between scripts and the outside world.
//!
//! A script never performs git operations itself. Command statements and the
//! header bootstrap look their name up in a [`CommandRegistry`] and call the
//! registered [`CommandHandler`] with the options rendered as strings.
//!
//! # Example
//!
//! ```
//! use nelly_core::command::CommandRegistry;
//!
//! let mut registry = CommandRegistry::new();
//! registry.register("greet", |_state, opts| {
//!     println!("hello {}", opts.get("name").map(String::as_str).unwrap_or("world"));
//!     Ok(())
//! });
//! assert!(registry.contains("greet"));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{HandlerError, RuntimeError};
use crate::state::ExecutionState;

/// Option name to stringified option value, ordered by name.
pub type CommandOptions = BTreeMap<String, String>;

pub type HandlerResult = Result<(), HandlerError>;

/// An external operation invoked by name from a script.
pub trait CommandHandler: Send + Sync {
    fn call(&self, state: &ExecutionState, options: &CommandOptions) -> HandlerResult;
}

impl<F> CommandHandler for F
where
    F: Fn(&ExecutionState, &CommandOptions) -> HandlerResult + Send + Sync,
{
    fn call(&self, state: &ExecutionState, options: &CommandOptions) -> HandlerResult {
        self(state, options)
    }
}

/// Maps command names to handlers.
///
/// Built once before any script runs and only read during execution.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function under `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&ExecutionState, &CommandOptions) -> HandlerResult + Send + Sync + 'static,
    {
        self.register_handler(name, handler)
    }

    /// Registers any [`CommandHandler`] under `name`.
    pub fn register_handler<H>(&mut self, name: impl Into<String>, handler: H) -> &mut Self
    where
        H: CommandHandler + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Looks up `name` and invokes its handler.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::UnknownCommand`] if nothing is registered under `name`
    /// - [`RuntimeError::Handler`] if the handler reports failure
    pub fn dispatch(
        &self,
        name: &str,
        state: &ExecutionState,
        options: &CommandOptions,
    ) -> Result<(), RuntimeError> {
        let handler = self
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownCommand(name.to_string()))?;
        info!(command = name, ?options, "dispatching command");
        handler.call(state, options).map_err(|source| RuntimeError::Handler {
            command: name.to_string(),
            source,
        })?;
        debug!(command = name, "command finished");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}
