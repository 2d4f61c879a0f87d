//! Statement execution.
//!
//! The [`Interpreter`] runs a [`Program`] against one [`ExecutionState`]:
//! first the header bootstrap, then every top-level statement in order. The
//! first failing statement aborts its enclosing sequence and the error,
//! tagged with the statement's line, is returned to the caller.
//!
//! # Example
//!
//! ```
//! use nelly_core::command::CommandRegistry;
//! use nelly_core::executor::Interpreter;
//! use nelly_core::parser;
//! use nelly_core::state::ExecutionState;
//!
//! let program = parser::parse("#! demo : main\nlet greeting = \"hi\"\nprint(greeting)").unwrap();
//!
//! let mut registry = CommandRegistry::new();
//! for name in ["init", "createBranch", "track", "push"] {
//!     registry.register(name, |_, _| Ok(()));
//! }
//!
//! let mut out = Vec::new();
//! let state = ExecutionState::new();
//! Interpreter::with_output(&registry, &mut out)
//!     .execute_program(&program, &state)
//!     .unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "hi\n");
//! ```

use std::io::{self, Write};

use tracing::debug;

use crate::ast::{CommandStmt, Program, Statement};
use crate::bootstrap;
use crate::command::{CommandOptions, CommandRegistry};
use crate::error::RuntimeError;
use crate::state::ExecutionState;
use crate::value::Value;

/// Executes programs against a command registry.
///
/// `print` output goes to the interpreter's sink, stdout unless replaced
/// with [`Interpreter::with_output`].
pub struct Interpreter<'a> {
    registry: &'a CommandRegistry,
    pub(crate) out: Box<dyn Write + 'a>,
}

impl<'a> Interpreter<'a> {
    pub fn new(registry: &'a CommandRegistry) -> Self {
        Self::with_output(registry, io::stdout())
    }

    pub fn with_output(registry: &'a CommandRegistry, out: impl Write + 'a) -> Self {
        Self {
            registry,
            out: Box::new(out),
        }
    }

    /// Runs the header bootstrap, then every top-level statement.
    pub fn execute_program(
        &mut self,
        program: &Program,
        state: &ExecutionState,
    ) -> Result<(), RuntimeError> {
        bootstrap::run(&program.header, self.registry, state)?;
        self.execute_block(&program.statements, state)?;
        self.out.flush()?;
        Ok(())
    }

    /// Executes `statements` in order, stopping at the first error.
    pub fn execute_block(
        &mut self,
        statements: &[Statement],
        state: &ExecutionState,
    ) -> Result<(), RuntimeError> {
        for stmt in statements {
            self.execute_statement(stmt, state)?;
        }
        Ok(())
    }

    pub fn execute_statement(
        &mut self,
        stmt: &Statement,
        state: &ExecutionState,
    ) -> Result<(), RuntimeError> {
        let line = stmt.line();
        debug!(line, "executing statement");
        self.execute_inner(stmt, state)
            .map_err(|e| e.at_line(line))
    }

    fn execute_inner(&mut self, stmt: &Statement, state: &ExecutionState) -> Result<(), RuntimeError> {
        match stmt {
            Statement::Let { name, value, .. } => {
                let value = self.eval(value, state)?;
                state.set_var(name.clone(), value);
                Ok(())
            }
            Statement::Command(cmd) => self.execute_command(cmd, state),
            Statement::For { variable, range, body, .. } => {
                let items = match self.eval(range, state)? {
                    Value::Array(items) => items,
                    other => return Err(RuntimeError::NotIterable(other.type_name().to_string())),
                };
                for item in items {
                    state.set_var(variable.clone(), item);
                    self.execute_block(body, state)?;
                }
                Ok(())
            }
            Statement::If { condition, then_block, else_block, .. } => {
                let cond = self.eval(condition, state)?;
                let Some(cond) = cond.as_bool() else {
                    return Err(RuntimeError::Type(format!(
                        "if: condition is not boolean (got {})",
                        cond.type_name()
                    )));
                };
                if cond {
                    self.execute_block(then_block, state)
                } else if let Some(else_block) = else_block {
                    self.execute_block(else_block, state)
                } else {
                    Ok(())
                }
            }
            Statement::Expr { expr, .. } => {
                self.eval(expr, state)?;
                Ok(())
            }
        }
    }

    /// Evaluates the options of `cmd` to strings and dispatches it.
    ///
    /// A valued option is rendered with its default string form; a bare
    /// option is passed as `"true"`.
    fn execute_command(&mut self, cmd: &CommandStmt, state: &ExecutionState) -> Result<(), RuntimeError> {
        if !self.registry.contains(&cmd.name) {
            return Err(RuntimeError::UnknownCommand(cmd.name.clone()));
        }
        let mut options = CommandOptions::new();
        for option in &cmd.options {
            let rendered = match &option.value {
                Some(expr) => self
                    .eval(expr, state)
                    .map_err(|source| RuntimeError::Option {
                        command: cmd.name.clone(),
                        option: option.name.clone(),
                        source: Box::new(source),
                    })?
                    .to_string(),
                None => "true".to_string(),
            };
            options.insert(option.name.clone(), rendered);
        }
        self.registry.dispatch(&cmd.name, state, &options)
    }
}
