//! # nelly-core
//!
//! Front end and interpreter for nelly, a small scripting language that
//! bootstraps a git repository and then drives it with variables, loops,
//! conditionals and named commands.
//!
//! A script starts with a header naming the repository and branch, followed
//! by statements:
//!
//! ```text
//! #! https://github.com/acme/widgets.git : release
//!
//! let versions = [v1.4.0, v1.4.1]
//! for v in versions {
//!     tag .name(v)
//! }
//! if len(versions) > 1 { print("tagged", len(versions), "releases") }
//! ```
//!
//! ## Modules
//!
//! - [`lexer`] - Script text to tokens
//! - [`parser`] - Tokens to a [`Program`](ast::Program)
//! - [`ast`] - Syntax tree types
//! - [`value`] - Dynamically typed runtime values
//! - [`executor`] - The [`Interpreter`](executor::Interpreter) running statements; expressions are evaluated in `eval`
//! - [`state`] - Variable bindings shared by one execution
//! - [`command`] - Registry of external command handlers
//! - [`bootstrap`] - Commands run for the header before any statement
//! - [`error`] - Parse and runtime error types
//!
//! The crate performs no git operations itself. Every command, including the
//! header bootstrap, is dispatched through a [`CommandRegistry`] supplied by
//! the caller.

pub mod ast;
pub mod bootstrap;
pub mod command;
pub mod error;
mod eval;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod state;
pub mod token;
pub mod value;

use std::io::Write;

pub use command::{CommandHandler, CommandOptions, CommandRegistry, HandlerResult};
pub use error::{Error, ParseError, RuntimeError};
pub use executor::Interpreter;
pub use state::ExecutionState;
pub use value::Value;

/// Parses `source` and executes it, printing to stdout.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the script is malformed and [`Error::Runtime`]
/// if the bootstrap or any statement fails.
pub fn run_script(source: &str, registry: &CommandRegistry, state: &ExecutionState) -> Result<(), Error> {
    let program = parser::parse(source)?;
    Interpreter::new(registry).execute_program(&program, state)?;
    Ok(())
}

/// Like [`run_script`], with `print` output written to `out`.
pub fn run_script_with_output(
    source: &str,
    registry: &CommandRegistry,
    state: &ExecutionState,
    out: impl Write,
) -> Result<(), Error> {
    let program = parser::parse(source)?;
    Interpreter::with_output(registry, out).execute_program(&program, state)?;
    Ok(())
}
