//! Error types for parsing and executing nelly scripts.
//!
//! Errors are split along the boundary the caller cares about: a script that
//! could not be read into a [`Program`](crate::ast::Program) fails with a
//! [`ParseError`], a script that parsed but failed while running fails with a
//! [`RuntimeError`]. [`Error`] unifies both for callers that drive the whole
//! pipeline through [`run_script`](crate::run_script).

use thiserror::Error;

use crate::bootstrap::BootstrapStage;

/// Failure reported by an external command handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while turning script text into a program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// An unrecognized character or malformed literal.
    #[error("lexical error at {line}:{column}: {message}")]
    Lex {
        message: String,
        line: usize,
        column: usize,
    },

    /// The token stream does not match the grammar.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
}

impl ParseError {
    /// Line on which the error was detected.
    pub fn line(&self) -> usize {
        match self {
            ParseError::Lex { line, .. } | ParseError::Syntax { line, .. } => *line,
        }
    }
}

/// Errors produced while executing a parsed program.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("unsupported function: {0}")]
    UnsupportedFunction(String),

    /// An operand or argument had the wrong runtime type.
    #[error("type error: {0}")]
    Type(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("for: range is not iterable (got {0})")]
    NotIterable(String),

    /// Writing `print` output failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// A command handler reported failure.
    #[error("command '{command}' failed: {source}")]
    Handler {
        command: String,
        #[source]
        source: HandlerError,
    },

    /// The value expression of a command option failed to evaluate.
    #[error("invalid value for option '{option}' of '{command}': {source}")]
    Option {
        command: String,
        option: String,
        #[source]
        source: Box<RuntimeError>,
    },

    /// A stage of the header bootstrap sequence failed.
    #[error("{stage} failed: {source}")]
    Bootstrap {
        stage: BootstrapStage,
        #[source]
        source: Box<RuntimeError>,
    },

    /// Wraps the error of the statement starting on `line`.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<RuntimeError>,
    },
}

impl RuntimeError {
    /// Attaches the line of the failing statement, unless an inner statement
    /// already did.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            RuntimeError::AtLine { .. } => self,
            other => RuntimeError::AtLine {
                line,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, with line and stage wrappers removed.
    pub fn root(&self) -> &RuntimeError {
        match self {
            RuntimeError::AtLine { source, .. }
            | RuntimeError::Bootstrap { source, .. }
            | RuntimeError::Option { source, .. } => source.root(),
            other => other,
        }
    }

    /// Line of the failing statement, if the error came from a statement.
    pub fn line(&self) -> Option<usize> {
        match self {
            RuntimeError::AtLine { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// The bootstrap stage that failed, if the error came from the header.
    pub fn stage(&self) -> Option<BootstrapStage> {
        match self {
            RuntimeError::Bootstrap { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Any error from loading and running a script.
#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Parse(_) => 2,
            Error::Runtime(e) => match e.root() {
                RuntimeError::Handler { .. } => 1,
                _ => 3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_line_keeps_innermost_line() {
        let err = RuntimeError::DivisionByZero.at_line(4).at_line(1);
        assert_eq!(err.line(), Some(4));
        assert!(matches!(err.root(), RuntimeError::DivisionByZero));
    }

    #[test]
    fn exit_codes_distinguish_parse_and_runtime() {
        let parse = Error::from(ParseError::Syntax {
            message: "x".to_string(),
            line: 1,
            column: 1,
        });
        assert_eq!(parse.exit_code(), 2);

        let runtime = Error::from(RuntimeError::UnknownCommand("zap".to_string()).at_line(3));
        assert_eq!(runtime.exit_code(), 3);

        let handler = Error::from(RuntimeError::Bootstrap {
            stage: BootstrapStage::Clone,
            source: Box::new(RuntimeError::Handler {
                command: "clone".to_string(),
                source: "network down".into(),
            }),
        });
        assert_eq!(handler.exit_code(), 1);
    }

    #[test]
    fn display_includes_context() {
        let err = RuntimeError::Bootstrap {
            stage: BootstrapStage::CreateBranch,
            source: Box::new(RuntimeError::UnknownCommand("createBranch".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "git create branch failed: unknown command: createBranch"
        );
    }
}
