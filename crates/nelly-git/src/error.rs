use thiserror::Error;

/// Errors that can occur while running git on behalf of a script.
#[derive(Error, Debug)]
pub enum GitError {
    /// The git binary could not be spawned.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// git ran but exited unsuccessfully.
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// A required command option was not supplied.
    #[error("{command}: missing required option '{option}'")]
    MissingOption {
        command: &'static str,
        option: &'static str,
    },

    /// An option was supplied but its value cannot be used.
    #[error("{command}: invalid value for '{option}': {reason}")]
    InvalidOption {
        command: &'static str,
        option: &'static str,
        reason: String,
    },

    /// A command needs a repository but no clone or init has run yet.
    #[error("{0}: no repository has been cloned or initialized")]
    NoRepository(&'static str),

    /// Reading or writing the configuration file failed.
    #[error("config error: {0}")]
    Config(String),
}
