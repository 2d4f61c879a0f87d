//! Thin wrapper around the `git` command-line tool.
//!
//! Every call is synchronous: the child process is spawned, waited on, and
//! its trimmed stdout returned. A non-zero exit becomes
//! [`GitError::CommandFailed`] carrying git's stderr.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use nelly_git::git::Git;
//!
//! let git = Git::new("git", ".");
//! let branch = git.run(Some(Path::new("myrepo")), ["rev-parse", "--abbrev-ref", "HEAD"]).unwrap();
//! println!("on {}", branch);
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::GitError;

/// Handle to a git binary and the directory new repositories are created in.
#[derive(Debug, Clone)]
pub struct Git {
    binary: PathBuf,
    workdir: PathBuf,
}

impl Default for Git {
    fn default() -> Self {
        Self::new("git", ".")
    }
}

impl Git {
    pub fn new(binary: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            workdir: workdir.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Runs git with `args`, inside `repo` when given.
    ///
    /// # Errors
    ///
    /// - [`GitError::Io`] if the binary cannot be spawned
    /// - [`GitError::CommandFailed`] if git exits with a non-zero status
    pub fn run<I, S>(&self, repo: Option<&Path>, args: I) -> Result<String, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let described = describe(&args);

        let mut command = Command::new(&self.binary);
        if let Some(repo) = repo {
            command.arg("-C").arg(repo);
        }
        command.args(&args);

        info!(command = %described, repo = ?repo, "running git");
        let output = command.output()?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: described,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(command = %described, stdout = %stdout, "git finished");
        Ok(stdout)
    }

    /// Like [`run`](Self::run) but reports only whether git exited successfully.
    pub fn succeeds<I, S>(&self, repo: Option<&Path>, args: I) -> Result<bool, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        match self.run(repo, args) {
            Ok(_) => Ok(true),
            Err(GitError::CommandFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn describe<S: AsRef<OsStr>>(args: &[S]) -> String {
    let mut line = String::from("git");
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

/// Directory name `git clone` would pick for `url`.
///
/// Takes the last path segment, splitting on `/` and on the `:` of scp-style
/// locators, and strips a trailing `.git`.
pub fn clone_dir(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let segment = trimmed.rsplit(['/', ':']).next()?;
    let name = segment.strip_suffix(".git").unwrap_or(segment);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
