//! Command handlers that perform real git operations.
//!
//! [`GitCommands::register`] installs one handler per name in [`COMMANDS`].
//! Handlers after `clone`/`init` operate on the repository recorded in the
//! [`ExecutionState`], so scripts never name the directory twice.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;

use nelly_core::{CommandOptions, CommandRegistry, ExecutionState};
use tracing::{info, warn};

use crate::config::NellyConfig;
use crate::error::GitError;
use crate::git::{clone_dir, Git};

/// Remote used when neither the command nor the configuration names one.
pub const DEFAULT_REMOTE: &str = "origin";

/// Every command name the git handler set provides.
pub const COMMANDS: [&str; 8] = [
    "clone",
    "init",
    "checkout",
    "createBranch",
    "track",
    "push",
    "commit",
    "tag",
];

type Operation = fn(&GitCommands, &ExecutionState, &CommandOptions) -> Result<(), GitError>;

/// Git-backed implementations of the script commands.
#[derive(Debug, Clone, Default)]
pub struct GitCommands {
    git: Git,
    remote: Option<String>,
}

impl GitCommands {
    pub fn new(git: Git) -> Self {
        Self { git, remote: None }
    }

    /// Builds handlers from persisted settings, falling back to `git` on
    /// `PATH` and the current directory.
    pub fn from_config(config: &NellyConfig) -> Self {
        let binary = config.git_binary.clone().unwrap_or_else(|| PathBuf::from("git"));
        let workdir = config.workdir.clone().unwrap_or_else(|| PathBuf::from("."));
        Self {
            git: Git::new(binary, workdir),
            remote: config.remote.clone(),
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    pub fn git(&self) -> &Git {
        &self.git
    }

    /// Installs a handler for every name in [`COMMANDS`].
    pub fn register(self, registry: &mut CommandRegistry) {
        let this = Arc::new(self);
        let operations: [(&str, Operation); 8] = [
            ("clone", GitCommands::clone_repo as Operation),
            ("init", GitCommands::init as Operation),
            ("checkout", GitCommands::checkout as Operation),
            ("createBranch", GitCommands::create_branch as Operation),
            ("track", GitCommands::track as Operation),
            ("push", GitCommands::push as Operation),
            ("commit", GitCommands::commit as Operation),
            ("tag", GitCommands::tag as Operation),
        ];
        for (name, operation) in operations {
            let this = Arc::clone(&this);
            registry.register(name, move |state, options| {
                operation(&*this, state, options).map_err(Into::into)
            });
        }
    }

    fn default_remote<'a>(&'a self, options: &'a CommandOptions) -> &'a str {
        options
            .get("remote")
            .map(String::as_str)
            .or(self.remote.as_deref())
            .unwrap_or(DEFAULT_REMOTE)
    }

    /// `clone .url(U) [.directory(D)]`
    pub fn clone_repo(&self, state: &ExecutionState, options: &CommandOptions) -> Result<(), GitError> {
        let url = required(options, "clone", "url")?;
        let dir = match options.get("directory") {
            Some(dir) => dir.clone(),
            None => clone_dir(url).ok_or_else(|| GitError::InvalidOption {
                command: "clone",
                option: "url",
                reason: format!("cannot derive a directory name from '{}'", url),
            })?,
        };
        let target = self.git.workdir().join(&dir);
        self.git.run(None, [OsStr::new("clone"), OsStr::new(url), target.as_os_str()])?;
        state.set_repo(target.to_string_lossy());
        Ok(())
    }

    /// `init .directory(D)`
    pub fn init(&self, state: &ExecutionState, options: &CommandOptions) -> Result<(), GitError> {
        let dir = required(options, "init", "directory")?;
        let target = self.git.workdir().join(dir);
        self.git.run(None, [OsStr::new("init"), target.as_os_str()])?;
        state.set_repo(target.to_string_lossy());
        Ok(())
    }

    /// `checkout .name(B)`
    pub fn checkout(&self, state: &ExecutionState, options: &CommandOptions) -> Result<(), GitError> {
        let name = required(options, "checkout", "name")?;
        let repo = repository(state, "checkout")?;
        self.git.run(Some(repo.as_path()), ["checkout", name])?;
        state.set_branch(name);
        Ok(())
    }

    /// `createBranch .name(B)`
    ///
    /// On a repository without commits the unborn `HEAD` is pointed at the
    /// new branch instead, since there is nothing to branch from.
    pub fn create_branch(&self, state: &ExecutionState, options: &CommandOptions) -> Result<(), GitError> {
        let name = required(options, "createBranch", "name")?;
        let repo = repository(state, "createBranch")?;
        if self.git.succeeds(Some(repo.as_path()), ["rev-parse", "--verify", "--quiet", "HEAD"])? {
            self.git.run(Some(repo.as_path()), ["checkout", "-b", name])?;
        } else {
            let refname = format!("refs/heads/{}", name);
            self.git.run(Some(repo.as_path()), ["symbolic-ref", "HEAD", refname.as_str()])?;
        }
        state.set_branch(name);
        Ok(())
    }

    /// `track .name(B) [.remote(R)]`
    pub fn track(&self, state: &ExecutionState, options: &CommandOptions) -> Result<(), GitError> {
        let name = required(options, "track", "name")?;
        let repo = repository(state, "track")?;
        let remote = self.default_remote(options);
        let remote_key = format!("branch.{}.remote", name);
        let merge_key = format!("branch.{}.merge", name);
        let merge_ref = format!("refs/heads/{}", name);
        self.git.run(Some(repo.as_path()), ["config", remote_key.as_str(), remote])?;
        self.git.run(Some(repo.as_path()), ["config", merge_key.as_str(), merge_ref.as_str()])?;
        Ok(())
    }

    /// `push [.remote(R)] [.branch(B)] [.force]`
    ///
    /// Skipped with a warning when the remote is not configured, which is the
    /// normal case right after a local `init`.
    pub fn push(&self, state: &ExecutionState, options: &CommandOptions) -> Result<(), GitError> {
        let repo = repository(state, "push")?;
        let remote = self.default_remote(options);

        let remotes = self.git.run(Some(repo.as_path()), ["remote"])?;
        if !remotes.lines().any(|r| r.trim() == remote) {
            warn!(remote, repo = %repo.display(), "remote not configured, skipping push");
            return Ok(());
        }

        let mut args = vec!["push".to_string()];
        if flag(options, "force") {
            args.push("--force".to_string());
        }
        args.push(remote.to_string());
        if let Some(branch) = options.get("branch").cloned().or_else(|| state.current_branch()) {
            args.push(branch);
        }
        self.git.run(Some(repo.as_path()), &args)?;
        Ok(())
    }

    /// `commit .message(M) [.all]`
    pub fn commit(&self, state: &ExecutionState, options: &CommandOptions) -> Result<(), GitError> {
        let message = required(options, "commit", "message")?;
        let repo = repository(state, "commit")?;
        let mut args = vec!["commit"];
        if flag(options, "all") {
            args.push("-a");
        }
        args.extend(["--allow-empty", "-m", message]);
        self.git.run(Some(repo.as_path()), args)?;
        Ok(())
    }

    /// `tag .name(T) [.message(M)]`
    pub fn tag(&self, state: &ExecutionState, options: &CommandOptions) -> Result<(), GitError> {
        let name = required(options, "tag", "name")?;
        let repo = repository(state, "tag")?;
        let mut args = vec!["tag"];
        if let Some(message) = options.get("message") {
            args.extend(["-a", "-m", message.as_str()]);
        }
        args.push(name);
        self.git.run(Some(repo.as_path()), args)?;
        info!(tag = name, "tag created");
        Ok(())
    }
}

fn required<'a>(
    options: &'a CommandOptions,
    command: &'static str,
    option: &'static str,
) -> Result<&'a str, GitError> {
    options
        .get(option)
        .map(String::as_str)
        .ok_or(GitError::MissingOption { command, option })
}

fn repository(state: &ExecutionState, command: &'static str) -> Result<PathBuf, GitError> {
    state
        .current_repo()
        .map(PathBuf::from)
        .ok_or(GitError::NoRepository(command))
}

/// A bare option arrives as `"true"`; anything but `"false"` counts as set.
fn flag(options: &CommandOptions, name: &str) -> bool {
    options.get(name).is_some_and(|v| v != "false")
}
