//! The fixed command sequence run for a script header before any statement.
//!
//! A remote locator (`http://`, `https://` or `git@`) is cloned and the branch
//! checked out. Anything else is treated as a local directory that is
//! initialized, given the branch, set to track it and pushed. Stages run in
//! order and the first failure stops the sequence.

use std::fmt;

use tracing::info;

use crate::ast::Header;
use crate::command::{CommandOptions, CommandRegistry};
use crate::error::RuntimeError;
use crate::state::ExecutionState;

const REMOTE_PREFIXES: [&str; 3] = ["http://", "https://", "git@"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoKind {
    Remote,
    Local,
}

impl RepoKind {
    pub fn classify(locator: &str) -> Self {
        if REMOTE_PREFIXES.iter().any(|p| locator.starts_with(p)) {
            RepoKind::Remote
        } else {
            RepoKind::Local
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    Clone,
    Checkout,
    Init,
    CreateBranch,
    Track,
    Push,
}

impl BootstrapStage {
    /// Name of the registered command that performs this stage.
    pub fn command(self) -> &'static str {
        match self {
            BootstrapStage::Clone => "clone",
            BootstrapStage::Checkout => "checkout",
            BootstrapStage::Init => "init",
            BootstrapStage::CreateBranch => "createBranch",
            BootstrapStage::Track => "track",
            BootstrapStage::Push => "push",
        }
    }
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BootstrapStage::Clone => "git clone",
            BootstrapStage::Checkout => "git checkout",
            BootstrapStage::Init => "git init",
            BootstrapStage::CreateBranch => "git create branch",
            BootstrapStage::Track => "git track branch",
            BootstrapStage::Push => "git push",
        };
        f.write_str(label)
    }
}

/// One planned command invocation of the bootstrap sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub stage: BootstrapStage,
    pub options: CommandOptions,
}

impl Invocation {
    fn new(stage: BootstrapStage, options: &[(&str, &str)]) -> Self {
        Self {
            stage,
            options: options
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// The invocations the header expands to, in execution order.
pub fn plan(header: &Header) -> Vec<Invocation> {
    let repo = header.repo.as_str();
    let branch = header.branch.as_str();
    match RepoKind::classify(repo) {
        RepoKind::Remote => vec![
            Invocation::new(BootstrapStage::Clone, &[("url", repo)]),
            Invocation::new(BootstrapStage::Checkout, &[("name", branch)]),
        ],
        RepoKind::Local => vec![
            Invocation::new(BootstrapStage::Init, &[("directory", repo)]),
            Invocation::new(BootstrapStage::CreateBranch, &[("name", branch)]),
            Invocation::new(BootstrapStage::Track, &[("name", branch)]),
            Invocation::new(BootstrapStage::Push, &[]),
        ],
    }
}

/// Runs the bootstrap sequence for `header`.
///
/// The current repository is recorded once the clone or init stage succeeds,
/// the current branch once checkout or branch creation succeeds.
pub fn run(
    header: &Header,
    registry: &CommandRegistry,
    state: &ExecutionState,
) -> Result<(), RuntimeError> {
    info!(repo = %header.repo, branch = %header.branch, kind = ?RepoKind::classify(&header.repo), "bootstrapping");
    for invocation in plan(header) {
        let stage = invocation.stage;
        info!(%stage, "bootstrap stage");
        registry
            .dispatch(stage.command(), state, &invocation.options)
            .map_err(|source| RuntimeError::Bootstrap {
                stage,
                source: Box::new(source),
            })?;
        match stage {
            BootstrapStage::Clone | BootstrapStage::Init => {
                // A handler may already have recorded the checkout directory.
                if state.current_repo().is_none() {
                    state.set_repo(header.repo.clone());
                }
            }
            BootstrapStage::Checkout | BootstrapStage::CreateBranch => {
                state.set_branch(header.branch.clone());
            }
            BootstrapStage::Track | BootstrapStage::Push => {}
        }
    }
    Ok(())
}
