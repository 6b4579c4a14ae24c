//! Local checkout of the documentation repository.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use super::command::{run_command, CommandError, CommandSpec};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("file exists in {0}")]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// A git checkout at `dir` tracking `url`.
#[derive(Debug, Clone)]
pub struct Repository {
    url: String,
    dir: PathBuf,
    timeout: Duration,
}

impl Repository {
    pub fn new(url: impl Into<String>, dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            dir: dir.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make sure the git client is installed.
    pub async fn check_client(&self) -> Result<(), CommandError> {
        run_command(&CommandSpec::new("git").arg("--version"), self.timeout).await
    }

    /// Clone on first start, pull when the checkout already exists.
    pub async fn ensure_checkout(&self) -> Result<(), RepoError> {
        if self.dir.exists() {
            if !self.dir.is_dir() {
                return Err(RepoError::NotADirectory(self.dir.clone()));
            }
            self.update().await?;
            return Ok(());
        }

        run_command(&self.clone_command(), self.timeout).await?;
        info!(url = %self.url, dir = %self.dir.display(), "repository_initialized");
        Ok(())
    }

    /// Pull the latest commits, including submodules.
    pub async fn update(&self) -> Result<(), CommandError> {
        run_command(&self.pull_command(), self.timeout).await?;
        info!(url = %self.url, "repository_updated");
        Ok(())
    }

    fn clone_command(&self) -> CommandSpec {
        CommandSpec::new("git")
            .arg("clone")
            .arg("--recursive")
            .arg(self.url.as_str())
            .path_arg(&self.dir)
    }

    fn pull_command(&self) -> CommandSpec {
        CommandSpec::new("git")
            .arg("pull")
            .arg("--recurse-submodules")
            .current_dir(&self.dir)
    }
}
