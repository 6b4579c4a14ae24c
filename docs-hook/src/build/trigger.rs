//! Rebuild entry point used by the webhook handler.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

use super::command::CommandError;
use super::generator::Generator;
use super::repo::Repository;

/// Which half of a rebuild failed.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to update repository: {0}")]
    Repository(#[source] CommandError),

    #[error("failed to generate document: {0}")]
    Generator(#[source] CommandError),
}

/// Updates the checkout and regenerates the site.
#[async_trait]
pub trait BuildTrigger: Send + Sync {
    async fn rebuild(&self) -> Result<(), BuildError>;
}

/// Rebuilds the local checkout in place.
///
/// Rebuilds are serialized: a delivery arriving mid-build waits for the
/// running one to finish before touching the checkout.
pub struct LocalBuildTrigger {
    repository: Repository,
    generator: Generator,
    lock: Mutex<()>,
}

impl LocalBuildTrigger {
    pub fn new(repository: Repository, generator: Generator) -> Self {
        Self {
            repository,
            generator,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl BuildTrigger for LocalBuildTrigger {
    async fn rebuild(&self) -> Result<(), BuildError> {
        let _guard = self.lock.lock().await;

        if let Err(e) = self.repository.update().await {
            error!(url = %self.repository.url(), command = %e.command(), "repository_update_failed");
            return Err(BuildError::Repository(e));
        }

        if let Err(e) = self.generator.build().await {
            error!(tool = %self.generator.tool(), command = %e.command(), "document_generation_failed");
            return Err(BuildError::Generator(e));
        }

        info!(tool = %self.generator.tool(), "rebuild_complete");
        Ok(())
    }
}
