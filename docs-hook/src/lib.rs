//! docs-hook - Rebuild static documentation from push webhooks.
//!
//! Receives push-event webhooks from GitHub, Gitee or Codeup, authenticates
//! them, and regenerates the site from a local checkout.
//!
//! ## Architecture
//!
//! ```text
//! POST /api/docs → select_provider → HookVerifier → BuildTrigger (git pull + generator)
//! ```

pub mod build;
pub mod config;
pub mod hook;
pub mod web;

// Re-export commonly used types
pub use build::{BuildError, BuildTrigger, Generator, LocalBuildTrigger, Repository};
pub use config::{Config, ConfigError, ToolType};
pub use hook::{HookRequest, HookVerifier, Provider, VerificationOutcome, VerifierConfig};
pub use web::{router, AppState};
