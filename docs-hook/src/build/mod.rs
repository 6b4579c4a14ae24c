//! External collaborators behind a rebuild: git and the site generator.
//!
//! ```text
//! BuildTrigger::rebuild() → git pull --recurse-submodules → generator build
//! ```

pub mod command;
pub mod generator;
pub mod repo;
pub mod trigger;

pub use command::{run_command, CommandError, CommandSpec};
pub use generator::Generator;
pub use repo::{RepoError, Repository};
pub use trigger::{BuildError, BuildTrigger, LocalBuildTrigger};
