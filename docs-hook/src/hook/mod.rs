//! Webhook verification layer.
//!
//! ## Flow
//!
//! ```text
//! HookRequest → select_provider() → HookVerifier
//!             → header_check → signature → body_filter → VerificationOutcome
//! ```
//!
//! Verification is a pure function of the request and [`VerifierConfig`];
//! the only side effect is logging.

pub mod codeup;
pub mod gitee;
pub mod github;
pub mod outcome;
pub mod payload;
pub mod request;
pub mod selector;
pub mod signature;
pub mod verifier;

pub use outcome::{RejectReason, Stage, StepResult, VerificationOutcome};
pub use payload::{filter_push_body, CommitSummary, PushPayload};
pub use request::HookRequest;
pub use selector::{select_provider, Provider};
pub use verifier::{HookVerifier, VerifierConfig};
