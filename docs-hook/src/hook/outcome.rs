//! Verification results.

use std::fmt;

/// Why a delivery was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingHeader,
    BadSignature,
    TimestampOutOfRange,
    RepositoryMismatch,
    MalformedBody,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingHeader => "missing_header",
            RejectReason::BadSignature => "bad_signature",
            RejectReason::TimestampOutOfRange => "timestamp_out_of_range",
            RejectReason::RepositoryMismatch => "repository_mismatch",
            RejectReason::MalformedBody => "malformed_body",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verification step that refused a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Headers,
    Signature,
    Body,
}

/// Final result of running a delivery through a verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Accepted,
    Rejected { stage: Stage, reason: RejectReason },
}

/// Result of a single verification step.
pub type StepResult = Result<(), RejectReason>;
