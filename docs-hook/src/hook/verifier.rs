//! The contract every provider implements.

use tracing::warn;

use super::outcome::{RejectReason, Stage, StepResult, VerificationOutcome};
use super::payload::filter_push_body;
use super::request::HookRequest;
use super::selector::Provider;

/// Shared inputs to every verification: read-only for the process lifetime.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub shared_secret: Option<String>,
    pub expected_repository_name: String,
}

impl VerifierConfig {
    pub fn new(shared_secret: Option<String>, expected_repository_name: impl Into<String>) -> Self {
        Self {
            shared_secret: shared_secret.filter(|s| !s.is_empty()),
            expected_repository_name: expected_repository_name.into(),
        }
    }
}

/// Provider-specific webhook verification.
///
/// The three steps run in order; the first failure ends verification.
/// None of them mutates state, so a verifier is built per request and
/// dropped afterwards.
pub trait HookVerifier {
    fn provider(&self) -> Provider;

    /// Structural checks on headers. No cryptography.
    fn header_check(&self) -> StepResult;

    /// Secret or HMAC check. Always passes when no secret is configured.
    fn signature(&self) -> StepResult;

    /// Payload correlation against the local repository.
    fn body_filter(&self) -> StepResult;

    /// Run all three steps, stopping at the first rejection.
    fn verify(&self) -> VerificationOutcome {
        let result = self
            .header_check()
            .map_err(|reason| (Stage::Headers, reason))
            .and_then(|_| self.signature().map_err(|reason| (Stage::Signature, reason)))
            .and_then(|_| self.body_filter().map_err(|reason| (Stage::Body, reason)));

        match result {
            Ok(()) => VerificationOutcome::Accepted,
            Err((stage, reason)) => VerificationOutcome::Rejected { stage, reason },
        }
    }
}

/// Header names and event tag that distinguish one provider.
pub(crate) struct HeaderSpec {
    pub event: &'static str,
    pub event_value: &'static str,
    pub signature: &'static str,
}

/// Checks shared by every provider: the push event tag, the presence of the
/// signature header, and secret/signature parity.
pub(crate) fn check_common_headers(
    spec: &HeaderSpec,
    request: &HookRequest,
    config: &VerifierConfig,
) -> StepResult {
    let provider_event = request.header(spec.event);
    if provider_event != Some(spec.event_value) {
        warn!(
            header = spec.event,
            value = provider_event.unwrap_or(""),
            expected = spec.event_value,
            "hook_event_header_invalid"
        );
        return Err(RejectReason::MissingHeader);
    }

    if !request.has_header(spec.signature) {
        warn!(header = spec.signature, "hook_signature_header_missing");
        return Err(RejectReason::MissingHeader);
    }

    let signature_present = request
        .header(spec.signature)
        .map(|s| !s.is_empty())
        .unwrap_or(false);
    let secret_configured = config.shared_secret.is_some();
    if secret_configured != signature_present {
        warn!(
            header = spec.signature,
            secret_configured = secret_configured,
            signature_present = signature_present,
            "hook_signature_parity_mismatch"
        );
        return Err(RejectReason::MissingHeader);
    }

    Ok(())
}

/// Body step shared by every provider.
pub(crate) fn check_body(request: &HookRequest, config: &VerifierConfig) -> StepResult {
    filter_push_body(request, &config.expected_repository_name)
}
