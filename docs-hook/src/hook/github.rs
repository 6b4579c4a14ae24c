//! GitHub webhooks: `X-Hub-Signature-256` carries the hex HMAC-SHA256 of the
//! raw request body.

use tracing::warn;

use super::outcome::{RejectReason, StepResult};
use super::request::HookRequest;
use super::selector::Provider;
use super::signature::verify_github_signature;
use super::verifier::{check_body, check_common_headers, HeaderSpec, HookVerifier, VerifierConfig};

pub const EVENT_HEADER: &str = "X-GitHub-Event";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
pub const PUSH_EVENT: &str = "push";

const HEADERS: HeaderSpec = HeaderSpec {
    event: EVENT_HEADER,
    event_value: PUSH_EVENT,
    signature: SIGNATURE_HEADER,
};

pub struct GithubVerifier<'a> {
    config: &'a VerifierConfig,
    request: &'a HookRequest,
}

impl<'a> GithubVerifier<'a> {
    pub fn new(config: &'a VerifierConfig, request: &'a HookRequest) -> Self {
        Self { config, request }
    }
}

impl HookVerifier for GithubVerifier<'_> {
    fn provider(&self) -> Provider {
        Provider::GitHub
    }

    fn header_check(&self) -> StepResult {
        check_common_headers(&HEADERS, self.request, self.config)
    }

    fn signature(&self) -> StepResult {
        let Some(secret) = self.config.shared_secret.as_deref() else {
            return Ok(());
        };

        let provided = self.request.header(SIGNATURE_HEADER).unwrap_or("");
        if verify_github_signature(secret, self.request.raw_body(), provided) {
            Ok(())
        } else {
            warn!(
                header = SIGNATURE_HEADER,
                actual_length = provided.len(),
                body_length = self.request.raw_body().len(),
                "hook_signature_mismatch"
            );
            Err(RejectReason::BadSignature)
        }
    }

    fn body_filter(&self) -> StepResult {
        check_body(self.request, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::outcome::{Stage, VerificationOutcome};
    use crate::hook::signature::github_signature;
    use axum::http::{HeaderMap, HeaderValue};

    const BODY: &str = r#"{"repository":{"name":"demo","url":"u"},"commits":[]}"#;

    fn request(event: &str, signature: Option<&str>, body: &[u8]) -> HookRequest {
        let mut headers = HeaderMap::new();
        headers.insert(EVENT_HEADER, HeaderValue::from_str(event).unwrap());
        if let Some(sig) = signature {
            headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(sig).unwrap());
        }
        HookRequest::new(headers, body.to_vec())
    }

    fn secret_config() -> VerifierConfig {
        VerifierConfig::new(Some("abc".to_string()), "demo")
    }

    #[test]
    fn test_signed_push_is_accepted() {
        let config = secret_config();
        let sig = github_signature("abc", BODY.as_bytes());
        let req = request(PUSH_EVENT, Some(&sig), BODY.as_bytes());
        assert_eq!(
            GithubVerifier::new(&config, &req).verify(),
            VerificationOutcome::Accepted
        );
    }

    #[test]
    fn test_event_must_be_push() {
        let config = secret_config();
        let sig = github_signature("abc", BODY.as_bytes());
        for event in ["ping", "Push", "Push Hook", "pull_request"] {
            let req = request(event, Some(&sig), BODY.as_bytes());
            assert_eq!(
                GithubVerifier::new(&config, &req).header_check(),
                Err(RejectReason::MissingHeader),
                "event {:?}",
                event
            );
        }
    }

    #[test]
    fn test_signature_header_required() {
        let config = VerifierConfig::new(None, "demo");
        let req = request(PUSH_EVENT, None, BODY.as_bytes());
        assert_eq!(
            GithubVerifier::new(&config, &req).header_check(),
            Err(RejectReason::MissingHeader)
        );
    }

    #[test]
    fn test_single_bit_flip_in_body_is_rejected() {
        let config = secret_config();
        let sig = github_signature("abc", BODY.as_bytes());

        let mut tampered = BODY.as_bytes().to_vec();
        tampered[10] ^= 0x01;
        let req = request(PUSH_EVENT, Some(&sig), &tampered);
        assert_eq!(
            GithubVerifier::new(&config, &req).signature(),
            Err(RejectReason::BadSignature)
        );
    }

    #[test]
    fn test_single_bit_flip_in_header_is_rejected() {
        let config = secret_config();
        let mut sig = github_signature("abc", BODY.as_bytes()).into_bytes();
        let last = sig.len() - 1;
        sig[last] ^= 0x01;
        let sig = String::from_utf8(sig).unwrap();
        let req = request(PUSH_EVENT, Some(&sig), BODY.as_bytes());
        assert_eq!(
            GithubVerifier::new(&config, &req).signature(),
            Err(RejectReason::BadSignature)
        );
    }

    #[test]
    fn test_signature_is_over_raw_bytes() {
        let config = secret_config();
        // Same JSON value, different bytes: a signature of the compact form
        // must not validate the spaced form.
        let spaced = br#"{ "repository": {"name": "demo", "url": "u"}, "commits": [] }"#;
        let sig = github_signature("abc", BODY.as_bytes());
        let req = request(PUSH_EVENT, Some(&sig), spaced);
        assert_eq!(
            GithubVerifier::new(&config, &req).signature(),
            Err(RejectReason::BadSignature)
        );

        let sig = github_signature("abc", spaced);
        let req = request(PUSH_EVENT, Some(&sig), spaced);
        assert_eq!(GithubVerifier::new(&config, &req).verify(), VerificationOutcome::Accepted);
    }

    #[test]
    fn test_missing_prefix_is_rejected() {
        let config = secret_config();
        let sig = github_signature("abc", BODY.as_bytes());
        let bare = sig.trim_start_matches("sha256=");
        let req = request(PUSH_EVENT, Some(bare), BODY.as_bytes());
        assert_eq!(
            GithubVerifier::new(&config, &req).signature(),
            Err(RejectReason::BadSignature)
        );
    }

    #[test]
    fn test_repository_mismatch_stops_at_body() {
        let config = VerifierConfig::new(Some("abc".to_string()), "other");
        let sig = github_signature("abc", BODY.as_bytes());
        let req = request(PUSH_EVENT, Some(&sig), BODY.as_bytes());
        assert_eq!(
            GithubVerifier::new(&config, &req).verify(),
            VerificationOutcome::Rejected {
                stage: Stage::Body,
                reason: RejectReason::RepositoryMismatch,
            }
        );
    }

    #[test]
    fn test_open_mode_skips_signature() {
        let config = VerifierConfig::new(None, "demo");
        let req = request(PUSH_EVENT, Some(""), BODY.as_bytes());
        assert_eq!(
            GithubVerifier::new(&config, &req).verify(),
            VerificationOutcome::Accepted
        );
    }
}
