//! Codeup webhooks: the shared secret is sent verbatim as a token header.

use tracing::warn;

use super::outcome::{RejectReason, StepResult};
use super::request::HookRequest;
use super::selector::Provider;
use super::signature::constant_time_compare;
use super::verifier::{check_body, check_common_headers, HeaderSpec, HookVerifier, VerifierConfig};

pub const EVENT_HEADER: &str = "X-Codeup-Event";
pub const TOKEN_HEADER: &str = "X-Codeup-Token";
pub const PUSH_EVENT: &str = "Push Hook";

const HEADERS: HeaderSpec = HeaderSpec {
    event: EVENT_HEADER,
    event_value: PUSH_EVENT,
    signature: TOKEN_HEADER,
};

pub struct CodeupVerifier<'a> {
    config: &'a VerifierConfig,
    request: &'a HookRequest,
}

impl<'a> CodeupVerifier<'a> {
    pub fn new(config: &'a VerifierConfig, request: &'a HookRequest) -> Self {
        Self { config, request }
    }
}

impl HookVerifier for CodeupVerifier<'_> {
    fn provider(&self) -> Provider {
        Provider::Codeup
    }

    fn header_check(&self) -> StepResult {
        check_common_headers(&HEADERS, self.request, self.config)
    }

    fn signature(&self) -> StepResult {
        let Some(secret) = self.config.shared_secret.as_deref() else {
            return Ok(());
        };

        let token = self.request.header(TOKEN_HEADER).unwrap_or("");
        if constant_time_compare(secret, token) {
            Ok(())
        } else {
            warn!(header = TOKEN_HEADER, token_length = token.len(), "hook_token_mismatch");
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
    use crate::hook::outcome::VerificationOutcome;
    use axum::http::{HeaderMap, HeaderValue};

    const BODY: &str = r#"{"repository":{"name":"demo","url":"u"},"commits":[{"timestamp":"2024-01-01T00:00:00+08:00","message":"docs"}]}"#;

    fn request(event: Option<&str>, token: Option<&str>, body: &str) -> HookRequest {
        let mut headers = HeaderMap::new();
        if let Some(event) = event {
            headers.insert(EVENT_HEADER, HeaderValue::from_str(event).unwrap());
        }
        if let Some(token) = token {
            headers.insert(TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
        }
        HookRequest::new(headers, body.as_bytes().to_vec())
    }

    fn secret_config() -> VerifierConfig {
        VerifierConfig::new(Some("abc".to_string()), "demo")
    }

    fn open_config() -> VerifierConfig {
        VerifierConfig::new(None, "demo")
    }

    #[test]
    fn test_header_check_requires_push_event() {
        let config = secret_config();
        for event in [None, Some("Tag Push Hook"), Some("push"), Some("")] {
            let req = request(event, Some("abc"), BODY);
            assert_eq!(
                CodeupVerifier::new(&config, &req).header_check(),
                Err(RejectReason::MissingHeader),
                "event {:?}",
                event
            );
        }
    }

    #[test]
    fn test_header_check_requires_token_header() {
        let config = open_config();
        let req = request(Some(PUSH_EVENT), None, BODY);
        assert_eq!(
            CodeupVerifier::new(&config, &req).header_check(),
            Err(RejectReason::MissingHeader)
        );
    }

    #[test]
    fn test_header_check_parity() {
        let secret = secret_config();
        let open = open_config();

        let empty_token = request(Some(PUSH_EVENT), Some(""), BODY);
        assert!(CodeupVerifier::new(&secret, &empty_token).header_check().is_err());
        assert!(CodeupVerifier::new(&open, &empty_token).header_check().is_ok());

        let token = request(Some(PUSH_EVENT), Some("abc"), BODY);
        assert!(CodeupVerifier::new(&secret, &token).header_check().is_ok());
        assert!(CodeupVerifier::new(&open, &token).header_check().is_err());
    }

    #[test]
    fn test_signature_compares_token() {
        let config = secret_config();

        let good = request(Some(PUSH_EVENT), Some("abc"), BODY);
        assert_eq!(CodeupVerifier::new(&config, &good).signature(), Ok(()));

        let bad = request(Some(PUSH_EVENT), Some("abd"), BODY);
        assert_eq!(
            CodeupVerifier::new(&config, &bad).signature(),
            Err(RejectReason::BadSignature)
        );
    }

    #[test]
    fn test_signature_open_mode_accepts_anything() {
        let config = open_config();
        for token in [None, Some(""), Some("whatever")] {
            let req = request(Some(PUSH_EVENT), token, BODY);
            assert_eq!(CodeupVerifier::new(&config, &req).signature(), Ok(()));
        }
    }

    #[test]
    fn test_verify_end_to_end() {
        let config = secret_config();
        let req = request(Some(PUSH_EVENT), Some("abc"), BODY);
        let verifier = CodeupVerifier::new(&config, &req);
        assert_eq!(verifier.provider(), Provider::Codeup);
        assert_eq!(verifier.verify(), VerificationOutcome::Accepted);
    }
}
