//! Gitee webhooks.
//!
//! Gitee signs `"{timestamp}\n{secret}"` with HMAC-SHA256 and sends the
//! base64 digest as the token. The millisecond timestamp travels in its own
//! header and must be within an hour of local time.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use super::outcome::{RejectReason, StepResult};
use super::request::HookRequest;
use super::selector::Provider;
use super::signature::verify_gitee_signature;
use super::verifier::{check_body, check_common_headers, HeaderSpec, HookVerifier, VerifierConfig};

pub const EVENT_HEADER: &str = "X-Gitee-Event";
pub const TOKEN_HEADER: &str = "X-Gitee-Token";
pub const TIMESTAMP_HEADER: &str = "X-Gitee-Timestamp";
pub const PUSH_EVENT: &str = "Push Hook";

/// Largest accepted distance between the request timestamp and now.
pub const TIMESTAMP_LIMIT_MS: u64 = 3_600_000;

const HEADERS: HeaderSpec = HeaderSpec {
    event: EVENT_HEADER,
    event_value: PUSH_EVENT,
    signature: TOKEN_HEADER,
};

pub struct GiteeVerifier<'a> {
    config: &'a VerifierConfig,
    request: &'a HookRequest,
    now_ms: u64,
}

impl<'a> GiteeVerifier<'a> {
    pub fn new(config: &'a VerifierConfig, request: &'a HookRequest) -> Self {
        Self::at(config, request, current_millis())
    }

    /// Verifier that judges the timestamp against `now_ms` instead of the clock.
    pub fn at(config: &'a VerifierConfig, request: &'a HookRequest, now_ms: u64) -> Self {
        Self {
            config,
            request,
            now_ms,
        }
    }

    fn check_timestamp(&self) -> StepResult {
        let raw = self.request.header(TIMESTAMP_HEADER).unwrap_or("");
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            warn!(header = TIMESTAMP_HEADER, value = %raw, "hook_timestamp_invalid");
            return Err(RejectReason::MissingHeader);
        }

        let timestamp: u64 = match raw.parse() {
            Ok(t) => t,
            Err(_) => {
                warn!(header = TIMESTAMP_HEADER, value = %raw, "hook_timestamp_invalid");
                return Err(RejectReason::TimestampOutOfRange);
            }
        };

        let age = self.now_ms.abs_diff(timestamp);
        if age > TIMESTAMP_LIMIT_MS {
            warn!(
                request_time = timestamp,
                current_time = self.now_ms,
                age_ms = age,
                max_age_ms = TIMESTAMP_LIMIT_MS,
                "hook_timestamp_stale"
            );
            return Err(RejectReason::TimestampOutOfRange);
        }

        Ok(())
    }
}

impl HookVerifier for GiteeVerifier<'_> {
    fn provider(&self) -> Provider {
        Provider::Gitee
    }

    fn header_check(&self) -> StepResult {
        if !self.request.has_header(TIMESTAMP_HEADER) {
            warn!(header = TIMESTAMP_HEADER, "hook_timestamp_header_missing");
            return Err(RejectReason::MissingHeader);
        }
        check_common_headers(&HEADERS, self.request, self.config)?;
        self.check_timestamp()
    }

    fn signature(&self) -> StepResult {
        let Some(secret) = self.config.shared_secret.as_deref() else {
            return Ok(());
        };

        let timestamp = self.request.header(TIMESTAMP_HEADER).unwrap_or("");
        let token = self.request.header(TOKEN_HEADER).unwrap_or("");

        if verify_gitee_signature(secret, timestamp, token) {
            Ok(())
        } else {
            warn!(
                header = TOKEN_HEADER,
                actual_length = token.len(),
                "hook_signature_mismatch"
            );
            Err(RejectReason::BadSignature)
        }
    }

    fn body_filter(&self) -> StepResult {
        check_body(self.request, self.config)
    }
}

fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
