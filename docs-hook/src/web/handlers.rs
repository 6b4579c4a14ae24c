//! Webhook endpoint handlers.
//!
//! The docs endpoint runs the cheap checks first:
//! 1. Pick the provider from header names
//! 2. Header check, signature, body filter
//! 3. Update the checkout and regenerate the site
//!
//! Unauthenticated or malformed deliveries never reach step 3.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::build::{BuildError, BuildTrigger};
use crate::hook::{select_provider, HookRequest, Stage, VerificationOutcome, VerifierConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub verifier_config: Arc<VerifierConfig>,
    pub trigger: Arc<dyn BuildTrigger>,
}

impl AppState {
    pub fn new(verifier_config: VerifierConfig, trigger: Arc<dyn BuildTrigger>) -> Self {
        Self {
            verifier_config: Arc::new(verifier_config),
            trigger,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Docs Webhook
// =============================================================================

/// Body of every docs webhook response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HookResponse {
    pub message: String,
}

pub const MSG_HEADERS_ERROR: &str = "headers error!";
pub const MSG_AUTH_ERROR: &str = "hook auth error!";
pub const MSG_BODY_ERROR: &str = "body error!";
pub const MSG_REPO_ERROR: &str = "repo error!";
pub const MSG_DOC_ERROR: &str = "doc error!";
pub const MSG_SUCCESS: &str = "success";

fn reply(status: StatusCode, message: &str) -> (StatusCode, Json<HookResponse>) {
    (
        status,
        Json(HookResponse {
            message: message.to_string(),
        }),
    )
}

/// Status and message for a verification outcome; `None` once accepted.
pub fn rejection_response(outcome: &VerificationOutcome) -> Option<(StatusCode, &'static str)> {
    match outcome {
        VerificationOutcome::Accepted => None,
        VerificationOutcome::Rejected { stage, .. } => {
            let message = match stage {
                Stage::Headers => MSG_HEADERS_ERROR,
                Stage::Signature => MSG_AUTH_ERROR,
                Stage::Body => MSG_BODY_ERROR,
            };
            Some((StatusCode::BAD_REQUEST, message))
        }
    }
}

/// Docs webhook endpoint (`POST /api/docs`).
pub async fn docs_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    info!(
        body_length = body.len(),
        header_count = headers.len(),
        "docs_webhook_received"
    );

    let Some(provider) = select_provider(&headers) else {
        return reply(StatusCode::BAD_REQUEST, MSG_HEADERS_ERROR);
    };

    let request = HookRequest::new(headers, body);
    let outcome = provider
        .verifier(&state.verifier_config, &request)
        .verify();

    if let Some((status, message)) = rejection_response(&outcome) {
        if let VerificationOutcome::Rejected { stage, reason } = outcome {
            warn!(
                provider = %provider,
                stage = ?stage,
                reason = %reason,
                "docs_webhook_rejected"
            );
        }
        return reply(status, message);
    }

    info!(provider = %provider, "docs_webhook_verified");

    // Own task: a client hanging up must not cancel a rebuild halfway.
    let trigger = Arc::clone(&state.trigger);
    let rebuilt = match tokio::spawn(async move { trigger.rebuild().await }).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "docs_webhook_rebuild_panicked");
            return reply(StatusCode::INTERNAL_SERVER_ERROR, MSG_DOC_ERROR);
        }
    };

    match rebuilt {
        Ok(()) => {
            info!(provider = %provider, "docs_webhook_rebuilt");
            reply(StatusCode::CREATED, MSG_SUCCESS)
        }
        Err(BuildError::Repository(e)) => {
            error!(command = %e.command(), error = %e, "docs_webhook_repo_error");
            reply(StatusCode::INTERNAL_SERVER_ERROR, MSG_REPO_ERROR)
        }
        Err(BuildError::Generator(e)) => {
            error!(command = %e.command(), error = %e, "docs_webhook_doc_error");
            reply(StatusCode::INTERNAL_SERVER_ERROR, MSG_DOC_ERROR)
        }
    }
}
