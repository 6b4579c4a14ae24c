//! Picks the provider a delivery came from.
//!
//! A provider is recognised when any header name contains its namespace
//! token (`x-github`, `x-gitee`, `x-codeup`). When several providers match,
//! the fixed order of [`Provider::ALL`] decides, never header order.

use std::fmt;

use axum::http::HeaderMap;
use tracing::{info, warn};

use super::codeup::CodeupVerifier;
use super::gitee::GiteeVerifier;
use super::github::GithubVerifier;
use super::request::HookRequest;
use super::verifier::{HookVerifier, VerifierConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GitHub,
    Gitee,
    Codeup,
}

impl Provider {
    /// Selection priority.
    pub const ALL: [Provider; 3] = [Provider::GitHub, Provider::Gitee, Provider::Codeup];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::Gitee => "gitee",
            Provider::Codeup => "codeup",
        }
    }

    /// Lowercase fragment that marks this provider's header names.
    fn header_token(&self) -> &'static str {
        match self {
            Provider::GitHub => "x-github",
            Provider::Gitee => "x-gitee",
            Provider::Codeup => "x-codeup",
        }
    }

    fn matches(&self, headers: &HeaderMap) -> bool {
        // HeaderName is always stored lowercase.
        headers
            .keys()
            .any(|name| name.as_str().contains(self.header_token()))
    }

    /// Build this provider's verifier for one request.
    pub fn verifier<'a>(
        &self,
        config: &'a VerifierConfig,
        request: &'a HookRequest,
    ) -> Box<dyn HookVerifier + 'a> {
        match self {
            Provider::GitHub => Box::new(GithubVerifier::new(config, request)),
            Provider::Gitee => Box::new(GiteeVerifier::new(config, request)),
            Provider::Codeup => Box::new(CodeupVerifier::new(config, request)),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identify the provider from header names. `None` when nothing matches.
pub fn select_provider(headers: &HeaderMap) -> Option<Provider> {
    let matched: Vec<Provider> = Provider::ALL
        .into_iter()
        .filter(|p| p.matches(headers))
        .collect();

    match matched.as_slice() {
        [] => {
            warn!(
                header_names = ?headers.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
                "hook_provider_unknown"
            );
            None
        }
        [only] => {
            info!(provider = %only, "hook_provider_selected");
            Some(*only)
        }
        [first, ..] => {
            warn!(
                provider = %first,
                candidates = ?matched.iter().map(Provider::as_str).collect::<Vec<_>>(),
                "hook_provider_ambiguous"
            );
            Some(*first)
        }
    }
}
