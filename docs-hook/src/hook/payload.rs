//! Push-event payload correlation.
//!
//! All three providers send the same push shape for the fields we care
//! about: a `repository` object and an optional `commits` list.

use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use super::outcome::{RejectReason, StepResult};
use super::request::HookRequest;

/// The subset of a push payload used to correlate and log a delivery.
#[derive(Debug, Deserialize)]
pub struct PushPayload {
    pub repository: RepositoryInfo,
    /// Logged only; any shape is accepted.
    #[serde(default)]
    pub commits: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub url: String,
    /// Only GitHub reports this.
    #[serde(default)]
    pub size: Option<Value>,
}

/// One pushed commit, kept for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub timestamp: String,
    pub message: String,
}

impl CommitSummary {
    fn from_value(commit: &Value) -> Self {
        Self {
            timestamp: render(commit.get("timestamp")),
            message: render(commit.get("message")),
        }
    }
}

impl PushPayload {
    /// Interpret an already parsed JSON body.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        PushPayload::deserialize(value)
    }

    /// Commits in push order. Entries of unexpected shape are rendered as text.
    pub fn commit_summaries(&self) -> Vec<CommitSummary> {
        match &self.commits {
            Some(Value::Array(commits)) => commits.iter().map(CommitSummary::from_value).collect(),
            _ => Vec::new(),
        }
    }
}

fn render(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Parse the body, check the repository name, and log the pushed commits.
///
/// Empty, non-JSON and structurally wrong bodies all reject with
/// [`RejectReason::MalformedBody`].
pub fn filter_push_body(request: &HookRequest, expected_repo: &str) -> StepResult {
    let value = match request.json() {
        Some(v) if !is_empty_json(v) => v,
        _ => {
            error!(body_length = request.raw_body().len(), "hook_body_empty");
            return Err(RejectReason::MalformedBody);
        }
    };

    let payload = match PushPayload::from_value(value) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "hook_body_filter_error");
            return Err(RejectReason::MalformedBody);
        }
    };

    let repository = &payload.repository;
    if repository.name != expected_repo {
        error!(
            name = %repository.name,
            local = %expected_repo,
            "hook_repository_mismatch"
        );
        return Err(RejectReason::RepositoryMismatch);
    }

    match &repository.size {
        Some(size) => info!(
            name = %repository.name,
            url = %repository.url,
            size = %size,
            "hook_repository_matched"
        ),
        None => info!(
            name = %repository.name,
            url = %repository.url,
            "hook_repository_matched"
        ),
    }

    log_commits(&payload.commit_summaries());

    Ok(())
}

fn log_commits(commits: &[CommitSummary]) {
    if commits.is_empty() {
        return;
    }

    info!(count = commits.len(), "hook_commits_received");
    for (i, commit) in commits.iter().enumerate() {
        info!(
            index = i + 1,
            time = %commit.timestamp,
            content = %commit.message,
            "hook_commit"
        );
    }
}

/// `null`, `{}`, `[]`, `""`, `0` and `false` carry nothing to correlate.
fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
