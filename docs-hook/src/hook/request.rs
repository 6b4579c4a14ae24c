//! Immutable view of an inbound webhook request.

use std::sync::OnceLock;

use axum::body::Bytes;
use axum::http::HeaderMap;
use serde_json::Value;

/// Headers, raw body and a lazily parsed JSON body of one delivery.
///
/// Header lookups are case-insensitive. The raw body is kept byte-exact so
/// HMAC verification never sees re-serialized JSON.
#[derive(Debug)]
pub struct HookRequest {
    headers: HeaderMap,
    raw_body: Bytes,
    json_body: OnceLock<Option<Value>>,
}

impl HookRequest {
    pub fn new(headers: HeaderMap, raw_body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            raw_body: raw_body.into(),
            json_body: OnceLock::new(),
        }
    }

    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    /// Header value as text. Non-UTF-8 values count as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Parsed JSON body, or `None` when the body is empty or not JSON.
    /// Parsing happens at most once.
    pub fn json(&self) -> Option<&Value> {
        self.json_body
            .get_or_init(|| {
                if self.raw_body.is_empty() {
                    None
                } else {
                    serde_json::from_slice(&self.raw_body).ok()
                }
            })
            .as_ref()
    }
}
