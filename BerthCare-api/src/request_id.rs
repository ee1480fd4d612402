//! Request correlation ids
//!
//! An incoming `x-request-id` is kept as-is. Otherwise the trace-id of a W3C
//! `traceparent` header is reused, and failing that a fresh UUID is issued.

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const TRACEPARENT: &str = "traceparent";

#[derive(Debug, Clone, Copy, Default)]
pub struct TraceparentRequestId;

impl MakeRequestId for TraceparentRequestId {
    fn make_request_id<B>(&mut self, request: &Request<B>) -> Option<RequestId> {
        let id = request
            .headers()
            .get(TRACEPARENT)
            .and_then(|value| value.to_str().ok())
            .and_then(trace_id_from_traceparent)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Extract the trace-id from `version-traceid-parentid-flags`
pub fn trace_id_from_traceparent(value: &str) -> Option<String> {
    let mut parts = value.trim().split('-');
    let version = parts.next()?;
    let trace_id = parts.next()?;
    let parent_id = parts.next()?;
    let flags = parts.next()?;

    let well_formed = is_hex(version, 2)
        && version != "ff"
        && is_hex(trace_id, 32)
        && is_hex(parent_id, 16)
        && is_hex(flags, 2)
        && trace_id.bytes().any(|b| b != b'0');

    well_formed.then(|| trace_id.to_ascii_lowercase())
}

fn is_hex(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_hexdigit())
}
