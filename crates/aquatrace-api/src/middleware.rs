//! Request-scoped helpers shared by the handlers
use aquatrace_core::CallerIdentity;
use axum::http::HeaderMap;

pub const CALLER_ID_HEADER: &str = "x-caller-id";
pub const CALLER_ORG_HEADER: &str = "x-caller-org";

const ANONYMOUS: &str = "anonymous";
const UNKNOWN_ORG: &str = "UNKNOWN_ORG";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Caller identity from the request headers. Identities are opaque; nothing
/// here authenticates them.
pub fn caller_identity(headers: &HeaderMap) -> CallerIdentity {
    CallerIdentity::new(
        header(headers, CALLER_ID_HEADER).unwrap_or(ANONYMOUS),
        header(headers, CALLER_ORG_HEADER).unwrap_or(UNKNOWN_ORG),
    )
}
