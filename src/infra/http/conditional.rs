//! ETag based conditional GET.

use axum::{
    Json,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::domain::types::Versioned;

pub const CACHE_REVALIDATE: &str = "public, max-age=300, must-revalidate";
pub const CACHE_DAY_PINNED: &str = "public, max-age=31536000, must-revalidate";
pub const CACHE_VOICES: &str = "public, max-age=0, must-revalidate";

/// Whether `If-None-Match` names the version, quoted or bare, weak or strong.
pub fn if_none_match(headers: &HeaderMap, version: i64) -> bool {
    let expected = version.to_string();
    headers
        .get_all(IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| {
            if candidate == "*" {
                return true;
            }
            let candidate = candidate.strip_prefix("W/").unwrap_or(candidate);
            let candidate = candidate
                .strip_prefix('"')
                .and_then(|inner| inner.strip_suffix('"'))
                .unwrap_or(candidate);
            candidate == expected
        })
}

/// Serve the value as a bare JSON body, or `304 Not Modified` when the client
/// already holds it. The version travels only in the `ETag`.
pub fn versioned_response<T: Serialize>(
    headers: &HeaderMap,
    versioned: Versioned<T>,
    cache_control: &'static str,
) -> Response {
    let etag = versioned.etag();
    let mut response = if if_none_match(headers, versioned.version) {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        Json(versioned.value).into_response()
    };

    let response_headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&etag) {
        response_headers.insert(ETAG, value);
    }
    response_headers.insert(CACHE_CONTROL, HeaderValue::from_static(cache_control));
    response
}
