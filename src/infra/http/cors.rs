//! Cross-origin access to the public listener.

use std::time::Duration;

use axum::{
    Router,
    http::{
        HeaderName, Method,
        header::{ETAG, IF_NONE_MATCH},
    },
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use crate::config::AllowOrigins;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(600);

/// Wrap `router` in a read-only CORS layer unless CORS is disabled.
///
/// Browsers may send `If-None-Match` and read `ETag`, so conditional reads
/// work cross-origin.
pub fn with_cors(router: Router, origins: &AllowOrigins) -> Router {
    let allow_origin = match origins {
        AllowOrigins::Disabled => return router,
        AllowOrigins::Any => {
            info!("CORS: allowing any origin");
            AllowOrigin::any()
        }
        AllowOrigins::List(list) => {
            info!(origins = ?list, "CORS: allowing listed origins");
            AllowOrigin::list(list.iter().cloned())
        }
    };

    let layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::HEAD])
        .allow_headers([IF_NONE_MATCH])
        .expose_headers([ETAG, HeaderName::from_static("x-request-id")])
        .max_age(PREFLIGHT_MAX_AGE);

    router.layer(layer)
}
