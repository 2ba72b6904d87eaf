//! Security headers for the HTML site.
//!
//! Set only when a handler did not set its own value. HSTS is sent in
//! production only, so local http:// development keeps working.

use axum::Router;
use axum::http::header::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::AppEnv;

pub fn apply(router: Router, app_env: AppEnv) -> Router {
    let router = router
        // Embedding is allowed on our own origin only (course previews).
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("content-security-policy"),
            HeaderValue::from_static("frame-ancestors 'self'"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        // Redirect targets carry the requested path; keep it same-origin.
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    if app_env.is_production() {
        router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("strict-transport-security"),
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        ))
    } else {
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use tower::ServiceExt;

    fn site() -> Router {
        Router::new()
            .route("/", get(|| async { "home" }))
            .route(
                "/embed",
                get(|| async {
                    (
                        [("content-security-policy", "frame-ancestors *")],
                        "embed",
                    )
                }),
            )
    }

    async fn get_headers(router: Router, path: &str) -> axum::http::HeaderMap {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        router.oneshot(request).await.unwrap().headers().clone()
    }

    #[tokio::test]
    async fn hsts_only_in_production() {
        let dev = get_headers(apply(site(), AppEnv::Development), "/").await;
        assert!(dev.get("strict-transport-security").is_none());
        assert_eq!(dev.get("x-content-type-options").unwrap(), "nosniff");

        let prod = get_headers(apply(site(), AppEnv::Production), "/").await;
        assert!(prod.get("strict-transport-security").is_some());
    }

    #[tokio::test]
    async fn handler_values_are_kept() {
        let headers = get_headers(apply(site(), AppEnv::Development), "/embed").await;
        assert_eq!(headers.get("content-security-policy").unwrap(), "frame-ancestors *");
    }
}
