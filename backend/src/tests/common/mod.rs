// Common test utilities and helpers

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::Path,
    http::{Request, Response},
    middleware::from_fn_with_state,
    routing::get,
};
use tower::ServiceExt;

use crate::middleware::{LocaleState, locale_middleware};
use crate::models::ResolvedLocale;
use crate::services::LocaleNegotiator;
use crate::utils::{LocaleCatalog, LocaleSet, StaticCatalog, request_locale};

/// Catalog serving en (default), fr and de
pub fn create_test_catalog() -> Arc<StaticCatalog> {
    let locales = LocaleSet::parse("en", &["en", "fr", "de"]).expect("Failed to build locale set");
    Arc::new(StaticCatalog::new(locales))
}

/// Router with a `/page` route that echoes every view of the locale:
/// `<extension>|<task-local>|<catalog current>`
///
/// `/slow/:ms` sleeps for `ms` milliseconds and then echoes the same way.
pub fn create_test_app(catalog: Arc<StaticCatalog>, subdomain_routing: bool) -> Router {
    let negotiator = LocaleNegotiator::new(catalog.clone())
        .with_subdomain_routing(subdomain_routing)
        .with_tld_length(1)
        .expect("Failed to set TLD length");
    let state = LocaleState::new(negotiator);

    let echo_catalog = catalog.clone();
    let slow_catalog = catalog.clone();
    Router::new()
        .route(
            "/page",
            get(move |ResolvedLocale(locale): ResolvedLocale| {
                let catalog = echo_catalog.clone();
                async move {
                    let task_local = request_locale().map(|l| l.to_string()).unwrap_or_default();
                    format!("{}|{}|{}", locale, task_local, catalog.current_locale())
                }
            }),
        )
        .route(
            "/slow/:ms",
            get(move |Path(ms): Path<u64>, ResolvedLocale(locale): ResolvedLocale| {
                let catalog = slow_catalog.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    let task_local = request_locale().map(|l| l.to_string()).unwrap_or_default();
                    format!("{}|{}|{}", locale, task_local, catalog.current_locale())
                }
            }),
        )
        .layer(from_fn_with_state(state, locale_middleware))
}

pub fn build_request(host: &str, path: &str, accept_language: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path).header("host", host);
    if let Some(value) = accept_language {
        builder = builder.header("accept-language", value);
    }
    builder.body(Body::empty()).expect("Failed to build request")
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("Router is infallible")
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
