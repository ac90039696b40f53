pub mod demo;

use axum::{Router, middleware::from_fn_with_state, routing::get};

use crate::middleware::{LocaleState, locale_middleware};

/// Demo routes behind the locale middleware
pub fn router(state: LocaleState) -> Router {
    Router::new()
        .route("/", get(demo::index))
        .route("/locale", get(demo::locale_info))
        .layer(from_fn_with_state(state.clone(), locale_middleware))
        .with_state(state)
}
