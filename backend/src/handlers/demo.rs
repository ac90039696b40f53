use axum::{Json, extract::State};
use rust_i18n::t;
use serde::Serialize;

use crate::middleware::LocaleState;
use crate::models::{Locale, ResolvedLocale};
use crate::utils::request_locale;

/// Greeting in the negotiated locale
pub async fn index(ResolvedLocale(locale): ResolvedLocale) -> String {
    let locale = locale.to_string();
    tracing::debug!("Rendering greeting for locale {}", locale);
    format!("{}\n", t!("demo.greeting", locale = &locale))
}

#[derive(Debug, Serialize)]
pub struct LocaleInfo {
    pub resolved: Locale,
    pub request_local: Option<Locale>,
    pub catalog_current: Locale,
    pub default: Locale,
    pub available: Vec<Locale>,
}

/// Negotiation result as seen from a handler
pub async fn locale_info(
    State(state): State<LocaleState>,
    ResolvedLocale(locale): ResolvedLocale,
) -> Json<LocaleInfo> {
    let catalog = state.negotiator.catalog();
    Json(LocaleInfo {
        resolved: locale,
        request_local: request_locale(),
        catalog_current: catalog.current_locale(),
        default: catalog.default_locale().clone(),
        available: catalog.available_locales().to_vec(),
    })
}
