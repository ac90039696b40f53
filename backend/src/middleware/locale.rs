//! Locale negotiation middleware
//!
//! Resolves the request's locale, then either forwards the request with the
//! locale bound or short-circuits with a redirect / 404.
//!
//! On forward the locale is made available through the `ResolvedLocale`
//! request extension (and extractor) and the task-local `request_locale()`,
//! which is also what the catalog reports as its current locale for the
//! duration of the downstream call. Leaving the scope restores the previous
//! value on every exit path, and nothing process-wide is written, so
//! overlapping requests stay isolated. The response always carries
//! `Content-Language`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE, CONTENT_TYPE, LOCATION},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::models::{Locale, RequestUrl, ResolvedLocale};
use crate::services::{LocaleNegotiator, Negotiation};
use crate::utils::{LocaleError, with_request_locale};

#[derive(Clone)]
pub struct LocaleState {
    pub negotiator: Arc<LocaleNegotiator>,
}

impl LocaleState {
    pub fn new(negotiator: LocaleNegotiator) -> Self {
        Self { negotiator: Arc::new(negotiator) }
    }
}

/// Locale negotiation middleware
/// 1. Classify the host (subdomain routing only): 404 on an unsupported code
/// 2. Otherwise negotiate from `Accept-Language`
/// 3. Redirect to the canonical URL if needed (subdomain routing only)
/// 4. Forward with the locale bound and tag the response
pub async fn locale_middleware(
    State(state): State<LocaleState>,
    req: Request,
    next: Next,
) -> Response {
    let request_url = RequestUrl::from_http(req.uri(), req.headers());
    let accept_language = joined_accept_language(req.headers());

    match state.negotiator.negotiate(&request_url, accept_language.as_deref()) {
        Negotiation::NotFound { code } => {
            tracing::debug!("Unsupported locale subdomain {} for {}", code, request_url.url());
            LocaleError::unsupported_locale(code).into_response()
        },
        Negotiation::Redirect { locale, location } => {
            tracing::debug!("Redirecting {} to {} for locale {}", request_url.url(), location, locale);
            redirect_response(&locale, &location)
        },
        Negotiation::Forward(locale) => {
            tracing::debug!("Forwarding {} with locale {}", request_url.url(), locale);
            forward(locale, req, next).await
        },
    }
}

/// All `Accept-Language` values joined into one list
///
/// Repeated headers are equivalent to a single comma-separated one. Values
/// that are not visible ASCII are skipped.
fn joined_accept_language(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> =
        headers.get_all(ACCEPT_LANGUAGE).iter().filter_map(|value| value.to_str().ok()).collect();
    (!values.is_empty()).then(|| values.join(", "))
}

async fn forward(locale: Locale, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(ResolvedLocale(locale.clone()));

    let mut response = with_request_locale(locale.clone(), next.run(req)).await;

    match HeaderValue::from_str(locale.as_str()) {
        Ok(value) => {
            response.headers_mut().insert(CONTENT_LANGUAGE, value);
        },
        Err(err) => tracing::warn!("Cannot encode Content-Language {}: {}", locale, err),
    }

    response
}

fn redirect_response(locale: &Locale, location: &str) -> Response {
    let Ok(location_value) = HeaderValue::from_str(location) else {
        tracing::warn!("Redirect target is not a valid header value: {:?}", location);
        return LocaleError::InvalidRedirectTarget(location.to_string()).into_response();
    };

    let body = format!("Redirecting for language {}...\n", locale);
    let mut response = (StatusCode::FOUND, [(CONTENT_TYPE, "text/plain")], body).into_response();
    response.headers_mut().insert(LOCATION, location_value);
    response
}

#[async_trait]
impl<S> FromRequestParts<S> for ResolvedLocale
where
    S: Send + Sync,
{
    type Rejection = LocaleError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ResolvedLocale>().cloned().ok_or_else(|| {
            tracing::warn!("ResolvedLocale requested on {} without locale middleware", parts.uri);
            LocaleError::MissingLocale
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_redirect_response_shape() {
        let locale = Locale::parse("fr").unwrap();
        let response = redirect_response(&locale, "http://fr.example.com/page");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[LOCATION], "http://fr.example.com/page");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Redirecting for language fr...\n");
    }

    #[test]
    fn test_accept_language_joins_repeated_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(joined_accept_language(&headers), None);

        headers.append(ACCEPT_LANGUAGE, HeaderValue::from_static("ja"));
        headers.append(ACCEPT_LANGUAGE, HeaderValue::from_static("de;q=0.9"));
        assert_eq!(joined_accept_language(&headers).as_deref(), Some("ja, de;q=0.9"));
    }

    #[test]
    fn test_redirect_response_rejects_invalid_location() {
        let locale = Locale::parse("fr").unwrap();
        let response = redirect_response(&locale, "http://fr.example.com/\n");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
