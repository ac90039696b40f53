use axum::{
    Json,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Body of the 404 returned for a well-formed but unsupported locale subdomain
pub const UNSUPPORTED_LOCALE_BODY: &str = "Not found (unsupported locale).\n";

/// Locale negotiation error
///
/// Construction-time problems (bad tags, inconsistent locale sets, bad TLD
/// length) and the two request-time failures the middleware can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    // Configuration errors 1xxx
    #[error("Invalid locale tag: {0:?}")]
    InvalidLocale(String),

    #[error("Default locale {locale} is not one of the available locales")]
    DefaultLocaleUnavailable { locale: String },

    #[error("No available locales configured")]
    NoAvailableLocales,

    #[error("TLD length must be at least 1, got {0}")]
    InvalidTldLength(usize),

    // Request errors 2xxx
    #[error("Unsupported locale: {code}")]
    UnsupportedLocale { code: String },

    #[error("Invalid redirect target: {0}")]
    InvalidRedirectTarget(String),

    // Wiring errors 5xxx
    #[error("Locale middleware is not installed for this route")]
    MissingLocale,
}

impl LocaleError {
    pub fn invalid_locale(tag: impl Into<String>) -> Self {
        Self::InvalidLocale(tag.into())
    }

    pub fn default_locale_unavailable(locale: impl Into<String>) -> Self {
        Self::DefaultLocaleUnavailable { locale: locale.into() }
    }

    pub fn unsupported_locale(code: impl Into<String>) -> Self {
        Self::UnsupportedLocale { code: code.into() }
    }

    pub fn error_code(&self) -> i32 {
        match self {
            Self::InvalidLocale(_) => 1001,
            Self::DefaultLocaleUnavailable { .. } => 1002,
            Self::NoAvailableLocales => 1003,
            Self::InvalidTldLength(_) => 1004,

            Self::UnsupportedLocale { .. } => 2001,
            Self::InvalidRedirectTarget(_) => 2002,

            Self::MissingLocale => 5001,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedLocale { .. } => StatusCode::NOT_FOUND,
            Self::InvalidRedirectTarget(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocaleErrorResponse {
    pub code: i32,
    pub message: String,
}

impl IntoResponse for LocaleError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // The unsupported-locale 404 is user-facing and has a fixed plain-text body
        if let Self::UnsupportedLocale { .. } = self {
            return (status, [(CONTENT_TYPE, "text/plain")], UNSUPPORTED_LOCALE_BODY)
                .into_response();
        }

        let response = LocaleErrorResponse { code: self.error_code(), message: self.to_string() };
        (status, Json(response)).into_response()
    }
}

pub type LocaleResult<T> = Result<T, LocaleError>;
