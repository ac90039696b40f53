//! Locale negotiation and locale-subdomain routing for axum
//!
//! The [`middleware::locale_middleware`] picks a locale for every request
//! from the host's leading label or the `Accept-Language` header, exposes it
//! to handlers, tags responses with `Content-Language`, and optionally
//! redirects clients to the canonical URL for their locale.

rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use middleware::{LocaleState, locale_middleware};
pub use models::{LanguageRange, Locale, RequestUrl, ResolvedLocale};
pub use services::{LocaleNegotiator, Negotiation, set_tld_length, tld_length};
pub use utils::{
    LocaleCatalog, LocaleError, LocaleResult, LocaleSet, RustI18nCatalog,
    StaticCatalog, request_locale,
};

#[cfg(test)]
mod tests;
