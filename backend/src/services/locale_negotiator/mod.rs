//! Locale Negotiator
//!
//! Decides, for one request, which locale governs the response and whether
//! the request may be served where it is.
//!
//! # Architecture
//! ```text
//! ┌──────────────────────┐
//! │   LocaleNegotiator   │  ← negotiate()
//! └──────────┬───────────┘
//!            │
//!    ┌───────┴────────┐
//!    ▼                ▼
//! ┌──────────┐  ┌─────────────────┐
//! │ Resolver │  │ SubdomainRouter │  (subdomain routing only)
//! └────┬─────┘  └─────────────────┘
//!      ▼
//! ┌────────────────┐
//! │ accept_language│
//! └────────────────┘
//! ```
//!
//! Without subdomain routing every request is forwarded with the locale
//! negotiated from `Accept-Language`. With it, the host's leading label is
//! consulted first and non-canonical requests are redirected.

pub mod accept_language;
pub mod iso639;
pub mod resolver;
pub mod router;

use std::sync::Arc;

pub use accept_language::{parse_accept_language, parse_quality, rank_preferred_languages};
pub use iso639::is_iso_639_1_code;
pub use resolver::{
    SubdomainLocale, locale_from_accept_language, locale_from_ranges, locale_from_subdomain,
};
pub use router::{
    CanonicalUrls, DEFAULT_TLD_LENGTH, RouteDecision, SubdomainRouter, set_tld_length, tld_length,
};

use crate::models::{Locale, RequestUrl};
use crate::utils::{LocaleCatalog, LocaleResult};

/// What the middleware should do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Negotiation {
    /// Serve the request downstream in this locale
    Forward(Locale),
    /// Send the client to the canonical URL for `locale`
    Redirect { locale: Locale, location: String },
    /// The host names a language code the catalog does not serve
    NotFound { code: String },
}

pub struct LocaleNegotiator {
    catalog: Arc<dyn LocaleCatalog>,
    subdomain_routing: bool,
    router: Option<SubdomainRouter>,
}

impl LocaleNegotiator {
    /// Header-only negotiator
    pub fn new(catalog: Arc<dyn LocaleCatalog>) -> Self {
        Self { catalog, subdomain_routing: false, router: None }
    }

    pub fn with_subdomain_routing(mut self, enabled: bool) -> Self {
        self.subdomain_routing = enabled;
        self
    }

    /// Pin the TLD length for this negotiator instead of reading the
    /// process-wide value on each request
    pub fn with_tld_length(mut self, tld_length: usize) -> LocaleResult<Self> {
        self.router = Some(SubdomainRouter::with_tld_length(tld_length)?);
        Ok(self)
    }

    pub fn catalog(&self) -> &Arc<dyn LocaleCatalog> {
        &self.catalog
    }

    pub fn subdomain_routing(&self) -> bool {
        self.subdomain_routing
    }

    /// Locale for an optional `Accept-Language` value
    pub fn negotiate_by_header(&self, accept_language: Option<&str>) -> Locale {
        let locales = self.catalog.locales();
        match accept_language {
            Some(field) => locale_from_accept_language(field, locales),
            None => locales.default_locale().clone(),
        }
    }

    pub fn negotiate(&self, request: &RequestUrl, accept_language: Option<&str>) -> Negotiation {
        if !self.subdomain_routing {
            return Negotiation::Forward(self.negotiate_by_header(accept_language));
        }

        let locales = self.catalog.locales();
        let locale = match locale_from_subdomain(request.host(), locales) {
            SubdomainLocale::Unsupported(code) => return Negotiation::NotFound { code },
            SubdomainLocale::Supported(locale) => locale,
            SubdomainLocale::NotLocalized => self.negotiate_by_header(accept_language),
        };

        match self.router().route(request, &locale, locales) {
            RouteDecision::Canonical => Negotiation::Forward(locale),
            RouteDecision::Redirect(location) => Negotiation::Redirect { locale, location },
        }
    }

    fn router(&self) -> SubdomainRouter {
        self.router.unwrap_or_else(SubdomainRouter::current)
    }
}
