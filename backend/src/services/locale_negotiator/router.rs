//! Locale subdomain routing
//!
//! Every request has two canonical forms:
//! - the default-locale URL, without a language-code subdomain
//!   (`http://example.com/page`)
//! - the localized URL, with the locale as the leading host label
//!   (`http://fr.example.com/page`)
//!
//! A request already at the canonical form for its locale is forwarded,
//! anything else is redirected there.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::iso639::is_iso_639_1_code;
use crate::models::{Locale, RequestUrl};
use crate::utils::{LocaleError, LocaleResult, LocaleSet};

/// Trailing host labels that make up the bare domain (`example.com` is 1,
/// `example.co.uk` is 2)
pub const DEFAULT_TLD_LENGTH: usize = 1;

static TLD_LENGTH: AtomicUsize = AtomicUsize::new(DEFAULT_TLD_LENGTH);

/// Process-wide TLD length
pub fn tld_length() -> usize {
    TLD_LENGTH.load(Ordering::Relaxed)
}

/// Set the process-wide TLD length
///
/// Call once at startup, before serving traffic. Requests already in flight
/// may observe either value.
pub fn set_tld_length(length: usize) -> LocaleResult<()> {
    if length == 0 {
        return Err(LocaleError::InvalidTldLength(length));
    }
    TLD_LENGTH.store(length, Ordering::Relaxed);
    tracing::info!("TLD length set to {}", length);
    Ok(())
}

/// Whether the request is already at its canonical URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Canonical,
    Redirect(String),
}

/// (default-locale URL, localized URL) for one request and locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrls {
    pub default_locale_url: String,
    pub localized_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdomainRouter {
    tld_length: usize,
}

impl Default for SubdomainRouter {
    fn default() -> Self {
        Self::current()
    }
}

impl SubdomainRouter {
    /// Router using the process-wide TLD length
    pub fn current() -> Self {
        Self { tld_length: tld_length() }
    }

    pub fn with_tld_length(tld_length: usize) -> LocaleResult<Self> {
        if tld_length == 0 {
            return Err(LocaleError::InvalidTldLength(tld_length));
        }
        Ok(Self { tld_length })
    }

    pub fn tld_length(&self) -> usize {
        self.tld_length
    }

    /// URL without a language-code subdomain
    ///
    /// The leading label is only removed when the host has more labels than
    /// the bare domain and that label is an ISO-639-1 code. A host with
    /// nothing removable yields the request URL unchanged.
    pub fn default_locale_url(&self, request: &RequestUrl) -> String {
        let mut labels = request.host_labels();
        if labels.len() <= self.tld_length + 1 {
            return request.url();
        }

        if is_iso_639_1_code(labels[0]) {
            labels.remove(0);
        }

        request.url_with_host(&labels.join("."))
    }

    /// URL with `locale` as the leading host label
    ///
    /// A leading `www` or available-locale label is replaced rather than
    /// prefixed.
    pub fn localized_url(&self, request: &RequestUrl, locale: &Locale, locales: &LocaleSet) -> String {
        // Hosts are compared lower-cased
        let locale_label = locale.as_str().to_ascii_lowercase();

        let mut labels = request.host_labels();
        if labels.first().is_some_and(|label| *label == "www" || locales.contains(label)) {
            labels.remove(0);
        }
        labels.insert(0, locale_label.as_str());

        request.url_with_host(&labels.join("."))
    }

    pub fn canonical_urls(&self, request: &RequestUrl, locale: &Locale, locales: &LocaleSet) -> CanonicalUrls {
        CanonicalUrls {
            default_locale_url: self.default_locale_url(request),
            localized_url: self.localized_url(request, locale, locales),
        }
    }

    /// Decide whether `request` may be served in `locale` as is
    ///
    /// Canonical when the locale is the default and the request is at the
    /// default-locale URL, or when the request is at the localized URL.
    /// Otherwise redirect to the default-locale URL for the default locale
    /// and to the localized URL for any other locale.
    pub fn route(&self, request: &RequestUrl, locale: &Locale, locales: &LocaleSet) -> RouteDecision {
        let url = request.url();
        let urls = self.canonical_urls(request, locale, locales);
        let is_default = locales.is_default(locale);

        if (is_default && url == urls.default_locale_url) || url == urls.localized_url {
            return RouteDecision::Canonical;
        }

        if is_default {
            RouteDecision::Redirect(urls.default_locale_url)
        } else {
            RouteDecision::Redirect(urls.localized_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locales() -> LocaleSet {
        LocaleSet::parse("en", &["en", "fr", "de"]).unwrap()
    }

    fn locale(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    fn router(tld_length: usize) -> SubdomainRouter {
        SubdomainRouter::with_tld_length(tld_length).unwrap()
    }

    fn request(host: &str, port: u16, path: &str) -> RequestUrl {
        RequestUrl::new("http", host, port, path)
    }

    #[test]
    fn test_default_locale_url_strips_language_code() {
        let url = router(1).default_locale_url(&request("fr.example.com", 80, "/page"));
        assert_eq!(url, "http://example.com/page");

        // Unsupported codes are stripped too
        let url = router(1).default_locale_url(&request("ja.example.com", 80, "/"));
        assert_eq!(url, "http://example.com/");
    }

    #[test]
    fn test_default_locale_url_keeps_other_subdomains() {
        let url = router(1).default_locale_url(&request("www.example.com", 80, "/page"));
        assert_eq!(url, "http://www.example.com/page");
    }

    #[test]
    fn test_default_locale_url_without_removable_segment() {
        let url = router(1).default_locale_url(&request("example.com", 8080, "/page?q=1"));
        assert_eq!(url, "http://example.com:8080/page?q=1");

        // With a two-label TLD only the label before example.co.uk is removable
        let url = router(2).default_locale_url(&request("example.co.uk", 80, "/"));
        assert_eq!(url, "http://example.co.uk/");
        let url = router(2).default_locale_url(&request("fr.example.co.uk", 80, "/"));
        assert_eq!(url, "http://example.co.uk/");
    }

    #[test]
    fn test_tld_length_changes_what_is_removable() {
        // Under TLD length 2, "de.co.uk" is a bare domain
        let url = router(2).default_locale_url(&request("de.co.uk", 80, "/"));
        assert_eq!(url, "http://de.co.uk/");
        let url = router(1).default_locale_url(&request("de.co.uk", 80, "/"));
        assert_eq!(url, "http://co.uk/");
    }

    #[test]
    fn test_localized_url() {
        let locales = locales();
        let r = router(1);
        assert_eq!(
            r.localized_url(&request("example.com", 80, "/page"), &locale("fr"), &locales),
            "http://fr.example.com/page"
        );
        assert_eq!(
            r.localized_url(&request("www.example.com", 80, "/page"), &locale("fr"), &locales),
            "http://fr.example.com/page"
        );
        assert_eq!(
            r.localized_url(&request("de.example.com", 8080, "/page"), &locale("fr"), &locales),
            "http://fr.example.com:8080/page"
        );
        assert_eq!(
            r.localized_url(&request("shop.example.com", 80, "/"), &locale("de"), &locales),
            "http://de.shop.example.com/"
        );
    }

    #[test]
    fn test_localized_url_lowercases_locale_label() {
        let locales = LocaleSet::parse("en", &["en", "pt-BR"]).unwrap();
        let url = router(1).localized_url(&request("example.com", 80, "/"), &locale("pt-BR"), &locales);
        assert_eq!(url, "http://pt-br.example.com/");
    }

    #[test]
    fn test_route_localized_request_is_canonical() {
        let decision = router(1).route(&request("fr.example.com", 80, "/page"), &locale("fr"), &locales());
        assert_eq!(decision, RouteDecision::Canonical);
    }

    #[test]
    fn test_route_default_locale_on_bare_domain_is_canonical() {
        let decision = router(1).route(&request("example.com", 80, "/page"), &locale("en"), &locales());
        assert_eq!(decision, RouteDecision::Canonical);
    }

    #[test]
    fn test_route_redirects_to_localized_url() {
        let decision = router(1).route(&request("example.com", 80, "/page"), &locale("fr"), &locales());
        assert_eq!(decision, RouteDecision::Redirect("http://fr.example.com/page".to_string()));
    }

    #[test]
    fn test_route_redirects_default_locale_to_default_url() {
        // www with the default locale stays put, a foreign code goes back to the bare domain
        let decision = router(1).route(&request("www.example.com", 80, "/"), &locale("en"), &locales());
        assert_eq!(decision, RouteDecision::Canonical);

        let https = RequestUrl::new("https", "it.example.com", 443, "/a?b=c");
        let decision = router(1).route(&https, &locale("en"), &locales());
        assert_eq!(decision, RouteDecision::Redirect("https://example.com/a?b=c".to_string()));
    }

    #[test]
    fn test_tld_length_validation() {
        assert_eq!(SubdomainRouter::with_tld_length(0).unwrap_err(), LocaleError::InvalidTldLength(0));
        assert_eq!(set_tld_length(0).unwrap_err(), LocaleError::InvalidTldLength(0));
        assert_eq!(router(3).tld_length(), 3);
    }

    #[test]
    fn test_process_wide_default() {
        assert_eq!(DEFAULT_TLD_LENGTH, 1);
        set_tld_length(DEFAULT_TLD_LENGTH).unwrap();
        assert_eq!(SubdomainRouter::current().tld_length(), DEFAULT_TLD_LENGTH);
    }
}
