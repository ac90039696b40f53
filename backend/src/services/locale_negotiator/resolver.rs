//! Locale resolution
//!
//! Picks one locale out of the catalog's locale set, either from a ranked
//! `Accept-Language` list or from the leading label of the request host.

use super::accept_language::rank_preferred_languages;
use super::iso639::is_iso_639_1_code;
use crate::models::{LanguageRange, Locale};
use crate::utils::LocaleSet;

/// Outcome of inspecting the request host's leading label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubdomainLocale {
    /// The leading label is neither a language code nor an available locale
    NotLocalized,
    /// The leading label names an available locale
    Supported(Locale),
    /// The leading label is an ISO-639-1 code the catalog does not serve
    Unsupported(String),
}

/// First available locale in `ranges`, or the default
///
/// A wildcard reached before any available locale selects the default.
pub fn locale_from_ranges(ranges: &[LanguageRange], locales: &LocaleSet) -> Locale {
    let matched = ranges.iter().find_map(|range| match range {
        LanguageRange::Wildcard => Some(None),
        LanguageRange::Tag(tag) => locales.find(tag).map(Some),
    });

    match matched {
        Some(Some(locale)) => locale.clone(),
        _ => locales.default_locale().clone(),
    }
}

/// Resolve an `Accept-Language` value against `locales`
pub fn locale_from_accept_language(field: &str, locales: &LocaleSet) -> Locale {
    locale_from_ranges(&rank_preferred_languages(field), locales)
}

/// Classify the leading label of `host`
pub fn locale_from_subdomain(host: &str, locales: &LocaleSet) -> SubdomainLocale {
    let Some(label) = host.split('.').next().filter(|label| !label.is_empty()) else {
        return SubdomainLocale::NotLocalized;
    };

    if let Some(locale) = locales.find(label) {
        return SubdomainLocale::Supported(locale.clone());
    }

    if is_iso_639_1_code(label) {
        return SubdomainLocale::Unsupported(label.to_ascii_lowercase());
    }

    SubdomainLocale::NotLocalized
}
