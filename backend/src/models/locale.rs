//! Locale value types
//!
//! `Locale` is the only representation of a locale that flows through the
//! middleware. It is validated on construction, so a `Locale` always matches
//! the language-tag grammar `primary(-subtag)*`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::utils::{LocaleError, LocaleResult};

/// A validated language tag naming a locale the application can serve
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    /// Parse a locale tag such as `en`, `pt-BR` or `es-419`
    ///
    /// Case is preserved. The wildcard `*` is not a locale.
    pub fn parse(input: &str) -> LocaleResult<Self> {
        let trimmed = input.trim();
        if !is_language_tag(trimmed) {
            return Err(LocaleError::invalid_locale(trimmed));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First subtag, e.g. `en` for `en-US`
    pub fn primary_subtag(&self) -> &str {
        primary_of(&self.0)
    }

    /// ASCII case-insensitive comparison against a raw tag
    pub fn matches(&self, tag: &str) -> bool {
        self.0.eq_ignore_ascii_case(tag)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The locale selected for the current request
///
/// Inserted into request extensions by the locale middleware and usable as an
/// axum extractor in downstream handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedLocale(pub Locale);

impl ResolvedLocale {
    pub fn locale(&self) -> &Locale {
        &self.0
    }
}

/// A language range as it appears in `Accept-Language`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageRange {
    /// `*`, matches any locale
    Wildcard,
    /// A concrete tag, case preserved as received
    Tag(String),
}

impl LanguageRange {
    /// Parse a single range token. Returns `None` when the token does not
    /// match the grammar.
    pub fn parse(token: &str) -> Option<Self> {
        if token == "*" {
            return Some(Self::Wildcard);
        }
        is_language_tag(token).then(|| Self::Tag(token.to_string()))
    }

    /// Parse the range at the start of `entry`, ignoring whatever follows it
    ///
    /// `de_DE` yields `de` and `fr-CH!` yields `fr-CH`. A primary subtag longer
    /// than 8 letters is rejected rather than truncated.
    pub fn parse_leading(entry: &str) -> Option<Self> {
        if entry.starts_with('*') {
            return Some(Self::Wildcard);
        }

        let primary = leading_run(entry, |c| c.is_ascii_alphabetic());
        if !(1..=8).contains(&primary) {
            return None;
        }

        let mut end = primary;
        while let Some(rest) = entry[end..].strip_prefix('-') {
            let subtag = leading_run(rest, |c| c.is_ascii_alphanumeric());
            if !(1..=8).contains(&subtag) {
                break;
            }
            end += 1 + subtag;
        }

        Some(Self::Tag(entry[..end].to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Wildcard => "*",
            Self::Tag(tag) => tag,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    /// Primary subtag of a concrete tag. `None` for the wildcard.
    pub fn primary_subtag(&self) -> Option<&str> {
        match self {
            Self::Wildcard => None,
            Self::Tag(tag) => Some(primary_of(tag)),
        }
    }

    /// Same range, ignoring ASCII case
    pub fn same_as(&self, other: &LanguageRange) -> bool {
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }
}

impl fmt::Display for LanguageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `primary-subtag(-subtag)*`: the primary subtag is 1-8 ASCII letters, the
/// following subtags are 1-8 ASCII alphanumerics.
pub(crate) fn is_language_tag(value: &str) -> bool {
    let mut subtags = value.split('-');
    let Some(primary) = subtags.next() else {
        return false;
    };
    is_subtag(primary, |c| c.is_ascii_alphabetic())
        && subtags.all(|subtag| is_subtag(subtag, |c| c.is_ascii_alphanumeric()))
}

fn is_subtag(value: &str, allowed: impl Fn(char) -> bool) -> bool {
    (1..=8).contains(&value.len()) && value.chars().all(allowed)
}

/// Byte length of the leading run of ASCII characters accepted by `allowed`
fn leading_run(value: &str, allowed: impl Fn(char) -> bool) -> usize {
    value.find(|c: char| !allowed(c)).unwrap_or(value.len())
}

fn primary_of(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}
