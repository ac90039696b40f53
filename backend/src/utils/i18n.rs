//! Locale catalog abstraction
//!
//! The catalog owns the supported locales, the default locale, and the
//! "current" locale that translation lookups read. Inside a request the
//! current locale is the task-local request locale, so overlapping requests
//! never see each other's value. Outside any request it falls back to the
//! catalog's ambient locale (the process-wide `rust-i18n` locale for
//! [`RustI18nCatalog`]).

use std::future::Future;
use std::sync::RwLock;

use crate::models::Locale;
use crate::utils::{LocaleError, LocaleResult};

tokio::task_local! {
    static REQUEST_LOCALE: Locale;
}

/// Locale of the request being handled on the current task, if any
pub fn request_locale() -> Option<Locale> {
    REQUEST_LOCALE.try_with(Clone::clone).ok()
}

/// Run `future` with `locale` as the task-local request locale
pub async fn with_request_locale<F: Future>(locale: Locale, future: F) -> F::Output {
    REQUEST_LOCALE.scope(locale, future).await
}

// ============================================================================
// Locale Set
// ============================================================================

/// Available locales plus the default
///
/// The default is always a member. Lookups are ASCII case-insensitive and
/// return the configured spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSet {
    default: Locale,
    available: Vec<Locale>,
}

impl LocaleSet {
    pub fn new(default: Locale, available: Vec<Locale>) -> LocaleResult<Self> {
        if available.is_empty() {
            return Err(LocaleError::NoAvailableLocales);
        }

        let mut unique: Vec<Locale> = Vec::with_capacity(available.len());
        for locale in available {
            if !unique.iter().any(|existing| existing.matches(locale.as_str())) {
                unique.push(locale);
            }
        }

        let default = unique
            .iter()
            .find(|locale| locale.matches(default.as_str()))
            .cloned()
            .ok_or_else(|| LocaleError::default_locale_unavailable(default.as_str()))?;

        Ok(Self { default, available: unique })
    }

    /// Parse a default tag and a list of available tags
    pub fn parse<S: AsRef<str>>(default: &str, available: &[S]) -> LocaleResult<Self> {
        let default = Locale::parse(default)?;
        let available = available
            .iter()
            .map(|tag| Locale::parse(tag.as_ref()))
            .collect::<LocaleResult<Vec<_>>>()?;
        Self::new(default, available)
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default
    }

    pub fn available(&self) -> &[Locale] {
        &self.available
    }

    pub fn find(&self, tag: &str) -> Option<&Locale> {
        self.available.iter().find(|locale| locale.matches(tag))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.find(tag).is_some()
    }

    pub fn is_default(&self, locale: &Locale) -> bool {
        &self.default == locale
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Translation catalog as seen by the locale middleware
pub trait LocaleCatalog: Send + Sync {
    fn locales(&self) -> &LocaleSet;

    /// Locale in effect outside any request scope
    fn ambient_locale(&self) -> Locale;

    /// Set the ambient locale. A request in scope still sees its own locale.
    fn set_current_locale(&self, locale: &Locale);

    /// Request locale when one is in scope and served by this catalog,
    /// otherwise the ambient locale
    fn current_locale(&self) -> Locale {
        request_locale()
            .and_then(|locale| self.locales().find(locale.as_str()).cloned())
            .unwrap_or_else(|| self.ambient_locale())
    }

    fn default_locale(&self) -> &Locale {
        self.locales().default_locale()
    }

    fn available_locales(&self) -> &[Locale] {
        self.locales().available()
    }
}

/// In-process catalog holding its current locale behind a lock
#[derive(Debug)]
pub struct StaticCatalog {
    locales: LocaleSet,
    current: RwLock<Locale>,
}

impl StaticCatalog {
    pub fn new(locales: LocaleSet) -> Self {
        let current = RwLock::new(locales.default_locale().clone());
        Self { locales, current }
    }
}

impl LocaleCatalog for StaticCatalog {
    fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    fn ambient_locale(&self) -> Locale {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_current_locale(&self, locale: &Locale) {
        match self.current.write() {
            Ok(mut guard) => *guard = locale.clone(),
            Err(poisoned) => *poisoned.into_inner() = locale.clone(),
        }
    }
}

/// Catalog backed by the `rust-i18n` bundle
///
/// The ambient locale is the process-wide `rust_i18n::locale()`, which the
/// middleware never touches. Handlers translate with
/// `t!(key, locale = catalog.current_locale().as_str())` so lookups follow the
/// request.
#[derive(Debug)]
pub struct RustI18nCatalog {
    locales: LocaleSet,
}

impl RustI18nCatalog {
    pub fn new(locales: LocaleSet) -> Self {
        let bundled = rust_i18n::available_locales!();
        for locale in locales.available() {
            if !bundled.iter().any(|tag| locale.matches(tag)) {
                tracing::warn!("Locale {} has no bundled translations", locale);
            }
        }
        rust_i18n::set_locale(locales.default_locale().as_str());
        Self { locales }
    }
}

impl LocaleCatalog for RustI18nCatalog {
    fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    fn ambient_locale(&self) -> Locale {
        let current = rust_i18n::locale();
        self.locales.find(&current).cloned().unwrap_or_else(|| self.locales.default_locale().clone())
    }

    fn set_current_locale(&self, locale: &Locale) {
        rust_i18n::set_locale(locale.as_str());
    }
}
