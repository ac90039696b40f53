pub mod error;
pub mod i18n;

pub use error::{LocaleError, LocaleErrorResponse, LocaleResult, UNSUPPORTED_LOCALE_BODY};
pub use i18n::{
    LocaleCatalog, LocaleSet, RustI18nCatalog, StaticCatalog, request_locale,
    with_request_locale,
};
