pub mod locale;
pub mod request_url;

pub use locale::{LanguageRange, Locale, ResolvedLocale};
pub use request_url::RequestUrl;
