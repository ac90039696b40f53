use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::services::locale_negotiator::DEFAULT_TLD_LENGTH;
use crate::utils::{LocaleResult, LocaleSet};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub locale: LocaleConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Locale used when negotiation finds no match (default: "en")
    pub default: String,
    /// Supported locales, as a list or a comma-separated string
    #[serde(deserialize_with = "deserialize_locale_list")]
    pub available: Vec<String>,
    /// Derive the locale from the host's leading label and redirect to canonical URLs
    pub subdomain_routing: bool,
    /// Trailing host labels forming the bare domain (1 for .com, 2 for .co.uk)
    pub tld_length: usize,
}

impl LocaleConfig {
    pub fn locale_set(&self) -> LocaleResult<LocaleSet> {
        LocaleSet::parse(&self.default, &self.available)
    }
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load from `path`, or the first config.toml found
    /// 2. Override with environment variables (prefixed with APP_)
    /// 3. Validate the final configuration
    pub fn load(path: Option<&str>) -> Result<Self, anyhow::Error> {
        let config_path = path.map(str::to_string).or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            tracing::info!("Loading configuration from {}", config_path);
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST: Server host (default: 0.0.0.0)
    /// - APP_SERVER_PORT: Server port (default: 8080)
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,locale_router=debug")
    /// - APP_LOCALE_DEFAULT: Default locale (e.g., "en")
    /// - APP_LOCALE_AVAILABLE: Comma-separated available locales (e.g., "en,fr,de")
    /// - APP_LOCALE_SUBDOMAIN_ROUTING: Enable/disable subdomain routing (true/false)
    /// - APP_LOCALE_TLD_LENGTH: TLD length (e.g., 2 for .co.uk)
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Some(port) = lookup("APP_SERVER_PORT") {
            match port.parse() {
                Ok(port) => {
                    self.server.port = port;
                    tracing::info!("Override server.port from env: {}", self.server.port);
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_SERVER_PORT '{}': {} (keep {})",
                    port,
                    e,
                    self.server.port
                ),
            }
        }

        if let Some(level) = lookup("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Some(default) = lookup("APP_LOCALE_DEFAULT") {
            self.locale.default = default.trim().to_string();
            tracing::info!("Override locale.default from env: {}", self.locale.default);
        }

        if let Some(available) = lookup("APP_LOCALE_AVAILABLE") {
            self.locale.available = split_locale_list(&available);
            tracing::info!("Override locale.available from env: {:?}", self.locale.available);
        }

        if let Some(enabled) = lookup("APP_LOCALE_SUBDOMAIN_ROUTING") {
            match enabled.parse() {
                Ok(val) => {
                    self.locale.subdomain_routing = val;
                    tracing::info!(
                        "Override locale.subdomain_routing from env: {}",
                        self.locale.subdomain_routing
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_LOCALE_SUBDOMAIN_ROUTING '{}': {} (keep {})",
                    enabled,
                    e,
                    self.locale.subdomain_routing
                ),
            }
        }

        if let Some(length) = lookup("APP_LOCALE_TLD_LENGTH") {
            match length.parse() {
                Ok(val) => {
                    self.locale.tld_length = val;
                    tracing::info!("Override locale.tld_length from env: {}", self.locale.tld_length);
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_LOCALE_TLD_LENGTH '{}': {} (keep {})",
                    length,
                    e,
                    self.locale.tld_length
                ),
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.locale.tld_length == 0 {
            anyhow::bail!("locale.tld_length must be > 0");
        }

        self.locale.locale_set()?;

        if !self.locale.subdomain_routing && self.locale.tld_length != DEFAULT_TLD_LENGTH {
            tracing::warn!(
                "locale.tld_length is {} but subdomain routing is disabled; it has no effect",
                self.locale.tld_length
            );
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn from_toml_str(content: &str) -> Result<Self, anyhow::Error> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,locale_router=debug".to_string(),
            file: Some("logs/locale-router.log".to_string()),
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default: "en".to_string(),
            available: vec!["en".to_string()],
            subdomain_routing: false,
            tld_length: DEFAULT_TLD_LENGTH,
        }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn split_locale_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

// Accepts either `["en", "fr"]` or `"en, fr"`
fn deserialize_locale_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = Vec<String>;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a list of locale tags or a string like 'en,fr,de'")
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(split_locale_list(v))
        }
        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::SeqAccess<'de>,
        {
            let mut tags = Vec::new();
            while let Some(tag) = seq.next_element::<String>()? {
                let tag = tag.trim();
                if !tag.is_empty() {
                    tags.push(tag.to_string());
                }
            }
            Ok(tags)
        }
    }
    deserializer.deserialize_any(Visitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 3000

        [logging]
        level = "debug"

        [locale]
        default = "en"
        available = ["en", "fr", "de"]
        subdomain_routing = true
        tld_length = 2
    "#;

    #[test]
    fn test_from_toml_str() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.locale.available, vec!["en", "fr", "de"]);
        assert!(config.locale.subdomain_routing);
        assert_eq!(config.locale.tld_length, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_available_accepts_comma_separated_string() {
        let config = Config::from_toml_str("[locale]\navailable = \"en, fr ,de\"\n").unwrap();
        assert_eq!(config.locale.available, vec!["en", "fr", "de"]);
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.locale.default, "en");
        assert!(!config.locale.subdomain_routing);
        assert_eq!(config.locale.tld_length, DEFAULT_TLD_LENGTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("APP_SERVER_PORT", "9090"),
            ("APP_LOCALE_DEFAULT", "fr"),
            ("APP_LOCALE_AVAILABLE", "fr,de"),
            ("APP_LOCALE_SUBDOMAIN_ROUTING", "true"),
            ("APP_LOCALE_TLD_LENGTH", "not-a-number"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.locale.default, "fr");
        assert_eq!(config.locale.available, vec!["fr", "de"]);
        assert!(config.locale.subdomain_routing);
        // Invalid values keep the previous setting
        assert_eq!(config.locale.tld_length, DEFAULT_TLD_LENGTH);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.locale.tld_length = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.locale.default = "it".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.locale.available = vec!["en".to_string(), "en_US".to_string()];
        assert!(config.validate().is_err());
    }
}
