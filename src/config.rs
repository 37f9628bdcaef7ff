//! Application configuration.
//!
//! Layered with figment: built-in defaults, then an optional `unlocked.toml`
//! in the working directory, then `UNLOCKED_*` environment variables
//! (e.g. `UNLOCKED_CATALOG_DIR`, `UNLOCKED_CATALOG_TIMEOUT=5s`).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::resolver::{DEFAULT_FETCH_TIMEOUT, RetakePolicy};

pub const CONFIG_FILE: &str = "unlocked.toml";
pub const ENV_PREFIX: &str = "UNLOCKED_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Level for this crate's logs when `RUST_LOG` is unset.
    pub log_level: String,
    /// Directory holding `<program>.json` catalogs.
    pub catalog_dir: PathBuf,
    /// When set, catalogs are fetched from `<catalog_url>/<program>.json`
    /// instead of `catalog_dir`.
    pub catalog_url: Option<Url>,
    /// Upper bound on a catalog fetch, e.g. `"10s"` or `"1500ms"`.
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub catalog_timeout: Duration,
    /// File used for cached grade report and resolution results.
    pub cache_path: PathBuf,
    pub retake_policy: RetakePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            catalog_dir: PathBuf::from("catalogs"),
            catalog_url: None,
            catalog_timeout: DEFAULT_FETCH_TIMEOUT,
            cache_path: PathBuf::from(".unlocked/cache.json"),
            retake_policy: RetakePolicy::default(),
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::figment()
            .extract()
            .context("Failed to load configuration")
    }
}

/// Parse a duration string with units (`"30s"`, `"250ms"`, `"2m"`). A bare
/// number is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let parser = fundu::DurationParser::with_all_time_units();
    let parsed = parser
        .parse(s.trim())
        .map_err(|e| format!("invalid duration `{s}`: {e}"))?;
    Duration::try_from(parsed).map_err(|e| format!("invalid duration `{s}`: {e}"))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format!("{}ms", duration.as_millis()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn duration_strings() {
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("1500ms"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("5"), Ok(Duration::from_secs(5)));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let config = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(config.log_level, "info");
            assert_eq!(config.catalog_dir, PathBuf::from("catalogs"));
            assert_eq!(config.catalog_timeout, DEFAULT_FETCH_TIMEOUT);
            assert_eq!(config.retake_policy, RetakePolicy::Suppress);
            assert!(config.catalog_url.is_none());
            Ok(())
        });
    }

    #[test]
    fn file_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                catalog_dir = "data/catalogs"
                catalog_timeout = "3s"
                retake_policy = "keep-both"
                "#,
            )?;
            jail.set_env("UNLOCKED_CATALOG_TIMEOUT", "750ms");
            jail.set_env("UNLOCKED_CATALOG_URL", "https://example.edu/json/");

            let config = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(config.catalog_dir, PathBuf::from("data/catalogs"));
            assert_eq!(config.catalog_timeout, Duration::from_millis(750));
            assert_eq!(config.retake_policy, RetakePolicy::KeepBoth);
            assert_eq!(
                config.catalog_url.map(|u| u.to_string()),
                Some("https://example.edu/json/".to_string())
            );
            Ok(())
        });
    }
}
