//! Engine configuration from the environment.
//!
//! # Environment Variables
//!
//! - `HEROFORGE_CACHE_PATH` - AP cache file (default: `./data/cache.json`)
//! - `HEROFORGE_PERSIST_CACHE` - Write the cache file after changes (default: true)
//! - `HEROFORGE_IGNORE_AP_LIMIT` - Allow spending beyond the AP budget (default: false)
//! - `HEROFORGE_RULE_DATA_PATH` - Rule data JSON file (optional)
//! - `HEROFORGE_CHARACTERS_PATH` - Directory of character JSON files (optional)
//!
//! Missing or unparseable values fall back to defaults.

use std::path::PathBuf;

pub const DEFAULT_CACHE_PATH: &str = "./data/cache.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub cache_path: PathBuf,
    pub persist_cache: bool,
    pub ignore_ap_limit: bool,
    pub rule_data_path: Option<PathBuf>,
    pub characters_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            persist_cache: true,
            ignore_ap_limit: false,
            rule_data_path: None,
            characters_path: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let path = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };

        Self {
            cache_path: path("HEROFORGE_CACHE_PATH").unwrap_or(defaults.cache_path),
            persist_cache: parsed_or(&lookup, "HEROFORGE_PERSIST_CACHE", defaults.persist_cache),
            ignore_ap_limit: parsed_or(
                &lookup,
                "HEROFORGE_IGNORE_AP_LIMIT",
                defaults.ignore_ap_limit,
            ),
            rule_data_path: path("HEROFORGE_RULE_DATA_PATH"),
            characters_path: path("HEROFORGE_CHARACTERS_PATH"),
        }
    }
}

fn parsed_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config_from(&[]), EngineConfig::default());
    }

    #[test]
    fn values_are_read() {
        let config = config_from(&[
            ("HEROFORGE_CACHE_PATH", "/tmp/ap.json"),
            ("HEROFORGE_PERSIST_CACHE", "false"),
            ("HEROFORGE_IGNORE_AP_LIMIT", "true"),
            ("HEROFORGE_RULE_DATA_PATH", "rules.json"),
        ]);

        assert_eq!(config.cache_path, PathBuf::from("/tmp/ap.json"));
        assert!(!config.persist_cache);
        assert!(config.ignore_ap_limit);
        assert_eq!(config.rule_data_path, Some(PathBuf::from("rules.json")));
        assert_eq!(config.characters_path, None);
    }

    #[test]
    fn unparseable_flags_fall_back() {
        let config = config_from(&[
            ("HEROFORGE_PERSIST_CACHE", "sometimes"),
            ("HEROFORGE_CACHE_PATH", "  "),
        ]);

        assert!(config.persist_cache);
        assert_eq!(config.cache_path, PathBuf::from(DEFAULT_CACHE_PATH));
    }
}
