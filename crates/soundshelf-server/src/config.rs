use bounded_file_store::{EvictionPolicy, StoreConfig, DEFAULT_CAPACITY_BYTES};
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::error::{Result, ServerError};

/// Default request body limit for uploads: 100 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Service configuration parsed from environment variables
#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_storage_bytes: u64,
    pub max_upload_bytes: usize,
    pub eviction_policy: EvictionPolicy,
    pub api_key: Option<String>,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            upload_dir: PathBuf::from("uploads"),
            max_storage_bytes: DEFAULT_CAPACITY_BYTES,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            eviction_policy: EvictionPolicy::UntilFits,
            api_key: None,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl ServerConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse configuration from any key lookup. Unparseable numbers fall
    /// back to defaults; an unknown eviction policy is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let upload_dir = lookup("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);

        let max_storage_bytes = lookup("MAX_STORAGE_BYTES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_storage_bytes);

        let max_upload_bytes = lookup("MAX_UPLOAD_BYTES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_upload_bytes);

        let eviction_policy = match lookup("EVICTION_POLICY") {
            Some(s) => s.parse::<EvictionPolicy>().map_err(ServerError::Config)?,
            None => defaults.eviction_policy,
        };

        let api_key = lookup("API_KEY").filter(|k| !k.is_empty());

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        Ok(Self {
            port,
            upload_dir,
            max_storage_bytes,
            max_upload_bytes,
            eviction_policy,
            api_key,
            cors_origins,
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            capacity_bytes: self.max_storage_bytes,
            eviction_policy: self.eviction_policy,
            delete_secret: self.api_key.clone(),
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("upload_dir", &self.upload_dir)
            .field("max_storage_bytes", &self.max_storage_bytes)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("eviction_policy", &self.eviction_policy)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_storage_bytes, 400 * 1024 * 1024);
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.eviction_policy, EvictionPolicy::UntilFits);
        assert!(config.api_key.is_none());
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
    }

    #[test]
    fn test_values_from_environment() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "9090"),
            ("UPLOAD_DIR", "/srv/audio"),
            ("MAX_STORAGE_BYTES", "1000"),
            ("EVICTION_POLICY", "single-oldest"),
            ("API_KEY", "abc"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/audio"));
        assert_eq!(config.max_storage_bytes, 1000);
        assert_eq!(config.eviction_policy, EvictionPolicy::SingleOldest);
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );

        let store = config.store_config();
        assert_eq!(store.capacity_bytes, 1000);
        assert_eq!(store.delete_secret.as_deref(), Some("abc"));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "not-a-port"),
            ("MAX_STORAGE_BYTES", "-5"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_storage_bytes, DEFAULT_CAPACITY_BYTES);
    }

    #[test]
    fn test_empty_api_key_is_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[("API_KEY", "")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_unknown_eviction_policy_is_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[("EVICTION_POLICY", "random")]));
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ServerConfig {
            api_key: Some("topsecret".to_string()),
            ..ServerConfig::default()
        };
        assert!(!format!("{:?}", config).contains("topsecret"));
    }
}
