//! Store types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default capacity threshold: 400 MiB
pub const DEFAULT_CAPACITY_BYTES: u64 = 400 * 1024 * 1024;

/// A stored file as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub name: String,
    pub size: u64,
    /// Names removed to make room, oldest first
    pub evicted: Vec<String>,
}

/// Statistics about the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub items: usize,
    pub total_bytes: u64,
    pub capacity_bytes: u64,
    pub evictions: u64,
}

/// How many items an over-capacity upload may evict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionPolicy {
    /// Evict oldest items until the new content fits under the cap
    #[default]
    UntilFits,
    /// Evict exactly one oldest item, even if that does not free enough room
    SingleOldest,
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::UntilFits => write!(f, "until-fits"),
            EvictionPolicy::SingleOldest => write!(f, "single-oldest"),
        }
    }
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "until-fits" | "until_fits" => Ok(EvictionPolicy::UntilFits),
            "single-oldest" | "single_oldest" => Ok(EvictionPolicy::SingleOldest),
            other => Err(format!("unknown eviction policy: {}", other)),
        }
    }
}

/// Configuration for a [`crate::BoundedStore`]
#[derive(Clone)]
pub struct StoreConfig {
    pub capacity_bytes: u64,
    pub eviction_policy: EvictionPolicy,
    /// Secret that authorizes deletes. `None` rejects every delete.
    pub delete_secret: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
            eviction_policy: EvictionPolicy::default(),
            delete_secret: None,
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("capacity_bytes", &self.capacity_bytes)
            .field("eviction_policy", &self.eviction_policy)
            .field(
                "delete_secret",
                &self.delete_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.capacity_bytes, 419_430_400);
        assert_eq!(config.eviction_policy, EvictionPolicy::UntilFits);
        assert!(config.delete_secret.is_none());
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let config = StoreConfig {
            delete_secret: Some("hunter2".to_string()),
            ..StoreConfig::default()
        };
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("hunter2"));
        assert!(debug_str.contains("<redacted>"));
    }

    #[test]
    fn test_eviction_policy_parse() {
        assert_eq!(
            "until-fits".parse::<EvictionPolicy>().unwrap(),
            EvictionPolicy::UntilFits
        );
        assert_eq!(
            " Single_Oldest ".parse::<EvictionPolicy>().unwrap(),
            EvictionPolicy::SingleOldest
        );
        assert!("lru".parse::<EvictionPolicy>().is_err());
    }

    #[test]
    fn test_eviction_policy_display_round_trips() {
        for policy in [EvictionPolicy::UntilFits, EvictionPolicy::SingleOldest] {
            assert_eq!(policy.to_string().parse::<EvictionPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_store_stats_default() {
        let stats = StoreStats::default();
        assert_eq!(stats.items, 0);
        assert_eq!(stats.total_bytes, 0);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_upload_receipt_serialization() {
        let receipt = UploadReceipt {
            name: "song.mp3".to_string(),
            size: 12345,
            evicted: vec!["old.wav".to_string()],
        };

        let json = serde_json::to_string(&receipt).unwrap();
        assert!(json.contains("song.mp3"));
        assert!(json.contains("12345"));
        assert!(json.contains("old.wav"));
    }
}
