//! Runtime configuration.
//!
//! Constants shared by the Azure collaborators, plus [`Settings`] read from the
//! environment (a `.env` file is loaded by `main` before this runs).

use crate::error::{ArmError, Result};

/// Base pause between paginated `az` calls, in milliseconds.
pub const SLEEP_MSEC: u64 = 100;

/// Number of rows requested per Resource Graph page.
pub const GRAPH_PAGE_SIZE: usize = 50;

/// log4rs configuration file read by the binary.
pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

/// Prefix of the dated snapshot cache file.
pub const CACHE_FILE_PREFIX: &str = "arm_snapshot";

const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
const ENV_CACHE_FILE: &str = "AZ_TOPOLOGY_CACHE_FILE";
const ENV_OFFLINE: &str = "AZ_TOPOLOGY_OFFLINE";

/// Settings for one topology run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Subscription whose virtual machines are loaded.
    pub subscription_id: String,
    /// Explicit snapshot file; when unset the dated cache name is used.
    pub cache_file: Option<String>,
    /// Serve phase-2 fetches from the snapshot instead of calling `az`.
    pub offline: bool,
}

impl Settings {
    pub fn from_env() -> Result<Settings> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let subscription_id = lookup(ENV_SUBSCRIPTION_ID)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ArmError::Config(format!("{ENV_SUBSCRIPTION_ID} is not set")))?;
        let cache_file = lookup(ENV_CACHE_FILE).filter(|s| !s.trim().is_empty());
        let offline = lookup(ENV_OFFLINE)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Settings {
            subscription_id,
            cache_file,
            offline,
        })
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[("AZURE_SUBSCRIPTION_ID", "sub-1")]))
            .expect("settings should load");
        assert_eq!(settings.subscription_id, "sub-1");
        assert_eq!(settings.cache_file, None);
        assert!(!settings.offline);
    }

    #[test]
    fn test_settings_offline_and_cache() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("AZURE_SUBSCRIPTION_ID", "sub-1"),
            ("AZ_TOPOLOGY_CACHE_FILE", "snap.json"),
            ("AZ_TOPOLOGY_OFFLINE", "TRUE"),
        ]))
        .expect("settings should load");
        assert_eq!(settings.cache_file.as_deref(), Some("snap.json"));
        assert!(settings.offline);
    }

    #[test]
    fn test_settings_missing_subscription() {
        let err = Settings::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ArmError::Config(_)));
    }
}
