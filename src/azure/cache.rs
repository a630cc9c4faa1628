//! Cache management for subscription snapshots.
//!
//! Provides caching functionality to avoid repeated Azure Graph API calls.

use super::graph::{run_az_cli_snapshot, Snapshot};
use crate::config;
use crate::error::{ArmError, Result};
use std::path::Path;

/// Default cache file name for today (Pacific/Auckland date).
pub fn default_cache_file(subscription_id: &str) -> String {
    let now = chrono::Utc::now().with_timezone(&chrono_tz::Pacific::Auckland);
    format!(
        "{}_{}_{}.json",
        config::CACHE_FILE_PREFIX,
        subscription_id,
        now.format("%Y-%m-%d")
    )
}

/// Load a snapshot from a JSON file.
pub fn load_snapshot(file: &str) -> Result<Snapshot> {
    let json = std::fs::read_to_string(file)?;
    let mut deserializer = serde_json::Deserializer::from_str(&json);
    let snapshot: Snapshot = serde_path_to_error::deserialize(&mut deserializer)?;
    Ok(snapshot)
}

/// Read a subscription snapshot from cache file, or fetch from Azure if the cache doesn't exist.
///
/// # Arguments
/// * `subscription_id` - Subscription to snapshot
/// * `cache_file` - Optional path to a specific cache file. If None, uses default naming.
///
/// # Returns
/// * `Ok(Snapshot)` - The snapshot from cache or Azure
/// * `Err` - If cache file specified but doesn't exist, or Azure query fails
pub fn read_snapshot_cache(subscription_id: &str, cache_file: Option<&str>) -> Result<Snapshot> {
    let cache_file = match cache_file {
        Some(file) => {
            if !Path::new(file).exists() {
                return Err(ArmError::Config(format!("Cache file does not exist: {file}")));
            }
            log::info!("Using provided cache file: {file}");
            file.to_string()
        }
        None => default_cache_file(subscription_id),
    };

    let snapshot = if Path::new(&cache_file).exists() {
        log::info!("Reading from cache file: {cache_file}");
        load_snapshot(&cache_file)?
    } else {
        log::warn!("Cache file not found: {cache_file}");
        let snapshot = run_az_cli_snapshot(subscription_id)?;
        log::info!("Parsed JSON data received from Azure CLI");

        let json = serde_json::to_string(&snapshot).map_err(|e| ArmError::Parse {
            path: ".".to_string(),
            message: format!("Error serializing JSON: {e}"),
        })?;
        log::warn!("Writing data to cache file: {cache_file}");
        std::fs::write(&cache_file, json)?;
        snapshot
    };

    if !snapshot.subscription_id.eq_ignore_ascii_case(subscription_id) {
        log::warn!(
            "Cache {cache_file} holds subscription {} not {subscription_id}",
            snapshot.subscription_id
        );
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CACHE: &str = "src/tests/test_data/snapshot_test_cache_01.json";

    #[test]
    fn test_read_snapshot_cache() {
        let snapshot = read_snapshot_cache("0b1f6471-1bf0-4dda-aec3-111122223333", Some(TEST_CACHE))
            .expect("Error reading snapshot cache");
        assert!(!snapshot.resources.is_empty(), "Resources should not be empty");
        assert_eq!(snapshot.resource_groups.len(), 1);
        assert_eq!(snapshot.locations[0].name, "eastus");
        assert!(!snapshot.locations[0].vm_sizes.is_empty());
    }

    #[test]
    fn test_read_snapshot_cache_missing_file() {
        let err = read_snapshot_cache("s", Some("src/tests/test_data/does_not_exist.json")).unwrap_err();
        assert!(matches!(err, ArmError::Config(_)));
    }

    #[test]
    fn test_default_cache_file_name() {
        let name = default_cache_file("sub-1");
        assert!(name.starts_with("arm_snapshot_sub-1_"));
        assert!(name.ends_with(".json"));
    }
}
