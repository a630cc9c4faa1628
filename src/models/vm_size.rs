//! VM size catalog, locations and resource groups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of `az vm list-sizes --location <loc>`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmSize {
    pub name: String,
    pub number_of_cores: u32,
    #[serde(rename = "memoryInMB")]
    pub memory_in_mb: u64,
    pub max_data_disk_count: u32,
    #[serde(rename = "osDiskSizeInMB", default)]
    pub os_disk_size_in_mb: u64,
    #[serde(rename = "resourceDiskSizeInMB", default)]
    pub resource_disk_size_in_mb: u64,
}

impl fmt::Display for VmSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} cores, {} MB)",
            self.name, self.number_of_cores, self.memory_in_mb
        )
    }
}

/// An Azure region and its size catalog.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub vm_sizes: Vec<VmSize>,
}

impl Location {
    /// Size names are matched case-insensitively, as ARM does.
    pub fn seek_vm_size(&self, size_name: &str) -> Option<&VmSize> {
        self.vm_sizes
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(size_name))
    }
}

/// A resource group, as listed by `az group list`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroup {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vm_size_from_az_output() {
        let size: VmSize = serde_json::from_value(json!({
            "maxDataDiskCount": 4,
            "memoryInMB": 3584,
            "name": "Standard_DS1_v2",
            "numberOfCores": 1,
            "osDiskSizeInMB": 1047552,
            "resourceDiskSizeInMB": 7168
        }))
        .expect("az vm list-sizes row");
        assert_eq!(size.memory_in_mb, 3584);
        assert_eq!(size.to_string(), "Standard_DS1_v2 (1 cores, 3584 MB)");
    }

    #[test]
    fn test_seek_vm_size_ignores_case() {
        let location = Location {
            name: "eastus".to_string(),
            vm_sizes: vec![VmSize {
                name: "Standard_B2s".to_string(),
                number_of_cores: 2,
                memory_in_mb: 4096,
                max_data_disk_count: 4,
                os_disk_size_in_mb: 0,
                resource_disk_size_in_mb: 0,
            }],
        };
        assert!(location.seek_vm_size("standard_b2s").is_some());
        assert!(location.seek_vm_size("Standard_D2s_v3").is_none());
    }
}
