//! Typed access to loosely-typed ARM resource documents.
//!
//! Every accessor takes an explicit field path and returns `Option` (optional
//! field) or `Result` (field the schema guarantees). JSON `null` counts as absent,
//! which is how the provider reports e.g. `"vhd": null` on managed disks.

use crate::error::{ArmError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct ResourceDocument(Value);

impl ResourceDocument {
    pub fn new(value: Value) -> ResourceDocument {
        ResourceDocument(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Resource type string, used to label errors.
    pub fn kind(&self) -> &str {
        self.0
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("resource")
    }

    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let mut current = &self.0;
        for part in path {
            current = match current {
                Value::Object(map) => map.get(*part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    pub fn contains(&self, path: &[&str]) -> bool {
        self.get(path).is_some()
    }

    pub fn str_at(&self, path: &[&str]) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn require_str(&self, path: &[&str]) -> Result<&str> {
        self.str_at(path).ok_or_else(|| self.malformed(path))
    }

    pub fn bool_at(&self, path: &[&str]) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    pub fn u64_at(&self, path: &[&str]) -> Option<u64> {
        self.get(path).and_then(Value::as_u64)
    }

    pub fn array_at(&self, path: &[&str]) -> Option<&[Value]> {
        self.get(path).and_then(Value::as_array).map(Vec::as_slice)
    }

    pub fn require_array(&self, path: &[&str]) -> Result<&[Value]> {
        self.array_at(path).ok_or_else(|| self.malformed(path))
    }

    /// Sub-document at `path`, cloned out so it can outlive a document refresh.
    pub fn child(&self, path: &[&str]) -> Option<ResourceDocument> {
        self.get(path).cloned().map(ResourceDocument)
    }

    pub fn require_child(&self, path: &[&str]) -> Result<ResourceDocument> {
        self.child(path).ok_or_else(|| self.malformed(path))
    }

    /// Every element of the required array at `path`, as documents, in order.
    pub fn require_children(&self, path: &[&str]) -> Result<Vec<ResourceDocument>> {
        Ok(self
            .require_array(path)?
            .iter()
            .cloned()
            .map(ResourceDocument)
            .collect())
    }

    pub fn malformed(&self, path: &[&str]) -> ArmError {
        ArmError::malformed(self.kind(), path.join("."))
    }
}

impl From<Value> for ResourceDocument {
    fn from(value: Value) -> Self {
        ResourceDocument(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ResourceDocument {
        ResourceDocument::new(json!({
            "type": "Microsoft.Compute/virtualMachines",
            "properties": {
                "storageProfile": {
                    "osDisk": { "name": "os", "vhd": null },
                    "dataDisks": [ { "lun": 0 }, { "lun": 1 } ]
                }
            }
        }))
    }

    #[test]
    fn test_null_counts_as_absent() {
        let doc = sample();
        assert!(doc.contains(&["properties", "storageProfile", "osDisk"]));
        assert!(!doc.contains(&["properties", "storageProfile", "osDisk", "vhd"]));
    }

    #[test]
    fn test_missing_intermediate_key_is_none() {
        let doc = sample();
        assert_eq!(doc.str_at(&["properties", "availabilitySet", "id"]), None);
    }

    #[test]
    fn test_array_index_path() {
        let doc = sample();
        assert_eq!(
            doc.u64_at(&["properties", "storageProfile", "dataDisks", "1", "lun"]),
            Some(1)
        );
    }

    #[test]
    fn test_require_reports_path_and_kind() {
        let doc = sample();
        let err = doc
            .require_str(&["properties", "hardwareProfile", "vmSize"])
            .unwrap_err();
        match err {
            ArmError::MalformedDocument { resource, path } => {
                assert_eq!(resource, "Microsoft.Compute/virtualMachines");
                assert_eq!(path, "properties.hardwareProfile.vmSize");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_require_children_preserves_order() {
        let doc = sample();
        let disks = doc
            .require_children(&["properties", "storageProfile", "dataDisks"])
            .expect("dataDisks present");
        assert_eq!(disks.len(), 2);
        assert_eq!(disks[0].u64_at(&["lun"]), Some(0));
        assert_eq!(disks[1].u64_at(&["lun"]), Some(1));
    }
}
