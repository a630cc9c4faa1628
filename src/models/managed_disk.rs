//! Managed disk: a first-class `Microsoft.Compute/disks` resource.

use super::{ArmResource, ResourceDocument, ResourceId};
use crate::error::Result;

/// A managed disk as indexed for the subscription.
///
/// Which VMs attach it (and with what LUN/caching) is kept by the resource
/// index, not on the disk, since one disk document can be referenced from
/// several VM documents.
#[derive(Debug, Clone)]
pub struct ManagedDisk {
    resource: ArmResource,
}

impl ManagedDisk {
    pub fn new(document: ResourceDocument) -> Result<ManagedDisk> {
        Ok(ManagedDisk {
            resource: ArmResource::new(document)?,
        })
    }

    pub fn id(&self) -> &ResourceId {
        self.resource.id()
    }

    pub fn name(&self) -> &str {
        self.resource.name()
    }

    pub fn location(&self) -> Option<&str> {
        self.resource.location()
    }

    pub fn disk_size_gb(&self) -> Option<u64> {
        self.resource.document().u64_at(&["properties", "diskSizeGB"])
    }

    /// Storage SKU, e.g. `Premium_LRS`.
    pub fn sku_name(&self) -> Option<&str> {
        self.resource.document().str_at(&["sku", "name"])
    }

    pub fn os_type(&self) -> Option<&str> {
        self.resource.document().str_at(&["properties", "osType"])
    }

    pub fn disk_state(&self) -> Option<&str> {
        self.resource.document().str_at(&["properties", "diskState"])
    }

    /// VM id the provider reports as owner, if any.
    pub fn managed_by(&self) -> Option<ResourceId> {
        self.resource.document().str_at(&["managedBy"]).map(ResourceId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_managed_disk_accessors() {
        let disk = ManagedDisk::new(ResourceDocument::new(json!({
            "id": "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Compute/disks/data-1",
            "name": "data-1",
            "type": "Microsoft.Compute/disks",
            "location": "eastus",
            "managedBy": "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1",
            "sku": { "name": "Premium_LRS" },
            "properties": { "diskSizeGB": 128, "diskState": "Attached" }
        })))
        .expect("valid disk");

        assert_eq!(disk.name(), "data-1");
        assert_eq!(disk.disk_size_gb(), Some(128));
        assert_eq!(disk.sku_name(), Some("Premium_LRS"));
        assert_eq!(disk.os_type(), None);
        assert_eq!(disk.disk_state(), Some("Attached"));
        assert_eq!(disk.managed_by().map(|id| id.name().to_string()), Some("vm1".to_string()));
    }
}
