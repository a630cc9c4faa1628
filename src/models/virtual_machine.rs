//! Virtual machine (`Microsoft.Compute/virtualMachines`).
//!
//! Built in two phases. [`VirtualMachine::new`] parses the document and
//! resolves disks against the already-populated index, without I/O.
//! [`VirtualMachine::initialize_children`] then links siblings that need
//! remote lookups: availability set, NICs, size.

use super::{
    ArmDisk, ArmResource, AvailabilitySet, Disk, NetworkInterface, ResourceDocument, ResourceId,
    VmSize,
};
use crate::azure::ResourceProvider;
use crate::error::{ArmError, Result};
use crate::subscription::{ResourceIndex, SubscriptionContext};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

const OS_DISK: &[&str] = &["properties", "storageProfile", "osDisk"];
const DATA_DISKS: &[&str] = &["properties", "storageProfile", "dataDisks"];
const NETWORK_INTERFACES: &[&str] = &["properties", "networkProfile", "networkInterfaces"];

#[derive(Debug)]
pub struct VirtualMachine {
    resource: ArmResource,
    os_virtual_hard_disk: Disk,
    data_disks: Vec<Disk>,
    availability_set: Option<Arc<AvailabilitySet>>,
    network_interfaces: Vec<Arc<NetworkInterface>>,
    vm_size: Option<VmSize>,
}

impl VirtualMachine {
    /// Phase 1: parse `document`, resolving the OS disk then each data disk in order.
    pub fn new(document: ResourceDocument, index: &ResourceIndex) -> Result<VirtualMachine> {
        let resource = ArmResource::new(document)?;
        let id = resource.id().clone();
        let document = resource.document();

        log::debug!("{}: constructing OS disk", resource.name());
        let os_virtual_hard_disk = Disk::resolve(&id, document.require_child(OS_DISK)?, index)?;

        let data_disks = document
            .require_children(DATA_DISKS)?
            .into_iter()
            .map(|fragment| {
                log::debug!("{}: constructing data disk", resource.name());
                Disk::resolve(&id, fragment, index)
            })
            .collect::<Result<Vec<Disk>>>()?;

        Ok(VirtualMachine {
            resource,
            os_virtual_hard_disk,
            data_disks,
            availability_set: None,
            network_interfaces: Vec::new(),
            vm_size: None,
        })
    }

    pub fn id(&self) -> &ResourceId {
        self.resource.id()
    }

    pub fn name(&self) -> &str {
        self.resource.name()
    }

    pub fn resource_type(&self) -> &str {
        self.resource.resource_type()
    }

    pub fn location(&self) -> Option<&str> {
        self.resource.location()
    }

    pub fn resource_group_name(&self) -> Option<&str> {
        self.resource.resource_group_name()
    }

    pub fn tags(&self) -> &std::collections::BTreeMap<String, String> {
        self.resource.tags()
    }

    pub fn document(&self) -> &ResourceDocument {
        self.resource.document()
    }

    /// True when the document carries a marketplace `plan` (any non-null value).
    pub fn has_plan(&self) -> bool {
        self.document().contains(&["plan"])
    }

    /// `properties.vmId`.
    pub fn vm_id(&self) -> Result<Uuid> {
        let path = ["properties", "vmId"];
        let raw = self.document().require_str(&path)?;
        Uuid::parse_str(raw).map_err(|_| self.document().malformed(&path))
    }

    /// Size name as written in the document (`hardwareProfile.vmSize`).
    pub fn vm_size_name(&self) -> Option<&str> {
        self.document().str_at(&["properties", "hardwareProfile", "vmSize"])
    }

    /// Size resolved against the location catalog during phase 2.
    pub fn vm_size(&self) -> Option<&VmSize> {
        self.vm_size.as_ref()
    }

    pub fn os_type(&self) -> Option<&str> {
        self.document().str_at(&["properties", "storageProfile", "osDisk", "osType"])
    }

    pub fn zones(&self) -> Vec<&str> {
        self.document()
            .array_at(&["zones"])
            .unwrap_or_default()
            .iter()
            .filter_map(|z| z.as_str())
            .collect()
    }

    /// Empty when the document has no availability set.
    pub fn availability_set_id(&self) -> &str {
        self.document()
            .str_at(&["properties", "availabilitySet", "id"])
            .unwrap_or_default()
    }

    pub fn availability_set(&self) -> Option<&Arc<AvailabilitySet>> {
        self.availability_set.as_ref()
    }

    pub fn os_virtual_hard_disk(&self) -> &Disk {
        &self.os_virtual_hard_disk
    }

    pub fn data_disks(&self) -> &[Disk] {
        &self.data_disks
    }

    pub fn network_interfaces(&self) -> &[Arc<NetworkInterface>] {
        &self.network_interfaces
    }

    pub fn primary_network_interface(&self) -> Option<&Arc<NetworkInterface>> {
        self.network_interfaces.iter().find(|nic| nic.is_primary())
    }

    /// NIC ids from `networkProfile.networkInterfaces`, in document order.
    pub fn network_interface_ids(&self) -> Result<Vec<ResourceId>> {
        self.document()
            .require_children(NETWORK_INTERFACES)?
            .iter()
            .map(|nic| nic.require_str(&["id"]).map(ResourceId::new))
            .collect()
    }

    /// Phase 2. Expects every top-level resource of the subscription to be indexed.
    ///
    /// Each step replaces what a previous run produced, so running it again
    /// does not duplicate NICs or availability set membership. An error stops
    /// the remaining steps; completed steps keep their effects.
    pub async fn initialize_children(&mut self, ctx: &SubscriptionContext) -> Result<()> {
        self.resource.initialize_children();

        self.availability_set = None;
        if !self.availability_set_id().is_empty() {
            let set_id = ResourceId::new(self.availability_set_id());
            let set = ctx.resolve_availability_set(&set_id).await;
            if let Some(set) = &set {
                ctx.index().add_availability_set_member(set.id(), self.id());
            }
            self.availability_set = set;
        }

        log::debug!("{}: initializing OS disk", self.name());
        self.os_virtual_hard_disk.initialize_children().await?;

        for disk in self.data_disks.iter_mut() {
            if let Disk::Inline(inline) = disk {
                inline.initialize_children().await?;
            }
        }

        let nic_ids = self.network_interface_ids()?;
        self.network_interfaces.clear();
        for nic_id in nic_ids {
            let nic = ctx.network_interface(&nic_id).await?;
            ctx.index().set_network_interface_owner(nic.id(), self.id());
            self.network_interfaces.push(nic);
        }

        self.vm_size = match self.vm_size_name() {
            Some(size_name) => ctx.seek_vm_size(self.resource_group_name(), size_name),
            None => None,
        };
        if self.vm_size.is_none() {
            log::debug!("{}: size '{}' unresolved", self.name(), self.vm_size_name().unwrap_or("?"));
        }

        Ok(())
    }

    /// Replace the backing document with a fresh copy from the provider.
    /// Disks, NICs, availability set and size are left as they were.
    pub async fn refresh(&mut self, provider: &dyn ResourceProvider) -> Result<()> {
        let document = provider.fetch_virtual_machine_document(self.id()).await?;
        let fetched_id = document.str_at(&["id"]).map(ResourceId::new);
        if let Some(fetched_id) = fetched_id {
            if fetched_id.key() != self.id().key() {
                return Err(ArmError::Transport(format!(
                    "refresh of {} returned document for {fetched_id}",
                    self.id()
                )));
            }
        }
        self.resource.set_document(document);
        Ok(())
    }
}

impl fmt::Display for VirtualMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiskKind, ManagedDisk};
    use serde_json::json;

    const VM_ID: &str = "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1";

    fn vm_document(os_disk: serde_json::Value, data_disks: serde_json::Value) -> ResourceDocument {
        ResourceDocument::new(json!({
            "id": VM_ID,
            "name": "vm1",
            "type": "Microsoft.Compute/virtualMachines",
            "location": "eastus",
            "properties": {
                "vmId": "6f3c1c2e-8a4b-4f7e-9d3a-2b1c0e9f8a7d",
                "hardwareProfile": { "vmSize": "Standard_B2s" },
                "storageProfile": { "osDisk": os_disk, "dataDisks": data_disks },
                "networkProfile": { "networkInterfaces": [] }
            }
        }))
    }

    fn classic_os() -> serde_json::Value {
        json!({
            "name": "vm1-os",
            "osType": "Linux",
            "vhd": { "uri": "https://acct.blob.core.windows.net/vhds/vm1-os.vhd" }
        })
    }

    #[test]
    fn test_inline_os_disk_no_data_disks() {
        let index = ResourceIndex::default();
        let vm = VirtualMachine::new(vm_document(classic_os(), json!([])), &index).expect("vm");
        assert_eq!(vm.os_virtual_hard_disk().kind(), DiskKind::Inline);
        assert!(vm.data_disks().is_empty());
        assert!(vm.network_interfaces().is_empty());
        assert_eq!(index.stats().total(), 0);
        assert_eq!(vm.os_type(), Some("Linux"));
        assert_eq!(vm.vm_size_name(), Some("Standard_B2s"));
        assert_eq!(vm.to_string(), "vm1");
    }

    #[test]
    fn test_data_disk_order_preserved() {
        let mut index = ResourceIndex::default();
        for name in ["d-a", "d-b"] {
            index.insert_managed_disk(
                ManagedDisk::new(ResourceDocument::new(json!({
                    "id": format!("/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Compute/disks/{name}"),
                    "name": name
                })))
                .expect("disk"),
            );
        }
        let vm = VirtualMachine::new(
            vm_document(
                classic_os(),
                json!([
                    { "name": "d-b", "lun": 0 },
                    { "name": "inline-c", "lun": 1, "vhd": { "uri": "https://acct.blob.core.windows.net/vhds/c.vhd" } },
                    { "name": "d-a", "lun": 2 }
                ]),
            ),
            &index,
        )
        .expect("vm");
        let names: Vec<&str> = vm.data_disks().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["d-b", "inline-c", "d-a"]);
        assert_eq!(vm.data_disks()[1].kind(), DiskKind::Inline);
    }

    #[test]
    fn test_missing_data_disk_list_is_malformed() {
        let index = ResourceIndex::default();
        let mut doc = vm_document(classic_os(), json!([])).as_value().clone();
        doc["properties"]["storageProfile"]
            .as_object_mut()
            .expect("object")
            .remove("dataDisks");
        let err = VirtualMachine::new(ResourceDocument::new(doc), &index).unwrap_err();
        assert!(matches!(err, ArmError::MalformedDocument { ref path, .. } if path == "properties.storageProfile.dataDisks"));
    }

    #[test]
    fn test_availability_set_id_empty_when_absent() {
        let index = ResourceIndex::default();
        let vm = VirtualMachine::new(vm_document(classic_os(), json!([])), &index).expect("vm");
        assert_eq!(vm.availability_set_id(), "");
        assert!(vm.availability_set().is_none());
    }

    #[test]
    fn test_vm_id_and_plan() {
        let index = ResourceIndex::default();
        let vm = VirtualMachine::new(vm_document(classic_os(), json!([])), &index).expect("vm");
        assert_eq!(
            vm.vm_id().expect("uuid").to_string(),
            "6f3c1c2e-8a4b-4f7e-9d3a-2b1c0e9f8a7d"
        );
        assert!(!vm.has_plan());
    }

    #[test]
    fn test_has_plan_follows_presence() {
        let index = ResourceIndex::default();
        let mut doc = vm_document(classic_os(), json!([])).as_value().clone();

        doc["plan"] = json!({});
        let vm = VirtualMachine::new(ResourceDocument::new(doc.clone()), &index).expect("vm");
        assert!(vm.has_plan());

        doc["plan"] = json!({ "name": "web-plan", "publisher": "contoso" });
        let vm = VirtualMachine::new(ResourceDocument::new(doc.clone()), &index).expect("vm");
        assert!(vm.has_plan());

        doc["plan"] = serde_json::Value::Null;
        let vm = VirtualMachine::new(ResourceDocument::new(doc), &index).expect("vm");
        assert!(!vm.has_plan());
    }
}
