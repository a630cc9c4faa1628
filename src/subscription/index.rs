//! Subscription-wide resource index.
//!
//! Resources live in append-only arenas with case-insensitive id/name maps.
//! Arenas are only written while the subscription is being indexed (`&mut self`).
//! Back-links (disk -> VM, NIC -> VM, availability set -> VMs) are relation
//! tables behind their own mutexes so concurrent phase-2 runs can record them
//! through a shared reference.

use crate::models::{
    normalize_key, AvailabilitySet, ManagedDisk, NetworkInterface, ResourceDocument, ResourceId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One VM's attachment of a managed disk.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskAttachment {
    pub virtual_machine_id: ResourceId,
    /// The VM's `osDisk` / `dataDisks[n]` fragment (LUN, caching, ...).
    pub attachment: ResourceDocument,
}

/// Managed disk lookup counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub by_id: usize,
    pub by_name: usize,
}

impl IndexStats {
    pub fn total(&self) -> usize {
        self.by_id + self.by_name
    }
}

type MemberList = Arc<Mutex<Vec<ResourceId>>>;

#[derive(Default)]
pub struct ResourceIndex {
    managed_disks: Vec<Arc<ManagedDisk>>,
    managed_disks_by_id: HashMap<String, usize>,
    managed_disks_by_name: HashMap<String, usize>,
    availability_sets: Vec<Arc<AvailabilitySet>>,
    availability_sets_by_id: HashMap<String, usize>,
    network_interfaces: Vec<Arc<NetworkInterface>>,
    network_interfaces_by_id: HashMap<String, usize>,

    disk_attachments: Mutex<HashMap<String, Vec<DiskAttachment>>>,
    availability_set_members: Mutex<HashMap<String, MemberList>>,
    network_interface_owners: Mutex<HashMap<String, ResourceId>>,

    lookups_by_id: AtomicUsize,
    lookups_by_name: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ResourceIndex {
    // ---------------------------------------------------------------------
    // Managed disks
    // ---------------------------------------------------------------------

    /// Index a managed disk. When two disks share a name, by-name lookups
    /// return the first one indexed.
    pub fn insert_managed_disk(&mut self, disk: ManagedDisk) -> Arc<ManagedDisk> {
        let disk = Arc::new(disk);
        let slot = self.managed_disks.len();
        self.managed_disks.push(Arc::clone(&disk));
        self.managed_disks_by_id.insert(disk.id().key(), slot);
        let name_key = normalize_key(disk.name());
        if self.managed_disks_by_name.contains_key(&name_key) {
            log::warn!(
                "Managed disk name '{}' is not unique, by-name lookups keep the first",
                disk.name()
            );
        } else {
            self.managed_disks_by_name.insert(name_key, slot);
        }
        disk
    }

    pub fn find_managed_disk_by_id(&self, id: &str) -> Option<Arc<ManagedDisk>> {
        self.lookups_by_id.fetch_add(1, Ordering::Relaxed);
        self.managed_disks_by_id
            .get(&normalize_key(id))
            .map(|&slot| Arc::clone(&self.managed_disks[slot]))
    }

    pub fn find_managed_disk_by_name(&self, name: &str) -> Option<Arc<ManagedDisk>> {
        self.lookups_by_name.fetch_add(1, Ordering::Relaxed);
        self.managed_disks_by_name
            .get(&normalize_key(name))
            .map(|&slot| Arc::clone(&self.managed_disks[slot]))
    }

    pub fn managed_disks(&self) -> &[Arc<ManagedDisk>] {
        &self.managed_disks
    }

    /// Record that `vm` attaches `disk_id` as described by `attachment`.
    /// A VM has at most one attachment per disk; recording again replaces it.
    pub fn attach_managed_disk(&self, disk_id: &ResourceId, vm: &ResourceId, attachment: &ResourceDocument) {
        let mut table = lock(&self.disk_attachments);
        let entries = table.entry(disk_id.key()).or_default();
        let vm_key = vm.key();
        entries.retain(|a| a.virtual_machine_id.key() != vm_key);
        entries.push(DiskAttachment {
            virtual_machine_id: vm.clone(),
            attachment: attachment.clone(),
        });
    }

    pub fn managed_disk_attachments(&self, disk_id: &ResourceId) -> Vec<DiskAttachment> {
        lock(&self.disk_attachments)
            .get(&disk_id.key())
            .cloned()
            .unwrap_or_default()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            by_id: self.lookups_by_id.load(Ordering::Relaxed),
            by_name: self.lookups_by_name.load(Ordering::Relaxed),
        }
    }

    // ---------------------------------------------------------------------
    // Availability sets
    // ---------------------------------------------------------------------

    pub fn insert_availability_set(&mut self, set: AvailabilitySet) -> Arc<AvailabilitySet> {
        let set = Arc::new(set);
        self.availability_sets_by_id
            .insert(set.id().key(), self.availability_sets.len());
        self.availability_sets.push(Arc::clone(&set));
        set
    }

    pub fn find_availability_set(&self, id: &ResourceId) -> Option<Arc<AvailabilitySet>> {
        self.availability_sets_by_id
            .get(&id.key())
            .map(|&slot| Arc::clone(&self.availability_sets[slot]))
    }

    pub fn availability_sets(&self) -> &[Arc<AvailabilitySet>] {
        &self.availability_sets
    }

    fn member_list(&self, set_id: &ResourceId) -> MemberList {
        let mut table = lock(&self.availability_set_members);
        Arc::clone(table.entry(set_id.key()).or_default())
    }

    /// Append `vm` to the set's members unless already present.
    /// Returns `true` when the VM was added.
    pub fn add_availability_set_member(&self, set_id: &ResourceId, vm: &ResourceId) -> bool {
        let members = self.member_list(set_id);
        let mut members = lock(&members);
        let vm_key = vm.key();
        if members.iter().any(|m| m.key() == vm_key) {
            return false;
        }
        members.push(vm.clone());
        true
    }

    /// Member VMs in the order they were resolved.
    pub fn availability_set_members(&self, set_id: &ResourceId) -> Vec<ResourceId> {
        let members = self.member_list(set_id);
        let members = lock(&members);
        members.clone()
    }

    // ---------------------------------------------------------------------
    // Network interfaces
    // ---------------------------------------------------------------------

    pub fn insert_network_interface(&mut self, nic: NetworkInterface) -> Arc<NetworkInterface> {
        let nic = Arc::new(nic);
        self.network_interfaces_by_id
            .insert(nic.id().key(), self.network_interfaces.len());
        self.network_interfaces.push(Arc::clone(&nic));
        nic
    }

    pub fn find_network_interface(&self, id: &ResourceId) -> Option<Arc<NetworkInterface>> {
        self.network_interfaces_by_id
            .get(&id.key())
            .map(|&slot| Arc::clone(&self.network_interfaces[slot]))
    }

    pub fn network_interfaces(&self) -> &[Arc<NetworkInterface>] {
        &self.network_interfaces
    }

    pub fn set_network_interface_owner(&self, nic_id: &ResourceId, vm: &ResourceId) {
        if let Some(previous) = lock(&self.network_interface_owners).insert(nic_id.key(), vm.clone()) {
            if previous.key() != vm.key() {
                log::warn!("NIC {nic_id} moved from {previous} to {vm}");
            }
        }
    }

    pub fn network_interface_owner(&self, nic_id: &ResourceId) -> Option<ResourceId> {
        lock(&self.network_interface_owners).get(&nic_id.key()).cloned()
    }
}
