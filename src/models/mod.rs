//! Domain models for the virtual machine topology.
//!
//! - [`ResourceDocument`] - typed path access to raw provider documents
//! - [`ResourceId`] - case-insensitive ARM resource ids
//! - [`ArmResource`] - identity, location and tags shared by all resources
//! - [`Disk`] - inline or managed disk attached to a VM
//! - [`ManagedDisk`], [`NetworkInterface`], [`AvailabilitySet`] - indexed siblings
//! - [`VmSize`], [`Location`], [`ResourceGroup`] - size catalog
//! - [`VirtualMachine`] - the orchestrating entity

mod availability_set;
mod disk;
mod document;
mod managed_disk;
mod network_interface;
mod resource;
mod resource_id;
mod virtual_machine;
mod vm_size;

// Re-export public types
pub use availability_set::AvailabilitySet;
pub use disk::{ArmDisk, Disk, DiskKind, DiskLookup, InlineDisk, ManagedDiskReference, VhdBlob};
pub use document::ResourceDocument;
pub use managed_disk::ManagedDisk;
pub use network_interface::NetworkInterface;
pub use resource::ArmResource;
pub use resource_id::{normalize_key, ResourceId};
pub use virtual_machine::VirtualMachine;
pub use vm_size::{Location, ResourceGroup, VmSize};

/// Resource types the topology loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    VirtualMachine,
    ManagedDisk,
    AvailabilitySet,
    NetworkInterface,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::VirtualMachine,
        ResourceType::ManagedDisk,
        ResourceType::AvailabilitySet,
        ResourceType::NetworkInterface,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::VirtualMachine => "microsoft.compute/virtualmachines",
            ResourceType::ManagedDisk => "microsoft.compute/disks",
            ResourceType::AvailabilitySet => "microsoft.compute/availabilitysets",
            ResourceType::NetworkInterface => "microsoft.network/networkinterfaces",
        }
    }

    /// Match a document `type` string, ignoring case.
    pub fn from_type_str(s: &str) -> Option<ResourceType> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }
}
