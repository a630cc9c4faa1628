//! Two-stage subscription pipeline.
//!
//! Stage 1 ([`Subscription::load`]) indexes every managed disk, availability
//! set and NIC of a snapshot, then constructs every VM (phase 1). Stage 2
//! ([`Subscription::initialize_children`]) runs phase 2 for all VMs. A
//! `Subscription` value only exists once stage 1 has finished, so phase 2 can
//! never observe a partly built index.

use super::{DiskAttachment, SubscriptionContext};
use crate::azure::{ResourceProvider, Snapshot};
use crate::error::{ArmError, Result};
use crate::models::{
    AvailabilitySet, ManagedDisk, NetworkInterface, ResourceDocument, ResourceId, ResourceType,
    VirtualMachine,
};
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;

/// A resource that failed to load or initialize, with the reason.
#[derive(Debug)]
pub struct ResourceFailure {
    pub resource: String,
    pub error: ArmError,
}

impl fmt::Display for ResourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.resource, self.error)
    }
}

pub struct Subscription {
    context: SubscriptionContext,
    virtual_machines: Vec<VirtualMachine>,
    load_failures: Vec<ResourceFailure>,
}

impl Subscription {
    /// Stage 1: index the snapshot and construct every VM.
    ///
    /// Resources whose documents are malformed, and VMs whose disks do not
    /// resolve, are left out and reported by [`Subscription::load_failures`].
    pub fn load(snapshot: Snapshot, provider: Arc<dyn ResourceProvider>) -> Subscription {
        let Snapshot {
            subscription_id,
            resources,
            resource_groups,
            locations,
        } = snapshot;
        log::info!(
            "Loading subscription {subscription_id}: {} resources, {} resource groups, {} locations",
            resources.len(),
            resource_groups.len(),
            locations.len()
        );

        let mut context = SubscriptionContext::new(subscription_id, provider, resource_groups, locations);
        let mut load_failures = Vec::new();
        let mut vm_documents = Vec::new();

        for document in resources {
            let Some(resource_type) = ResourceType::from_type_str(document.kind()) else {
                log::trace!("Skipping resource of type '{}'", document.kind());
                continue;
            };
            let index = context.index_mut();
            let indexed = match resource_type {
                ResourceType::VirtualMachine => {
                    vm_documents.push(document);
                    continue;
                }
                ResourceType::ManagedDisk => ManagedDisk::new(document.clone()).map(|d| {
                    index.insert_managed_disk(d);
                }),
                ResourceType::AvailabilitySet => AvailabilitySet::new(document.clone()).map(|s| {
                    index.insert_availability_set(s);
                }),
                ResourceType::NetworkInterface => NetworkInterface::new(document.clone()).map(|n| {
                    index.insert_network_interface(n);
                }),
            };
            if let Err(error) = indexed {
                load_failures.push(failure_for(&document, error));
            }
        }

        let mut virtual_machines = Vec::with_capacity(vm_documents.len());
        for document in vm_documents {
            match VirtualMachine::new(document.clone(), context.index()) {
                Ok(vm) => virtual_machines.push(vm),
                Err(error) => load_failures.push(failure_for(&document, error)),
            }
        }

        for failure in &load_failures {
            log::error!("Failed to load {failure}");
        }
        log::info!(
            "Indexed {} managed disks, {} availability sets, {} NICs, {} VMs",
            context.index().managed_disks().len(),
            context.index().availability_sets().len(),
            context.index().network_interfaces().len(),
            virtual_machines.len()
        );

        Subscription {
            context,
            virtual_machines,
            load_failures,
        }
    }

    /// Stage 2: phase 2 for every VM, run concurrently.
    ///
    /// Returns the VMs whose initialization stopped early. Those VMs stay in
    /// the subscription, initialized up to the failing step.
    pub async fn initialize_children(&mut self) -> Vec<ResourceFailure> {
        let context = &self.context;
        let results = join_all(self.virtual_machines.iter_mut().map(|vm| async move {
            vm.initialize_children(context)
                .await
                .map_err(|error| ResourceFailure {
                    resource: vm.id().to_string(),
                    error,
                })
        }))
        .await;

        let failures: Vec<ResourceFailure> = results.into_iter().filter_map(|r| r.err()).collect();
        for failure in &failures {
            log::error!("Failed to initialize {failure}");
        }
        failures
    }

    /// Phase 2 for a single VM.
    pub async fn initialize_virtual_machine(&mut self, id: &ResourceId) -> Result<()> {
        let context = &self.context;
        let vm = find_mut(&mut self.virtual_machines, id)?;
        vm.initialize_children(context).await
    }

    /// Replace one VM's document from the provider (see [`VirtualMachine::refresh`]).
    pub async fn refresh_virtual_machine(&mut self, id: &ResourceId) -> Result<()> {
        let provider = self.context.provider();
        let vm = find_mut(&mut self.virtual_machines, id)?;
        vm.refresh(provider).await
    }

    pub fn context(&self) -> &SubscriptionContext {
        &self.context
    }

    pub fn subscription_id(&self) -> &str {
        self.context.subscription_id()
    }

    pub fn virtual_machines(&self) -> &[VirtualMachine] {
        &self.virtual_machines
    }

    pub fn virtual_machine(&self, id: &ResourceId) -> Option<&VirtualMachine> {
        let key = id.key();
        self.virtual_machines.iter().find(|vm| vm.id().key() == key)
    }

    pub fn load_failures(&self) -> &[ResourceFailure] {
        &self.load_failures
    }

    /// VMs of an availability set, in resolution order.
    pub fn availability_set_members(&self, set_id: &ResourceId) -> Vec<&VirtualMachine> {
        self.context
            .index()
            .availability_set_members(set_id)
            .iter()
            .filter_map(|vm_id| self.virtual_machine(vm_id))
            .collect()
    }

    pub fn network_interface_owner(&self, nic_id: &ResourceId) -> Option<&VirtualMachine> {
        self.context
            .index()
            .network_interface_owner(nic_id)
            .and_then(|vm_id| self.virtual_machine(&vm_id))
    }

    pub fn managed_disk_attachments(&self, disk_id: &ResourceId) -> Vec<DiskAttachment> {
        self.context.index().managed_disk_attachments(disk_id)
    }
}

fn find_mut<'a>(vms: &'a mut [VirtualMachine], id: &ResourceId) -> Result<&'a mut VirtualMachine> {
    let key = id.key();
    vms.iter_mut()
        .find(|vm| vm.id().key() == key)
        .ok_or_else(|| ArmError::not_found("virtual machine", id.as_str()))
}

fn failure_for(document: &ResourceDocument, error: ArmError) -> ResourceFailure {
    let resource = document
        .str_at(&["id"])
        .or_else(|| document.str_at(&["name"]))
        .unwrap_or("<unnamed resource>")
        .to_string();
    ResourceFailure { resource, error }
}
