//! Shared, read-mostly state that phase 2 resolves against.

use super::ResourceIndex;
use crate::azure::ResourceProvider;
use crate::error::Result;
use crate::models::{
    normalize_key, AvailabilitySet, Location, NetworkInterface, ResourceGroup, ResourceId, VmSize,
};
use std::collections::HashMap;
use std::sync::Arc;

pub struct SubscriptionContext {
    subscription_id: String,
    provider: Arc<dyn ResourceProvider>,
    index: ResourceIndex,
    resource_groups: HashMap<String, ResourceGroup>,
    locations: HashMap<String, Location>,
}

impl SubscriptionContext {
    pub fn new(
        subscription_id: impl Into<String>,
        provider: Arc<dyn ResourceProvider>,
        resource_groups: Vec<ResourceGroup>,
        locations: Vec<Location>,
    ) -> SubscriptionContext {
        SubscriptionContext {
            subscription_id: subscription_id.into(),
            provider,
            index: ResourceIndex::default(),
            resource_groups: resource_groups
                .into_iter()
                .map(|rg| (normalize_key(&rg.name), rg))
                .collect(),
            locations: locations
                .into_iter()
                .map(|loc| (normalize_key(&loc.name), loc))
                .collect(),
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn provider(&self) -> &dyn ResourceProvider {
        self.provider.as_ref()
    }

    pub fn index(&self) -> &ResourceIndex {
        &self.index
    }

    pub(crate) fn index_mut(&mut self) -> &mut ResourceIndex {
        &mut self.index
    }

    pub fn resource_group(&self, name: &str) -> Option<&ResourceGroup> {
        self.resource_groups.get(&normalize_key(name))
    }

    pub fn location(&self, name: &str) -> Option<&Location> {
        self.locations.get(&normalize_key(name))
    }

    /// Size descriptor for `size_name` in the location of `resource_group`.
    /// `None` when the group, its location or the size is unknown.
    pub fn seek_vm_size(&self, resource_group: Option<&str>, size_name: &str) -> Option<VmSize> {
        let group = self.resource_group(resource_group?)?;
        let location = self.location(group.location.as_deref()?)?;
        location.seek_vm_size(size_name).cloned()
    }

    /// Availability set by id: index first, then the provider.
    /// Absence and lookup failures both yield `None`.
    pub async fn resolve_availability_set(&self, id: &ResourceId) -> Option<Arc<AvailabilitySet>> {
        if let Some(set) = self.index.find_availability_set(id) {
            return Some(set);
        }
        log::debug!("Availability set {id} not indexed, asking provider");
        match self.provider.fetch_availability_set(id).await {
            Ok(Some(document)) => match AvailabilitySet::new(document) {
                Ok(set) => Some(Arc::new(set)),
                Err(e) => {
                    log::warn!("Ignoring availability set {id}: {e}");
                    None
                }
            },
            Ok(None) => {
                log::warn!("Availability set {id} does not exist");
                None
            }
            Err(e) => {
                log::warn!("Availability set {id} unresolved: {e}");
                None
            }
        }
    }

    /// Network interface by id: index first, then the provider.
    pub async fn network_interface(&self, id: &ResourceId) -> Result<Arc<NetworkInterface>> {
        if let Some(nic) = self.index.find_network_interface(id) {
            return Ok(nic);
        }
        log::debug!("NIC {id} not indexed, asking provider");
        let document = self.provider.fetch_network_interface(id).await?;
        Ok(Arc::new(NetworkInterface::new(document)?))
    }
}
