//! Availability set (`Microsoft.Compute/availabilitySets`).

use super::{ArmResource, ResourceDocument, ResourceId};
use crate::error::Result;
use std::fmt;

/// An availability set. Member VMs are tracked by the resource index.
#[derive(Debug, Clone)]
pub struct AvailabilitySet {
    resource: ArmResource,
}

impl AvailabilitySet {
    pub fn new(document: ResourceDocument) -> Result<AvailabilitySet> {
        Ok(AvailabilitySet {
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

    pub fn platform_fault_domain_count(&self) -> Option<u64> {
        self.resource
            .document()
            .u64_at(&["properties", "platformFaultDomainCount"])
    }

    pub fn platform_update_domain_count(&self) -> Option<u64> {
        self.resource
            .document()
            .u64_at(&["properties", "platformUpdateDomainCount"])
    }

    /// `Aligned` for managed-disk sets, `Classic` otherwise.
    pub fn sku_name(&self) -> Option<&str> {
        self.resource.document().str_at(&["sku", "name"])
    }
}

impl fmt::Display for AvailabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
