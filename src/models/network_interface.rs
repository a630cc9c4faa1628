//! Network interface (`Microsoft.Network/networkInterfaces`).

use super::{ArmResource, ResourceDocument, ResourceId};
use crate::error::Result;
use std::fmt;

#[derive(Debug, Clone)]
pub struct NetworkInterface {
    resource: ArmResource,
}

impl NetworkInterface {
    pub fn new(document: ResourceDocument) -> Result<NetworkInterface> {
        Ok(NetworkInterface {
            resource: ArmResource::new(document)?,
        })
    }

    pub fn id(&self) -> &ResourceId {
        self.resource.id()
    }

    pub fn name(&self) -> &str {
        self.resource.name()
    }

    /// `properties.primary`; absent means not primary.
    pub fn is_primary(&self) -> bool {
        self.resource
            .document()
            .bool_at(&["properties", "primary"])
            .unwrap_or(false)
    }

    pub fn enable_accelerated_networking(&self) -> bool {
        self.resource
            .document()
            .bool_at(&["properties", "enableAcceleratedNetworking"])
            .unwrap_or(false)
    }

    pub fn private_ip_addresses(&self) -> Vec<&str> {
        self.ip_configuration_field(&["properties", "privateIPAddress"])
    }

    pub fn subnet_ids(&self) -> Vec<&str> {
        self.ip_configuration_field(&["properties", "subnet", "id"])
    }

    fn ip_configuration_field(&self, path: &[&str]) -> Vec<&str> {
        self.resource
            .document()
            .array_at(&["properties", "ipConfigurations"])
            .unwrap_or_default()
            .iter()
            .filter_map(|cfg| {
                path.iter()
                    .try_fold(cfg, |v, key| v.get(*key))
                    .and_then(|v| v.as_str())
            })
            .collect()
    }
}

impl fmt::Display for NetworkInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
