//! State shared by every ARM resource (identity, location, tags).

use super::{ResourceDocument, ResourceId};
use crate::error::Result;
use std::collections::BTreeMap;

/// Generic ARM resource: identity plus the current backing document.
///
/// Identity (`id`, `name`) is read once at construction. Everything else is
/// read from the document on demand, so it follows [`ArmResource::set_document`].
#[derive(Debug, Clone)]
pub struct ArmResource {
    id: ResourceId,
    name: String,
    document: ResourceDocument,
    tags: BTreeMap<String, String>,
}

impl ArmResource {
    pub fn new(document: ResourceDocument) -> Result<ArmResource> {
        let id = ResourceId::new(document.require_str(&["id"])?);
        let name = document.require_str(&["name"])?.to_string();
        Ok(ArmResource {
            id,
            name,
            document,
            tags: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> &str {
        self.document.str_at(&["type"]).unwrap_or_default()
    }

    pub fn location(&self) -> Option<&str> {
        self.document.str_at(&["location"])
    }

    pub fn resource_group_name(&self) -> Option<&str> {
        self.id.resource_group()
    }

    pub fn document(&self) -> &ResourceDocument {
        &self.document
    }

    pub fn set_document(&mut self, document: ResourceDocument) {
        self.document = document;
    }

    /// Tags collected by [`ArmResource::initialize_children`].
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Child state common to all resource types. Rebuilt from scratch on each call.
    pub fn initialize_children(&mut self) {
        self.tags = self
            .document
            .get(&["tags"])
            .and_then(|t| t.as_object())
            .map(|map| {
                map.iter()
                    .map(|(k, v)| {
                        let value = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                        (k.clone(), value)
                    })
                    .collect()
            })
            .unwrap_or_default();
        log::trace!("{} tags={:?}", self.name, self.tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArmError;
    use serde_json::json;

    #[test]
    fn test_resource_requires_id_and_name() {
        let err = ArmResource::new(ResourceDocument::new(json!({ "name": "x" }))).unwrap_err();
        assert!(matches!(err, ArmError::MalformedDocument { .. }));
    }

    #[test]
    fn test_resource_tags_and_group() {
        let mut resource = ArmResource::new(ResourceDocument::new(json!({
            "id": "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1",
            "name": "vm1",
            "type": "Microsoft.Compute/virtualMachines",
            "location": "eastus",
            "tags": { "env": "prod", "tier": 2 }
        })))
        .expect("valid resource");

        assert!(resource.tags().is_empty());
        resource.initialize_children();
        assert_eq!(resource.tags().get("env").map(String::as_str), Some("prod"));
        assert_eq!(resource.tags().get("tier").map(String::as_str), Some("2"));
        assert_eq!(resource.resource_group_name(), Some("rg1"));
        assert_eq!(resource.location(), Some("eastus"));
        assert_eq!(resource.resource_type(), "Microsoft.Compute/virtualMachines");
    }
}
