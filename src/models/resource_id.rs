//! Azure Resource Manager resource identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A provider-assigned resource id such as
/// `/subscriptions/<sub>/resourceGroups/<rg>/providers/Microsoft.Compute/disks/<name>`.
///
/// ARM compares ids case-insensitively, so lookups go through [`ResourceId::key`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> ResourceId {
        ResourceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Normalised lookup key.
    pub fn key(&self) -> String {
        normalize_key(&self.0)
    }

    /// Last path segment (the resource name).
    pub fn name(&self) -> &str {
        self.0.trim_end_matches('/').rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn resource_group(&self) -> Option<&str> {
        self.segment_after("resourceGroups")
    }

    pub fn subscription_id(&self) -> Option<&str> {
        self.segment_after("subscriptions")
    }

    fn segment_after(&self, label: &str) -> Option<&str> {
        let mut parts = self.0.split('/').filter(|p| !p.is_empty());
        while let Some(part) = parts.next() {
            if part.eq_ignore_ascii_case(label) {
                return parts.next();
            }
        }
        None
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        ResourceId::new(s)
    }
}

/// Case-insensitive key used by every index table.
pub fn normalize_key(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}
