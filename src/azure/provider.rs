//! Remote lookups used during phase 2 and refresh.
//!
//! [`ResourceProvider`] is what the topology needs from the transport.
//! [`AzCliProvider`] answers through the Azure CLI; [`SnapshotProvider`]
//! answers from an already loaded snapshot (offline runs and tests).

use super::{cli, Snapshot};
use crate::error::{ArmError, Result};
use crate::models::{ResourceDocument, ResourceId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

#[async_trait]
pub trait ResourceProvider: Send + Sync {
    async fn fetch_network_interface(&self, id: &ResourceId) -> Result<ResourceDocument>;

    /// `Ok(None)` when the set does not exist.
    async fn fetch_availability_set(&self, id: &ResourceId) -> Result<Option<ResourceDocument>>;

    async fn fetch_virtual_machine_document(&self, id: &ResourceId) -> Result<ResourceDocument>;
}

/// Provider backed by `az ... show --ids <id>`.
#[derive(Debug, Clone)]
pub struct AzCliProvider {
    subscription_id: String,
}

impl AzCliProvider {
    pub fn new(subscription_id: impl Into<String>) -> AzCliProvider {
        AzCliProvider {
            subscription_id: subscription_id.into(),
        }
    }

    async fn show(&self, kind: &'static str, command: &str, id: &ResourceId) -> Result<ResourceDocument> {
        let cmd = format!(
            "az {command} show --ids '{id}' --subscription {sub} --output json",
            sub = self.subscription_id
        );
        let output = match cli::run_async(cmd).await {
            Ok(output) => output,
            Err(ArmError::Transport(message)) if cli::is_not_found(&message) => {
                return Err(ArmError::not_found(kind, id.as_str()));
            }
            Err(e) => return Err(e),
        };
        let mut deserializer = serde_json::Deserializer::from_str(&output);
        let document: ResourceDocument = serde_path_to_error::deserialize(&mut deserializer)?;
        Ok(document)
    }
}

#[async_trait]
impl ResourceProvider for AzCliProvider {
    async fn fetch_network_interface(&self, id: &ResourceId) -> Result<ResourceDocument> {
        self.show("network interface", "network nic", id).await
    }

    async fn fetch_availability_set(&self, id: &ResourceId) -> Result<Option<ResourceDocument>> {
        match self.show("availability set", "vm availability-set", id).await {
            Ok(document) => Ok(Some(document)),
            Err(ArmError::ResourceNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_virtual_machine_document(&self, id: &ResourceId) -> Result<ResourceDocument> {
        self.show("virtual machine", "vm", id).await
    }
}

/// Provider that serves documents from memory, keyed by resource id.
#[derive(Debug, Default)]
pub struct SnapshotProvider {
    documents: Mutex<HashMap<String, ResourceDocument>>,
    fetches: AtomicUsize,
}

impl SnapshotProvider {
    pub fn new(snapshot: &Snapshot) -> SnapshotProvider {
        let provider = SnapshotProvider::default();
        for document in &snapshot.resources {
            provider.upsert(document.clone());
        }
        provider
    }

    /// Add or replace a document. Documents without an `id` are ignored.
    pub fn upsert(&self, document: ResourceDocument) {
        let Some(id) = document.str_at(&["id"]).map(ResourceId::new) else {
            log::warn!("SnapshotProvider: ignoring document without id");
            return;
        };
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.key(), document);
    }

    /// Number of fetch calls answered so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    async fn get(&self, id: &ResourceId) -> Option<ResourceDocument> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        // Suspend like a remote call would.
        tokio::task::yield_now().await;
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id.key())
            .cloned()
    }
}

#[async_trait]
impl ResourceProvider for SnapshotProvider {
    async fn fetch_network_interface(&self, id: &ResourceId) -> Result<ResourceDocument> {
        self.get(id)
            .await
            .ok_or_else(|| ArmError::not_found("network interface", id.as_str()))
    }

    async fn fetch_availability_set(&self, id: &ResourceId) -> Result<Option<ResourceDocument>> {
        Ok(self.get(id).await)
    }

    async fn fetch_virtual_machine_document(&self, id: &ResourceId) -> Result<ResourceDocument> {
        self.get(id)
            .await
            .ok_or_else(|| ArmError::not_found("virtual machine", id.as_str()))
    }
}
