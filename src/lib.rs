// cargo watch -x 'fmt' -x 'run'

//! Builds a cross-referenced snapshot of a subscription's virtual machines
//! (disks, NICs, availability sets, sizes) from ARM resource documents.
//!
//! Loading is a two-stage pipeline:
//! 1. [`Subscription::load`] indexes every resource and constructs each VM.
//! 2. [`Subscription::initialize_children`] links VMs to their siblings.

pub mod azure;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod subscription;

use azure::{AzCliProvider, ResourceProvider, Snapshot, SnapshotProvider};
use config::Settings;
use std::sync::Arc;

pub use error::{ArmError, Result};
pub use subscription::{ResourceFailure, Subscription};

/// Provider for phase-2 fetches: the snapshot itself when offline, else the Azure CLI.
pub fn build_provider(settings: &Settings, snapshot: &Snapshot) -> Arc<dyn ResourceProvider> {
    if settings.offline {
        log::info!("Offline: serving lookups from the snapshot");
        Arc::new(SnapshotProvider::new(snapshot))
    } else {
        Arc::new(AzCliProvider::new(settings.subscription_id.clone()))
    }
}

/// Read the snapshot (cache or Azure), then run both pipeline stages.
///
/// Returns the subscription and the VMs whose phase 2 stopped early.
pub async fn load_topology(settings: &Settings) -> Result<(Subscription, Vec<ResourceFailure>)> {
    let snapshot = azure::read_snapshot_cache(&settings.subscription_id, settings.cache_file.as_deref())?;
    let provider = build_provider(settings, &snapshot);

    let mut subscription = Subscription::load(snapshot, provider);
    let failures = subscription.initialize_children().await;
    Ok((subscription, failures))
}
