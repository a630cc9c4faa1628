//! Azure CLI and Graph API interaction.
//!
//! This module handles all Azure-related operations:
//! - [`cli`] - Command execution for Azure CLI
//! - [`cache`] - Caching of subscription snapshots
//! - [`graph`] - Azure Resource Graph queries
//! - [`provider`] - Per-resource fetches used by phase 2 and refresh

mod cache;
mod cli;
mod graph;
mod provider;

// Re-export public types and functions
pub use cache::{default_cache_file, load_snapshot, read_snapshot_cache};
pub use cli::run;
pub use graph::{run_az_cli_graph, run_az_cli_snapshot, GraphPage, Snapshot};
pub use provider::{AzCliProvider, ResourceProvider, SnapshotProvider};
