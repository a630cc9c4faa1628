//! Subscription-level indexing and cross-reference resolution.
//!
//! - [`index`] - resource arenas and back-link relation tables
//! - [`context`] - what phase 2 resolves against (index, provider, size catalog)
//! - [`loader`] - the two-stage load / initialize pipeline

mod context;
mod index;
mod loader;

// Re-export public types
pub use context::SubscriptionContext;
pub use index::{DiskAttachment, IndexStats, ResourceIndex};
pub use loader::{ResourceFailure, Subscription};
