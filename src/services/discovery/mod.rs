//! Discovery module
//!
//! - `types`: registry listing wire format and UP-instance extraction
//! - `cache`: concurrent service table with merge semantics
//! - `fetch`: one-shot fetch and the background fetch loop

pub mod cache;
pub mod fetch;
pub mod types;

pub use cache::{DiscoveryCache, SharedDiscoveryCache};
pub use fetch::RegistryFetcher;
