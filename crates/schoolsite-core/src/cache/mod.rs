//! In-memory caching of backend resources.
//!
//! This module provides [`ResourceCache`], a single-flight cache that every
//! consumer shares so a resource is fetched at most once at a time. Entries
//! live for the lifetime of the process; nothing is written to disk.
//!
//! Per key the cache moves through `Empty -> Pending -> Resolved`. A failed
//! load goes back to `Empty` so the next access retries, and
//! [`ResourceCache::invalidate`] turns `Resolved` back into `Empty`. A load
//! that is invalidated while in flight settles as `Stale`: readable, but
//! reloaded on the next access.

pub mod error;
pub mod key;
pub mod resource;

pub use error::CacheError;
pub use key::ResourceKey;
pub use resource::{CacheStatus, ResourceCache};
