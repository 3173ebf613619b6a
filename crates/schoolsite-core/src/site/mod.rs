//! The school site facade.
//!
//! [`SchoolSite`] is what the front end talks to. It pairs the shared
//! [`ResourceCache`] with the [`SchoolClient`] loader, so every page asks for
//! the school document the same way and only one request is ever in flight.
//! The [`views`] module turns the resolved document into what each page shows.

pub mod fees;
pub mod views;

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::api::SchoolClient;
use crate::cache::{CacheError, CacheStatus, ResourceCache, ResourceKey};
use crate::config::Config;
use crate::models::SchoolData;

pub use fees::FeeTable;
pub use views::{Lab, MediaTile, Page};

/// Shown when a failed load carries no message of its own.
pub const LOAD_FAILED_FALLBACK: &str = "Failed to load school data.";

pub type SchoolCache = ResourceCache<ResourceKey, Arc<SchoolData>>;

/// What a page renders for a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    /// State for the first, synchronous render: ready when the value is
    /// already cached, loading otherwise.
    pub fn from_cached(cached: Option<T>) -> Self {
        match cached {
            Some(value) => Loadable::Ready(value),
            None => Loadable::Loading,
        }
    }

    pub fn from_result(result: Result<T, CacheError>) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(err) => {
                let message = err.to_string();
                if message.trim().is_empty() {
                    Loadable::Failed(LOAD_FAILED_FALLBACK.to_string())
                } else {
                    Loadable::Failed(message)
                }
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loadable<U> {
        match self {
            Loadable::Loading => Loadable::Loading,
            Loadable::Ready(value) => Loadable::Ready(f(value)),
            Loadable::Failed(message) => Loadable::Failed(message),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Loadable::Ready(_))
    }
}

/// Access to the school document through the shared cache.
/// Clone is cheap; clones share the cache and the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct SchoolSite {
    cache: SchoolCache,
    client: SchoolClient,
}

impl SchoolSite {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_cache(SchoolClient::new(config)?, SchoolCache::new()))
    }

    /// Build a site over an existing cache, so several consumers share it.
    pub fn with_cache(client: SchoolClient, cache: SchoolCache) -> Self {
        Self { cache, client }
    }

    pub fn cache(&self) -> &SchoolCache {
        &self.cache
    }

    pub fn client(&self) -> &SchoolClient {
        &self.client
    }

    /// The school document, fetched at most once however many callers ask.
    pub async fn school_data(&self) -> Result<Arc<SchoolData>, CacheError> {
        let client = self.client.clone();
        self.cache
            .get(ResourceKey::SCHOOL, move || async move {
                client.fetch_school_data().await.map(Arc::new)
            })
            .await
    }

    /// The document if it is already resolved.
    pub fn cached(&self) -> Option<Arc<SchoolData>> {
        self.cache.peek(&ResourceKey::SCHOOL)
    }

    /// Drop the cached document and fetch it again.
    pub async fn refresh(&self) -> Result<Arc<SchoolData>, CacheError> {
        if self.cache.invalidate(&ResourceKey::SCHOOL) {
            debug!("Refreshing school data");
        }
        self.school_data().await
    }

    pub fn status(&self) -> CacheStatus {
        self.cache.status(&ResourceKey::SCHOOL)
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.cache.cached_at(&ResourceKey::SCHOOL)
    }

    /// Initial state for a page, without waiting.
    pub fn initial_state(&self) -> Loadable<Arc<SchoolData>> {
        Loadable::from_cached(self.cached())
    }

    /// Final state for a page once the load has settled.
    pub async fn load(&self) -> Loadable<Arc<SchoolData>> {
        Loadable::from_result(self.school_data().await)
    }
}
