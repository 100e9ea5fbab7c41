//! Catalog request de-duplication using moka
//!
//! Identical catalog requests issued while one is in flight, or shortly
//! after it succeeded, share a single backend call. Failures are never
//! remembered, so a manual retry always reaches the backend. A zero window
//! disables sharing altogether.

use campus_core::{CatalogId, CatalogOption, DashboardError};
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Identity of a catalog request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKey {
    /// All faculties
    Faculties,
    /// Schools of one faculty, or all schools
    Schools(Option<CatalogId>),
    /// All spaces
    Spaces,
}

/// Short-lived request coalescing for catalog lists
#[derive(Debug, Clone)]
pub struct RequestDedup {
    inner: Option<Cache<CatalogKey, Arc<Vec<CatalogOption>>>>,
}

impl RequestDedup {
    /// Create with max distinct requests and sharing window
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        if ttl.is_zero() || max_capacity == 0 {
            return Self::disabled();
        }
        Self {
            inner: Some(
                Cache::builder()
                    .max_capacity(max_capacity)
                    .time_to_live(ttl)
                    .build(),
            ),
        }
    }

    /// Every request reaches the backend
    #[inline]
    #[must_use]
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Share an in-flight or recent result, or run `fetch`
    ///
    /// # Errors
    /// Returns the error of the backend call; it is not remembered.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: CatalogKey,
        fetch: F,
    ) -> Result<Arc<Vec<CatalogOption>>, DashboardError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<CatalogOption>, DashboardError>>,
    {
        let Some(cache) = &self.inner else {
            return fetch().await.map(Arc::new);
        };
        cache
            .try_get_with(key, async move { fetch().await.map(Arc::new) })
            .await
            .map_err(|err| (*err).clone())
    }

    /// Forget every remembered result
    #[inline]
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.inner {
            cache.invalidate_all();
        }
    }
}

impl Default for RequestDedup {
    fn default() -> Self {
        Self::new(64, Duration::from_secs(2))
    }
}
