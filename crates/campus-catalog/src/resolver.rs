//! Catalog resolver
//!
//! Loads faculty, school and space options for the filter selectors:
//! - Faculty and school lists come from the backend only for roles with
//!   unrestricted browsing; a supervisor gets a synthetic single-entry school
//!   list built from the role and never triggers those calls
//! - Every load captures its dimension's generation at dispatch and commits
//!   only if no newer load of that dimension was dispatched meanwhile
//! - Errors are kept per dimension and never block the other dimensions

use campus_core::{
    CatalogDimension, CatalogId, CatalogOption, CatalogService, DashboardConfig, DashboardError,
    LoadStatus, RoleContext,
};
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::dedup::{CatalogKey, RequestDedup};

/// Result of a load that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Options were committed
    Applied(Vec<CatalogOption>),
    /// A newer load of the same dimension was dispatched; nothing was committed
    Superseded,
}

impl LoadOutcome {
    /// Whether the load was committed
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Read-only view of the resolver state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSnapshot {
    /// Faculty options
    pub faculties: Vec<CatalogOption>,
    /// School options
    pub schools: Vec<CatalogOption>,
    /// Space options, unfiltered
    pub spaces: Vec<CatalogOption>,
    /// Faculty load status
    pub faculty_status: LoadStatus,
    /// School load status
    pub school_status: LoadStatus,
    /// Space load status
    pub space_status: LoadStatus,
}

#[derive(Debug, Default)]
struct Dimension {
    options: Vec<CatalogOption>,
    status: LoadStatus,
    generation: u64,
}

#[derive(Debug, Default)]
struct ResolverState {
    faculties: Dimension,
    schools: Dimension,
    spaces: Dimension,
}

impl ResolverState {
    fn dimension_mut(&mut self, dimension: CatalogDimension) -> &mut Dimension {
        match dimension {
            CatalogDimension::Faculty => &mut self.faculties,
            CatalogDimension::School => &mut self.schools,
            CatalogDimension::Space => &mut self.spaces,
        }
    }
}

/// Role-scoped loader of catalog options
#[derive(Debug)]
pub struct CatalogResolver<S: ?Sized> {
    service: Arc<S>,
    role: RoleContext,
    state: Arc<Mutex<ResolverState>>,
    dedup: RequestDedup,
}

impl<S: ?Sized> Clone for CatalogResolver<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            role: self.role.clone(),
            state: Arc::clone(&self.state),
            dedup: self.dedup.clone(),
        }
    }
}

impl<S> CatalogResolver<S>
where
    S: CatalogService + ?Sized,
{
    /// Create resolver for a session role
    #[must_use]
    pub fn new(service: Arc<S>, role: RoleContext) -> Self {
        Self::with_dedup(service, role, RequestDedup::default())
    }

    /// Create resolver with de-duplication sized from configuration
    #[must_use]
    pub fn from_config(service: Arc<S>, role: RoleContext, config: &DashboardConfig) -> Self {
        let dedup = RequestDedup::new(config.catalog_dedup_capacity, config.catalog_dedup_ttl());
        Self::with_dedup(service, role, dedup)
    }

    /// Create resolver with an explicit de-duplication layer
    #[must_use]
    pub fn with_dedup(service: Arc<S>, role: RoleContext, dedup: RequestDedup) -> Self {
        Self {
            service,
            role,
            state: Arc::new(Mutex::new(ResolverState::default())),
            dedup,
        }
    }

    /// Role the resolver is scoped to
    #[inline]
    #[must_use]
    pub fn role(&self) -> &RoleContext {
        &self.role
    }

    /// Load faculties; empty without a backend call unless browsing is allowed
    ///
    /// # Errors
    /// Returns the backend error of a current (not superseded) load
    pub async fn load_faculties(&self) -> Result<LoadOutcome, DashboardError> {
        if !self.role.can_browse_catalog() {
            return Ok(self.settle_local(CatalogDimension::Faculty, Vec::new()));
        }
        let service = Arc::clone(&self.service);
        self.run(CatalogDimension::Faculty, CatalogKey::Faculties, move || async move {
            service.faculties().await
        })
        .await
    }

    /// Load schools of a faculty, or of every faculty when `faculty_id` is `None`
    ///
    /// # Errors
    /// Returns the backend error of a current (not superseded) load
    pub async fn load_schools(
        &self,
        faculty_id: Option<CatalogId>,
    ) -> Result<LoadOutcome, DashboardError> {
        match &self.role {
            RoleContext::Supervisor {
                escuela_id,
                escuela_nombre,
            } => {
                let pinned = CatalogOption::new(*escuela_id, escuela_nombre.clone());
                Ok(self.settle_local(CatalogDimension::School, vec![pinned]))
            }
            RoleContext::Other => Ok(self.settle_local(CatalogDimension::School, Vec::new())),
            RoleContext::Administrative => {
                let service = Arc::clone(&self.service);
                self.run(
                    CatalogDimension::School,
                    CatalogKey::Schools(faculty_id),
                    move || async move { service.schools(faculty_id).await },
                )
                .await
            }
        }
    }

    /// Load every space
    ///
    /// # Errors
    /// Returns the backend error of a current (not superseded) load
    pub async fn load_spaces(&self) -> Result<LoadOutcome, DashboardError> {
        let service = Arc::clone(&self.service);
        self.run(CatalogDimension::Space, CatalogKey::Spaces, move || async move {
            service.spaces().await
        })
        .await
    }

    /// Load all three dimensions concurrently; failures stay per dimension
    pub async fn load_all(&self, faculty_id: Option<CatalogId>) -> CatalogSnapshot {
        let (faculties, schools, spaces) = tokio::join!(
            self.load_faculties(),
            self.load_schools(faculty_id),
            self.load_spaces()
        );
        for (dimension, result) in [
            (CatalogDimension::Faculty, faculties),
            (CatalogDimension::School, schools),
            (CatalogDimension::Space, spaces),
        ] {
            if let Err(err) = result {
                tracing::debug!(%dimension, error = %err, "catalog dimension unavailable");
            }
        }
        self.snapshot()
    }

    /// Drop remembered results, then load everything again
    pub async fn refresh_all(&self, faculty_id: Option<CatalogId>) -> CatalogSnapshot {
        self.dedup.invalidate_all();
        self.load_all(faculty_id).await
    }

    /// Discard every pending load, e.g. when the view goes away
    pub fn cancel_all(&self) {
        let mut state = self.state.lock();
        for dimension in [
            CatalogDimension::Faculty,
            CatalogDimension::School,
            CatalogDimension::Space,
        ] {
            let slot = state.dimension_mut(dimension);
            slot.generation += 1;
            slot.status.abandon();
        }
        tracing::debug!("pending catalog loads cancelled");
    }

    /// Dismiss the error banner of one dimension
    pub fn dismiss_error(&self, dimension: CatalogDimension) {
        self.state.lock().dimension_mut(dimension).status.dismiss_error();
    }

    /// Options currently committed for one dimension
    #[must_use]
    pub fn options(&self, dimension: CatalogDimension) -> Vec<CatalogOption> {
        self.state.lock().dimension_mut(dimension).options.clone()
    }

    /// Load status of one dimension
    #[must_use]
    pub fn status(&self, dimension: CatalogDimension) -> LoadStatus {
        self.state.lock().dimension_mut(dimension).status.clone()
    }

    /// Copy of the whole resolver state
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state.lock();
        CatalogSnapshot {
            faculties: state.faculties.options.clone(),
            schools: state.schools.options.clone(),
            spaces: state.spaces.options.clone(),
            faculty_status: state.faculties.status.clone(),
            school_status: state.schools.status.clone(),
            space_status: state.spaces.status.clone(),
        }
    }

    async fn run<F, Fut>(
        &self,
        dimension: CatalogDimension,
        key: CatalogKey,
        fetch: F,
    ) -> Result<LoadOutcome, DashboardError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<CatalogOption>, DashboardError>>,
    {
        let generation = self.dispatch(dimension);
        tracing::debug!(%dimension, ?key, generation, "catalog load dispatched");
        let result = self.dedup.get_or_fetch(key, fetch).await;
        self.commit(dimension, generation, result.map(|options| options.to_vec()))
    }

    fn dispatch(&self, dimension: CatalogDimension) -> u64 {
        let mut state = self.state.lock();
        let slot = state.dimension_mut(dimension);
        slot.generation += 1;
        slot.status.begin();
        slot.generation
    }

    fn commit(
        &self,
        dimension: CatalogDimension,
        generation: u64,
        result: Result<Vec<CatalogOption>, DashboardError>,
    ) -> Result<LoadOutcome, DashboardError> {
        let mut state = self.state.lock();
        let slot = state.dimension_mut(dimension);
        if slot.generation != generation {
            tracing::debug!(%dimension, generation, current = slot.generation, "stale catalog load discarded");
            return Ok(LoadOutcome::Superseded);
        }
        match result {
            Ok(options) => {
                tracing::debug!(%dimension, count = options.len(), "catalog options committed");
                slot.options.clone_from(&options);
                slot.status.succeed(Utc::now());
                Ok(LoadOutcome::Applied(options))
            }
            Err(err) => {
                tracing::warn!(%dimension, error = %err, "catalog load failed");
                slot.status.fail(err.user_message());
                Err(err)
            }
        }
    }

    /// Commit a list that needs no backend call, superseding pending loads
    fn settle_local(&self, dimension: CatalogDimension, options: Vec<CatalogOption>) -> LoadOutcome {
        let generation = self.dispatch(dimension);
        self.commit(dimension, generation, Ok(options))
            .unwrap_or(LoadOutcome::Superseded)
    }
}
