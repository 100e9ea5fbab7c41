//! Report board
//!
//! Loads the three statistics resources concurrently. Each resource keeps its
//! own load status; a failed resource keeps its previous data and never
//! blocks the others.

use campus_core::{
    DashboardError, GeneralStats, LoadStatus, MonthlyReservations, ReportService, SpaceUsage,
};
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Statistics resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportResource {
    GeneralStats,
    SpaceUsage,
    MonthlyReservations,
}

impl fmt::Display for ReportResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GeneralStats => write!(f, "estadisticas-generales"),
            Self::SpaceUsage => write!(f, "uso-espacios"),
            Self::MonthlyReservations => write!(f, "reservas-mes"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceState<T> {
    pub data: T,
    pub status: LoadStatus,
    #[serde(skip)]
    generation: u64,
}

/// Copy of the whole board
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSnapshot {
    pub general: ResourceState<Option<GeneralStats>>,
    pub usage: ResourceState<Vec<SpaceUsage>>,
    pub monthly: ResourceState<Vec<MonthlyReservations>>,
}

impl ReportSnapshot {
    /// Status of one resource
    #[must_use]
    pub fn status(&self, resource: ReportResource) -> &LoadStatus {
        match resource {
            ReportResource::GeneralStats => &self.general.status,
            ReportResource::SpaceUsage => &self.usage.status,
            ReportResource::MonthlyReservations => &self.monthly.status,
        }
    }

    fn status_mut(&mut self, resource: ReportResource) -> &mut LoadStatus {
        match resource {
            ReportResource::GeneralStats => &mut self.general.status,
            ReportResource::SpaceUsage => &mut self.usage.status,
            ReportResource::MonthlyReservations => &mut self.monthly.status,
        }
    }
}

/// Statistics view state
#[derive(Debug)]
pub struct ReportBoard<S: ?Sized> {
    service: Arc<S>,
    state: Arc<Mutex<ReportSnapshot>>,
}

impl<S: ?Sized> Clone for ReportBoard<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S> ReportBoard<S>
where
    S: ReportService + ?Sized,
{
    #[must_use]
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(ReportSnapshot::default())),
        }
    }

    /// Load every resource concurrently; failures stay per resource
    pub async fn load_all(&self) -> ReportSnapshot {
        let (general, usage, monthly) = tokio::join!(
            self.load_general_stats(),
            self.load_space_usage(),
            self.load_monthly_reservations()
        );
        for (resource, result) in [
            (ReportResource::GeneralStats, general),
            (ReportResource::SpaceUsage, usage),
            (ReportResource::MonthlyReservations, monthly),
        ] {
            if let Err(err) = result {
                tracing::debug!(%resource, error = %err, "report resource unavailable");
            }
        }
        self.snapshot()
    }

    /// # Errors
    /// Returns the normalized error of a current load
    pub async fn load_general_stats(&self) -> Result<(), DashboardError> {
        let service = Arc::clone(&self.service);
        self.run(
            ReportResource::GeneralStats,
            |board| &mut board.general,
            Some,
            async move { service.general_stats().await },
        )
        .await
    }

    /// # Errors
    /// Returns the normalized error of a current load
    pub async fn load_space_usage(&self) -> Result<(), DashboardError> {
        let service = Arc::clone(&self.service);
        self.run(
            ReportResource::SpaceUsage,
            |board| &mut board.usage,
            std::convert::identity,
            async move { service.space_usage().await },
        )
        .await
    }

    /// # Errors
    /// Returns the normalized error of a current load
    pub async fn load_monthly_reservations(&self) -> Result<(), DashboardError> {
        let service = Arc::clone(&self.service);
        self.run(
            ReportResource::MonthlyReservations,
            |board| &mut board.monthly,
            std::convert::identity,
            async move { service.monthly_reservations().await },
        )
        .await
    }

    pub fn dismiss_error(&self, resource: ReportResource) {
        self.state.lock().status_mut(resource).dismiss_error();
    }

    #[must_use]
    pub fn snapshot(&self) -> ReportSnapshot {
        self.state.lock().clone()
    }

    async fn run<T, D, Fut>(
        &self,
        resource: ReportResource,
        slot: fn(&mut ReportSnapshot) -> &mut ResourceState<D>,
        into_data: fn(T) -> D,
        fetch: Fut,
    ) -> Result<(), DashboardError>
    where
        Fut: Future<Output = Result<T, DashboardError>>,
    {
        let generation = {
            let mut board = self.state.lock();
            let entry = slot(&mut board);
            entry.generation += 1;
            entry.status.begin();
            entry.generation
        };
        let result = fetch.await;

        let mut board = self.state.lock();
        let entry = slot(&mut board);
        if entry.generation != generation {
            tracing::debug!(%resource, generation, "stale report discarded");
            return Ok(());
        }
        match result {
            Ok(value) => {
                entry.data = into_data(value);
                entry.status.succeed(Utc::now());
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%resource, error = %err, "report load failed");
                entry.status.fail(err.user_message());
                Err(err)
            }
        }
    }
}
