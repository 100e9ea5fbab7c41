//! Backend collaborator interfaces
//!
//! The engine only talks to the backend through these traits. The HTTP
//! implementation lives in `campus-client`; tests use in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::rows::{GeneralStats, MonthlyReservations, SpaceUsage};
use crate::types::{CatalogId, CatalogOption};

/// Faculty, school and space reference lists
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// All faculties
    async fn faculties(&self) -> Result<Vec<CatalogOption>, DashboardError>;

    /// Schools, optionally restricted to one faculty
    async fn schools(
        &self,
        faculty_id: Option<CatalogId>,
    ) -> Result<Vec<CatalogOption>, DashboardError>;

    /// All spaces, each linked to its school
    async fn spaces(&self) -> Result<Vec<CatalogOption>, DashboardError>;
}

/// Authoritative row fetch for one effective query type
#[async_trait]
pub trait RowSource<Q>: Send + Sync {
    /// Row type produced
    type Row: Clone + Send + Sync + 'static;

    /// Fetch every row matching the query
    async fn fetch_rows(&self, query: &Q) -> Result<Vec<Self::Row>, DashboardError>;
}

/// Aggregate usage statistics
#[async_trait]
pub trait ReportService: Send + Sync {
    /// Headline figures
    async fn general_stats(&self) -> Result<GeneralStats, DashboardError>;

    /// Usage per space
    async fn space_usage(&self) -> Result<Vec<SpaceUsage>, DashboardError>;

    /// Reservations per month
    async fn monthly_reservations(&self) -> Result<Vec<MonthlyReservations>, DashboardError>;
}

/// Exportable datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportTarget {
    /// Reservation audit trail
    Audits,
    /// Aggregate statistics
    Reports,
}

impl ExportTarget {
    /// Suffix appended to exported file names
    #[inline]
    #[must_use]
    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::Audits => "reporte-auditorias",
            Self::Reports => "reporte-estadisticas",
        }
    }
}

/// Export formats offered by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PDF document
    Pdf,
    /// Excel workbook
    Excel,
}

impl ExportFormat {
    /// Path segment of the export endpoint
    #[inline]
    #[must_use]
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Excel => "excel",
        }
    }

    /// File extension of the downloaded file
    #[inline]
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Excel => "xlsx",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "excel" | "xlsx" => Ok(Self::Excel),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// Binary exports generated by the backend
#[async_trait]
pub trait ExportService: Send + Sync {
    /// Download the export of a dataset
    async fn export(
        &self,
        target: ExportTarget,
        format: ExportFormat,
    ) -> Result<Vec<u8>, DashboardError>;
}
