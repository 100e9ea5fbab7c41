//! Campus Core - shared model of the reservation admin panel
//!
//! Everything the panel engine passes between components:
//! - Role context resolved once per session, and the filter dimensions it unlocks
//! - Catalog options and per-resource load status
//! - Filter forms and the sanitized effective queries derived from them
//! - Domain rows and report figures
//! - Backend collaborator traits and the shared error normalization
//!
//! # Example
//!
//! ```rust
//! use campus_core::{AuditFilterForm, EffectiveQuery};
//!
//! let form = AuditFilterForm {
//!     reserva_id: "abc".into(),
//!     estado: "  ".into(),
//!     ..AuditFilterForm::default()
//! };
//! assert!(form.sanitize().is_empty());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod query;
pub mod rows;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use config::{ConfigError, DashboardConfig};
pub use error::{
    extract_message, normalize_error, DashboardError, ErrorKind, RawFailure, Service,
    SessionError,
};
pub use query::{AuditFilterForm, AuditQuery, EffectiveQuery, IncidentQuery};
pub use rows::{AuditEntry, GeneralStats, Incident, MonthlyReservations, Searchable, SpaceUsage};
pub use services::{
    CatalogService, ExportFormat, ExportService, ExportTarget, ReportService, RowSource,
};
pub use types::{
    CatalogDimension, CatalogId, CatalogOption, FilterDimensions, LoadStatus, RoleContext,
    RoleKind, SessionMetadata, Visibility,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the panel engine
    pub use crate::{
        CatalogOption, DashboardConfig, DashboardError, EffectiveQuery, IncidentQuery,
        LoadStatus, RoleContext, Searchable,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
