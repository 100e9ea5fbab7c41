//! Campus Query - result sets of the admin panel views
//!
//! - [`QueryExecutor`]: authoritative fetch of a committed effective query
//! - [`projector`]: client-side narrowing and per-state counts
//! - [`ReportBoard`]: statistics resources with independent load status
//! - [`export`]: backend-generated PDF and Excel downloads
//! - [`IncidentView`]: draft filter wired to its catalog and result set
//!
//! # Example
//!
//! ```rust,ignore
//! use campus_core::AuditFilterForm;
//! use campus_query::{projector, QueryExecutor};
//!
//! # async fn example(backend: std::sync::Arc<campus_client::HttpBackend>) {
//! let audits = QueryExecutor::new(backend);
//! let form = AuditFilterForm { estado: "aprobada".into(), ..Default::default() };
//! audits.apply_filters(form.sanitize()).await.ok();
//! let rows = audits.rows();
//! let counts = projector::summarize(&rows);
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod executor;
pub mod export;
pub mod projector;
pub mod reports;
pub mod view;

pub use executor::{ExecOutcome, QueryExecutor, ResultSnapshot};
pub use export::{export_dataset, export_file_name, ExportFile};
pub use reports::{ReportBoard, ReportResource, ReportSnapshot, ResourceState};
pub use view::{IncidentView, Settled, ViewSync};
