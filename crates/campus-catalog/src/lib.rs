//! Campus Catalog - faculty/school/space options for the filter selectors
//!
//! # Example
//!
//! ```rust,ignore
//! use campus_catalog::CatalogResolver;
//! use campus_core::RoleContext;
//!
//! # async fn example(backend: std::sync::Arc<campus_client::HttpBackend>) {
//! let resolver = CatalogResolver::new(backend, RoleContext::Administrative);
//! let snapshot = resolver.load_all(None).await;
//! println!("{} faculties", snapshot.faculties.len());
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod dedup;
pub mod resolver;

pub use dedup::{CatalogKey, RequestDedup};
pub use resolver::{CatalogResolver, CatalogSnapshot, LoadOutcome};
