//! Campus Client - REST collaborators of the admin panel
//!
//! [`HttpBackend`] implements every service trait of `campus-core` against
//! the reservation platform API:
//! - `GET /api/catalogos/facultades`, `/api/catalogos/escuelas`, `/api/espacios`
//! - `GET /api/incidencias`, `/api/auditorias`
//! - `GET /api/reportes/*` and the PDF/Excel exports

#![warn(unreachable_pub)]

mod dto;
mod http;

pub use http::HttpBackend;
