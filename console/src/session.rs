//! Session bootstrap for the console: configuration and role context

use campus_core::{
    CatalogId, ConfigError, DashboardConfig, RoleContext, SessionError, SessionMetadata,
};
use std::path::Path;

/// Load configuration from a file, or defaults plus environment overrides
///
/// # Errors
/// Returns the configuration error unchanged
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig, ConfigError> {
    match path {
        Some(path) => DashboardConfig::load(path),
        None => DashboardConfig::default().with_env_overrides(),
    }
}

/// Resolve the role context from command-line session data
///
/// # Errors
/// - `SessionError::MissingSchool` for a supervisor without a school id
pub fn resolve_role(
    role: &str,
    escuela_id: Option<CatalogId>,
    escuela_nombre: Option<String>,
) -> Result<RoleContext, SessionError> {
    let meta = SessionMetadata {
        role: role.to_string(),
        escuela_id,
        escuela_nombre,
    };
    let context = RoleContext::resolve(&meta)?;
    tracing::debug!(role = ?context.kind(), "session role resolved");
    Ok(context)
}
