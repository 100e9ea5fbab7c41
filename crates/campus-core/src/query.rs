//! Effective queries
//!
//! Filter forms hold raw strings exactly as typed. They are promoted to an
//! effective query only through the parsers here, which drop every blank or
//! unparsable value. An effective query therefore never carries an empty
//! string or a number that failed to parse.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::types::{CatalogId, RoleContext, RoleKind};

/// Date format used by forms and query parameters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Sanitized query sent to a backend
pub trait EffectiveQuery:
    Clone + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static
{
    /// Query parameters, in a stable order, without empty values
    fn to_params(&self) -> Vec<(&'static str, String)>;

    /// Whether no filter is set
    fn is_empty(&self) -> bool {
        self.to_params().is_empty()
    }
}

/// Trimmed text, or `None` when blank
#[must_use]
pub fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse a catalog or entity id
///
/// # Errors
/// - `DashboardError::Validation` when the input is not blank and not a
///   positive integer
pub fn parse_id(field: &'static str, raw: &str) -> Result<Option<CatalogId>, DashboardError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<CatalogId>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(DashboardError::validation(field, raw)),
    }
}

/// Parse a `YYYY-MM-DD` date
///
/// # Errors
/// - `DashboardError::Validation` when the input is not blank and not a date
pub fn parse_date(field: &'static str, raw: &str) -> Result<Option<NaiveDate>, DashboardError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| DashboardError::validation(field, raw))
}

/// Keep a parsed value, dropping validation failures from the query
#[must_use]
pub fn keep<T>(parsed: Result<Option<T>, DashboardError>) -> Option<T> {
    match parsed {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, "dropping filter value");
            None
        }
    }
}

/// Draft of the audit view filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFilterForm {
    /// Reservation id, raw
    pub reserva_id: String,
    /// Reservation state
    pub estado: String,
    /// Staff member name or login
    pub usuario: String,
    /// Range start, `YYYY-MM-DD`
    pub fecha_inicio: String,
    /// Range end, `YYYY-MM-DD`
    pub fecha_fin: String,
}

impl AuditFilterForm {
    /// Promote the draft to an effective query
    #[must_use]
    pub fn sanitize(&self) -> AuditQuery {
        AuditQuery {
            reserva_id: keep(parse_id("reserva_id", &self.reserva_id)),
            estado: non_blank(&self.estado),
            usuario: non_blank(&self.usuario),
            fecha_inicio: keep(parse_date("fecha_inicio", &self.fecha_inicio)),
            fecha_fin: keep(parse_date("fecha_fin", &self.fecha_fin)),
        }
    }
}

/// Effective query of the audit view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Reservation id
    pub reserva_id: Option<i64>,
    /// Reservation state
    pub estado: Option<String>,
    /// Staff member
    pub usuario: Option<String>,
    /// Range start
    pub fecha_inicio: Option<NaiveDate>,
    /// Range end
    pub fecha_fin: Option<NaiveDate>,
}

impl EffectiveQuery for AuditQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.reserva_id {
            params.push(("reservaId", id.to_string()));
        }
        if let Some(estado) = &self.estado {
            params.push(("estado", estado.clone()));
        }
        if let Some(usuario) = &self.usuario {
            params.push(("usuario", usuario.clone()));
        }
        if let Some(date) = self.fecha_inicio {
            params.push(("fechaInicio", date.format(DATE_FORMAT).to_string()));
        }
        if let Some(date) = self.fecha_fin {
            params.push(("fechaFin", date.format(DATE_FORMAT).to_string()));
        }
        params
    }
}

/// Effective query of the incident view
///
/// Supervisors never carry `facultad_id`; their school is sent both as
/// `escuela_id` and `escuela_contexto_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentQuery {
    /// Role of the requester
    pub role: Option<RoleKind>,
    /// Faculty filter
    pub facultad_id: Option<CatalogId>,
    /// School filter
    pub escuela_id: Option<CatalogId>,
    /// School the requester is scoped to
    pub escuela_contexto_id: Option<CatalogId>,
    /// Space filter
    pub espacio_id: Option<CatalogId>,
    /// Free-text search
    pub search: Option<String>,
}

impl IncidentQuery {
    /// Constraints every query of this role carries, with no user filter
    #[must_use]
    pub fn for_role(role: &RoleContext) -> Self {
        Self {
            role: Some(role.kind()),
            escuela_id: role.fixed_school(),
            escuela_contexto_id: role.fixed_school(),
            ..Self::default()
        }
    }
}

impl EffectiveQuery for IncidentQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(role) = self.role {
            params.push(("rol", role.as_param().to_string()));
        }
        let ids = [
            ("facultadId", self.facultad_id),
            ("escuelaId", self.escuela_id),
            ("escuelaContextoId", self.escuela_contexto_id),
            ("espacioId", self.espacio_id),
        ];
        params.extend(
            ids.into_iter()
                .filter_map(|(name, id)| id.map(|id| (name, id.to_string()))),
        );
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}
