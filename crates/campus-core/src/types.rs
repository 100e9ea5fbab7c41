//! Core types for the admin panel
//!
//! Defines the session-scoped and reference types shared by every view:
//! - Role context and the filter dimensions it unlocks
//! - Catalog options (faculty, school, space)
//! - Per-resource load status

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::SessionError;

/// Identifier of a faculty, school or space
pub type CatalogId = i64;

/// Raw session metadata as stored by the login flow
///
/// Older sessions store the school id as a string, newer ones as a number;
/// both are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    /// Role name as issued by the backend
    #[serde(default, alias = "rol")]
    pub role: String,
    /// Assigned school, supervisors only
    #[serde(default, deserialize_with = "lenient_id")]
    pub escuela_id: Option<CatalogId>,
    /// Display name of the assigned school
    #[serde(default)]
    pub escuela_nombre: Option<String>,
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<CatalogId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(CatalogId),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(id)),
        Some(RawId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawId::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid school id: {text:?}"))),
    }
}

/// Role of the signed-in staff member, without scope data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleKind {
    /// School supervisor, scoped to one school
    Supervisor,
    /// Central administration, unrestricted
    Administrative,
    /// Any other staff role
    Other,
}

impl RoleKind {
    /// Value sent as the `rol` query parameter
    #[inline]
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Supervisor => "SUPERVISOR",
            Self::Administrative => "ADMINISTRATIVO",
            Self::Other => "OTRO",
        }
    }

    /// Parse a role name, case-insensitively
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "SUPERVISOR" => Self::Supervisor,
            "ADMINISTRATIVO" | "ADMINISTRATIVE" | "ADMIN" => Self::Administrative,
            _ => Self::Other,
        }
    }
}

/// Role context, resolved once at session entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleContext {
    /// Supervisor pinned to a single school
    Supervisor {
        /// Assigned school
        escuela_id: CatalogId,
        /// Assigned school display name
        escuela_nombre: String,
    },
    /// Unrestricted catalog browsing
    Administrative,
    /// Restricted view without faculty/school dimensions
    Other,
}

impl RoleContext {
    /// Resolve the closed role variant from raw session metadata
    ///
    /// # Errors
    /// - `SessionError::MissingSchool` for a supervisor without a school id
    pub fn resolve(meta: &SessionMetadata) -> Result<Self, SessionError> {
        match RoleKind::parse(&meta.role) {
            RoleKind::Supervisor => {
                let escuela_id = meta.escuela_id.ok_or(SessionError::MissingSchool)?;
                let escuela_nombre = meta
                    .escuela_nombre
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map_or_else(|| format!("Escuela {escuela_id}"), str::to_string);
                Ok(Self::Supervisor {
                    escuela_id,
                    escuela_nombre,
                })
            }
            RoleKind::Administrative => Ok(Self::Administrative),
            RoleKind::Other => Ok(Self::Other),
        }
    }

    /// Role without scope data
    #[inline]
    #[must_use]
    pub fn kind(&self) -> RoleKind {
        match self {
            Self::Supervisor { .. } => RoleKind::Supervisor,
            Self::Administrative => RoleKind::Administrative,
            Self::Other => RoleKind::Other,
        }
    }

    /// Whether faculty and school catalogs may be fetched from the backend
    #[inline]
    #[must_use]
    pub fn can_browse_catalog(&self) -> bool {
        matches!(self, Self::Administrative)
    }

    /// School the role is pinned to, if any
    #[inline]
    #[must_use]
    pub fn fixed_school(&self) -> Option<CatalogId> {
        match self {
            Self::Supervisor { escuela_id, .. } => Some(*escuela_id),
            _ => None,
        }
    }

    /// Filter dimensions this role may see and edit
    #[must_use]
    pub fn dimensions(&self) -> FilterDimensions {
        match self {
            Self::Administrative => FilterDimensions {
                faculty: Visibility::Editable,
                school: Visibility::Editable,
                space: Visibility::Editable,
            },
            Self::Supervisor { escuela_id, .. } => FilterDimensions {
                faculty: Visibility::Hidden,
                school: Visibility::Fixed(*escuela_id),
                space: Visibility::Editable,
            },
            Self::Other => FilterDimensions {
                faculty: Visibility::Hidden,
                school: Visibility::Hidden,
                space: Visibility::Editable,
            },
        }
    }
}

/// How a filter dimension is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Shown and editable
    Editable,
    /// Shown, locked to a value
    Fixed(CatalogId),
    /// Not shown at all
    Hidden,
}

impl Visibility {
    /// Whether the UI may change this dimension
    #[inline]
    #[must_use]
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Editable)
    }
}

/// Per-dimension visibility derived from the role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDimensions {
    /// Faculty selector
    pub faculty: Visibility,
    /// School selector
    pub school: Visibility,
    /// Space selector
    pub space: Visibility,
}

/// Catalog dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogDimension {
    /// Faculties
    Faculty,
    /// Schools, optionally scoped to a faculty
    School,
    /// Physical spaces, linked to a school
    Space,
}

impl std::fmt::Display for CatalogDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Faculty => "faculty",
            Self::School => "school",
            Self::Space => "space",
        })
    }
}

/// Reference option for a faculty, school or space selector
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogOption {
    /// Identity
    pub id: CatalogId,
    /// Display name
    pub name: String,
    /// Owning faculty (schools) or school (spaces)
    pub parent_id: Option<CatalogId>,
}

impl CatalogOption {
    /// Create option without parent
    #[inline]
    pub fn new(id: CatalogId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
        }
    }

    /// With parent
    #[inline]
    #[must_use]
    pub fn with_parent(mut self, parent_id: CatalogId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Load status of one independently fetched resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStatus {
    /// A load is pending
    pub loading: bool,
    /// Message of the last failed load, until dismissed or superseded
    pub error: Option<String>,
    /// Completion time of the last successful load
    pub last_updated: Option<DateTime<Utc>>,
}

impl LoadStatus {
    /// Mark a load as dispatched
    #[inline]
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Record a successful load
    #[inline]
    pub fn succeed(&mut self, at: DateTime<Utc>) {
        self.loading = false;
        self.error = None;
        self.last_updated = Some(at);
    }

    /// Record a failed load; `last_updated` keeps pointing at the last good data
    #[inline]
    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    /// Drop a pending load without an outcome
    #[inline]
    pub fn abandon(&mut self) {
        self.loading = false;
    }

    /// Dismiss the error banner
    #[inline]
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Whether a placeholder replaces content (first load only)
    #[inline]
    #[must_use]
    pub fn shows_placeholder(&self) -> bool {
        self.loading && self.last_updated.is_none()
    }
}
