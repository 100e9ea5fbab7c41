//! Error types for the admin panel
//!
//! Every backend collaborator funnels its failures through
//! [`normalize_error`], so catalog, query, report and export views all
//! surface the same human-readable messages:
//! - Transport failures and timeouts become [`DashboardError::Network`]
//! - Non-2xx answers become [`DashboardError::Backend`], carrying the
//!   backend's own message when the body has one
//! - Unparsable filter input becomes [`DashboardError::Validation`]

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend service a request was addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// Reservation audit trail
    Audits,
    /// Incident reports
    Incidents,
    /// Faculty/school/space catalogs
    Catalogs,
    /// Aggregate statistics
    Reports,
}

impl Service {
    /// Name shown to staff in messages
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Audits => "auditorías",
            Self::Incidents => "incidencias",
            Self::Catalogs => "catálogos",
            Self::Reports => "reportes",
        }
    }

    /// Message used when the backend gives no usable explanation
    #[must_use]
    pub fn fallback_message(self) -> String {
        format!("No se pudo completar la solicitud en {}.", self.label())
    }

    /// Message used when the request hit its time ceiling
    #[must_use]
    pub fn timeout_message(self) -> String {
        format!(
            "La solicitud a {} excedió el tiempo de espera.",
            self.label()
        )
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport or timeout failure
    Network,
    /// Unparsable filter input
    Validation,
    /// Backend answered with an error
    Backend,
}

/// Failure as observed by a transport, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFailure {
    /// The request never produced a response
    Transport {
        /// Transport-level description, logged but never shown
        detail: String,
        /// Whether the request ceiling elapsed
        timed_out: bool,
    },
    /// The backend answered with a non-success status
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
    /// The backend answered 2xx but the body could not be decoded
    Decode {
        /// Decoder description, logged but never shown
        detail: String,
    },
}

/// Main error type for the panel
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    /// Transport failure or timeout
    #[error("{message}")]
    Network {
        /// Service that was unreachable
        service: Service,
        /// Human-readable message
        message: String,
        /// Whether the request ceiling elapsed
        timed_out: bool,
    },

    /// Backend rejected or mangled the request
    #[error("{message}")]
    Backend {
        /// Service that answered
        service: Service,
        /// HTTP status, absent for undecodable 2xx bodies
        status: Option<u16>,
        /// Backend message, or the service fallback
        message: String,
    },

    /// Filter input that cannot be promoted into a query
    #[error("valor inválido para {field}: {value:?}")]
    Validation {
        /// Form field name
        field: &'static str,
        /// Raw input
        value: String,
    },
}

impl DashboardError {
    /// Classification of this error
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Backend { .. } => ErrorKind::Backend,
            Self::Validation { .. } => ErrorKind::Validation,
        }
    }

    /// Whether a manual retry may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Backend { status, .. } => status.is_some_and(|s| s >= 500),
            Self::Validation { .. } => false,
        }
    }

    /// Message for banners and notifications
    #[inline]
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Create validation error for a form field
    #[inline]
    pub fn validation(field: &'static str, value: impl Into<String>) -> Self {
        Self::Validation {
            field,
            value: value.into(),
        }
    }
}

/// Session metadata that cannot be turned into a role context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Supervisor session without an assigned school
    #[error("supervisor session has no assigned school")]
    MissingSchool,
}

/// Pull a displayable message out of an error body.
///
/// Accepted shapes: a JSON string, a JSON object with a string `message`
/// field, or non-JSON plain text. Anything else yields `None`.
#[must_use]
pub fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(text)) => non_blank(&text),
        Ok(Value::Object(map)) => match map.get("message") {
            Some(Value::String(text)) => non_blank(text),
            _ => None,
        },
        Ok(_) => None,
        Err(_) => Some(trimmed.to_string()),
    }
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Turn a raw transport failure into the shared error type
#[must_use]
pub fn normalize_error(service: Service, raw: RawFailure) -> DashboardError {
    match raw {
        RawFailure::Transport { detail, timed_out } => {
            tracing::debug!(%service, %detail, timed_out, "transport failure");
            let message = if timed_out {
                service.timeout_message()
            } else {
                service.fallback_message()
            };
            DashboardError::Network {
                service,
                message,
                timed_out,
            }
        }
        RawFailure::Status { status, body } => DashboardError::Backend {
            service,
            status: Some(status),
            message: extract_message(&body).unwrap_or_else(|| service.fallback_message()),
        },
        RawFailure::Decode { detail } => {
            tracing::debug!(%service, %detail, "undecodable response body");
            DashboardError::Backend {
                service,
                status: None,
                message: service.fallback_message(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn status(status: u16, body: &str) -> RawFailure {
        RawFailure::Status {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn message_field_is_extracted() {
        let err = normalize_error(
            Service::Audits,
            status(400, r#"{"message":"Fecha inválida","code":12}"#),
        );
        assert_eq!(err.user_message(), "Fecha inválida");
        assert_eq!(err.kind(), ErrorKind::Backend);
    }

    #[test]
    fn json_string_body_is_the_message() {
        let err = normalize_error(Service::Incidents, status(409, r#""Incidencia cerrada""#));
        assert_eq!(err.user_message(), "Incidencia cerrada");
    }

    #[test]
    fn plain_text_body_is_the_message() {
        let err = normalize_error(Service::Catalogs, status(404, "Facultad no encontrada\n"));
        assert_eq!(err.user_message(), "Facultad no encontrada");
    }

    #[test]
    fn unusable_bodies_fall_back_per_service() {
        for body in ["", "   ", r#"{"error":"x"}"#, r#"{"message":""}"#, "[1,2]", "null"] {
            let err = normalize_error(Service::Reports, status(500, body));
            assert_eq!(
                err.user_message(),
                "No se pudo completar la solicitud en reportes.",
                "body {body:?}"
            );
        }
    }

    #[test]
    fn transport_failures_are_network_errors() {
        let err = normalize_error(
            Service::Audits,
            RawFailure::Transport {
                detail: "connection refused".into(),
                timed_out: false,
            },
        );
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(
            err.user_message(),
            "No se pudo completar la solicitud en auditorías."
        );
        assert!(err.is_retryable());

        let timeout = normalize_error(
            Service::Audits,
            RawFailure::Transport {
                detail: "deadline".into(),
                timed_out: true,
            },
        );
        assert!(timeout.user_message().contains("tiempo de espera"));
    }

    #[test]
    fn decode_failures_use_fallback() {
        let err = normalize_error(
            Service::Incidents,
            RawFailure::Decode {
                detail: "expected array".into(),
            },
        );
        assert!(matches!(err, DashboardError::Backend { status: None, .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn retryable_classification() {
        assert!(normalize_error(Service::Audits, status(503, "")).is_retryable());
        assert!(!normalize_error(Service::Audits, status(422, "")).is_retryable());
        assert!(!DashboardError::validation("reserva_id", "abc").is_retryable());
    }
}
