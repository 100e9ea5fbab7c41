//! Domain rows returned by the backend
//!
//! Rows are read-only snapshots; a result set is replaced wholesale on each
//! successful fetch. [`Searchable`] exposes the fields used for client-side
//! narrowing and summary counts.

use serde::{Deserialize, Serialize};

use crate::types::CatalogId;

/// Row that can be narrowed by free text and counted by state
pub trait Searchable {
    /// Visit every searchable field as text
    fn for_each_search_field(&self, visit: &mut dyn FnMut(&str) -> bool) -> bool;

    /// Terminal state used for summary counts
    fn terminal_state(&self) -> Option<&str>;
}

/// Visit an optional text field
fn visit_opt(field: Option<&str>, visit: &mut dyn FnMut(&str) -> bool) -> bool {
    field.is_some_and(|value| visit(value))
}

/// One state change of a reservation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Audit entry id
    pub id: i64,
    /// Reservation the change applies to
    pub reserva_id: Option<i64>,
    /// State before the change
    pub estado_anterior: Option<String>,
    /// State after the change
    pub estado_nuevo: Option<String>,
    /// Staff member who made the change
    pub usuario_nombre: Option<String>,
    /// Reserved space
    pub espacio_nombre: Option<String>,
    /// Change timestamp as sent by the backend
    pub fecha_cambio: Option<String>,
    /// Free-form note
    pub comentario: Option<String>,
}

impl Searchable for AuditEntry {
    fn for_each_search_field(&self, visit: &mut dyn FnMut(&str) -> bool) -> bool {
        visit(&self.id.to_string())
            || self
                .reserva_id
                .is_some_and(|id| visit(&id.to_string()))
            || visit_opt(self.estado_anterior.as_deref(), visit)
            || visit_opt(self.estado_nuevo.as_deref(), visit)
            || visit_opt(self.usuario_nombre.as_deref(), visit)
            || visit_opt(self.espacio_nombre.as_deref(), visit)
    }

    fn terminal_state(&self) -> Option<&str> {
        self.estado_nuevo.as_deref()
    }
}

/// Incident reported against a reservation or space
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Incident id
    pub id: i64,
    /// Reservation during which it happened
    pub reserva_id: Option<i64>,
    /// Description written by the reporter
    pub descripcion: Option<String>,
    /// Current incident state
    pub estado: Option<String>,
    /// Reporter
    pub reportado_por: Option<String>,
    /// Affected space
    pub espacio_nombre: Option<String>,
    /// School owning the space
    pub escuela_id: Option<CatalogId>,
    /// School display name
    pub escuela_nombre: Option<String>,
    /// Report timestamp as sent by the backend
    pub fecha_reporte: Option<String>,
}

impl Searchable for Incident {
    fn for_each_search_field(&self, visit: &mut dyn FnMut(&str) -> bool) -> bool {
        visit(&self.id.to_string())
            || self
                .reserva_id
                .is_some_and(|id| visit(&id.to_string()))
            || visit_opt(self.estado.as_deref(), visit)
            || visit_opt(self.reportado_por.as_deref(), visit)
            || visit_opt(self.espacio_nombre.as_deref(), visit)
            || visit_opt(self.descripcion.as_deref(), visit)
    }

    fn terminal_state(&self) -> Option<&str> {
        self.estado.as_deref()
    }
}

/// Headline figures for the statistics view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralStats {
    /// All reservations
    pub total_reservas: u64,
    /// Approved reservations
    pub reservas_aprobadas: u64,
    /// Reservations awaiting review
    pub reservas_pendientes: u64,
    /// Rejected reservations
    pub reservas_rechazadas: u64,
    /// Registered spaces
    pub total_espacios: u64,
    /// Reported incidents
    pub total_incidencias: u64,
}

/// Usage of one space
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpaceUsage {
    /// Space id
    pub espacio_id: i64,
    /// Space display name
    pub espacio_nombre: String,
    /// Reservations in the period
    pub total_reservas: u64,
    /// Reserved hours in the period
    pub horas_reservadas: f64,
}

/// Reservation count for one month
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthlyReservations {
    /// Month label, `YYYY-MM`
    pub mes: String,
    /// Reservations created that month
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(row: &dyn Searchable) -> Vec<String> {
        let mut fields = Vec::new();
        row.for_each_search_field(&mut |field| {
            fields.push(field.to_string());
            false
        });
        fields
    }

    #[test]
    fn audit_entry_exposes_searchable_fields() {
        let entry = AuditEntry {
            id: 9,
            reserva_id: Some(120),
            estado_anterior: Some("Pendiente".into()),
            estado_nuevo: Some("Aprobada".into()),
            usuario_nombre: Some("Ana Ruiz".into()),
            espacio_nombre: Some("Aula 101".into()),
            comentario: Some("not searched".into()),
            ..AuditEntry::default()
        };
        assert_eq!(
            collect(&entry),
            ["9", "120", "Pendiente", "Aprobada", "Ana Ruiz", "Aula 101"]
        );
        assert_eq!(entry.terminal_state(), Some("Aprobada"));
    }

    #[test]
    fn visiting_stops_at_first_match() {
        let entry = AuditEntry {
            id: 1,
            estado_nuevo: Some("Rechazada".into()),
            ..AuditEntry::default()
        };
        let mut seen = 0;
        let found = entry.for_each_search_field(&mut |field| {
            seen += 1;
            field == "1"
        });
        assert!(found);
        assert_eq!(seen, 1);
    }

    #[test]
    fn rows_decode_from_backend_json() {
        let incident: Incident = serde_json::from_str(
            r#"{"id":4,"reservaId":77,"estado":"Abierta","espacioNombre":"Lab 2","escuelaId":3}"#,
        )
        .unwrap();
        assert_eq!(incident.reserva_id, Some(77));
        assert_eq!(incident.escuela_id, Some(3));
        assert!(incident.reportado_por.is_none());

        let stats: GeneralStats = serde_json::from_str(r#"{"totalReservas":10}"#).unwrap();
        assert_eq!(stats.total_reservas, 10);
        assert_eq!(stats.reservas_aprobadas, 0);
    }
}
