//! Plain-text rendering of panel state for the terminal

use campus_catalog::CatalogSnapshot;
use campus_core::{AuditEntry, CatalogOption, Incident, LoadStatus};
use campus_query::ReportSnapshot;
use std::collections::BTreeMap;
use std::fmt::Write;

const DASH: &str = "-";

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(DASH)
}

fn status_line(out: &mut String, label: &str, status: &LoadStatus) {
    let _ = match (&status.error, status.last_updated) {
        (Some(error), _) => writeln!(out, "  [{label}] error: {error}"),
        (None, Some(at)) => writeln!(out, "  [{label}] updated {}", at.format("%H:%M:%S")),
        (None, None) => writeln!(out, "  [{label}] not loaded"),
    };
}

fn options(out: &mut String, title: &str, options: &[CatalogOption], status: &LoadStatus) {
    let _ = writeln!(out, "{title} ({})", options.len());
    status_line(out, title, status);
    for option in options {
        let _ = match option.parent_id {
            Some(parent) => writeln!(out, "  {:>5}  {}  (in {parent})", option.id, option.name),
            None => writeln!(out, "  {:>5}  {}", option.id, option.name),
        };
    }
}

/// Catalog lists with their load status
#[must_use]
pub fn catalog(snapshot: &CatalogSnapshot) -> String {
    let mut out = String::new();
    options(&mut out, "Facultades", &snapshot.faculties, &snapshot.faculty_status);
    options(&mut out, "Escuelas", &snapshot.schools, &snapshot.school_status);
    options(&mut out, "Espacios", &snapshot.spaces, &snapshot.space_status);
    out
}

/// Per-state counts, one per line
#[must_use]
pub fn summary(counts: &BTreeMap<String, usize>) -> String {
    let mut out = String::from("Resumen\n");
    for (state, count) in counts {
        let _ = writeln!(out, "  {state:<12} {count}");
    }
    out
}

#[must_use]
pub fn incidents<'a>(rows: impl IntoIterator<Item = &'a Incident>) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "#{:<5} {:<12} {:<24} {}",
            row.id,
            or_dash(row.estado.as_deref()),
            or_dash(row.espacio_nombre.as_deref()),
            or_dash(row.descripcion.as_deref()),
        );
    }
    out
}

#[must_use]
pub fn audits<'a>(rows: impl IntoIterator<Item = &'a AuditEntry>) -> String {
    let mut out = String::new();
    for row in rows {
        let reserva = row
            .reserva_id
            .map_or_else(|| DASH.to_string(), |id| id.to_string());
        let _ = writeln!(
            out,
            "#{:<5} reserva {:<6} {} -> {}  {}  {}",
            row.id,
            reserva,
            or_dash(row.estado_anterior.as_deref()),
            or_dash(row.estado_nuevo.as_deref()),
            or_dash(row.usuario_nombre.as_deref()),
            or_dash(row.fecha_cambio.as_deref()),
        );
    }
    out
}

/// Statistics resources with their load status
#[must_use]
pub fn reports(snapshot: &ReportSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Estadísticas generales");
    status_line(&mut out, "estadisticas", &snapshot.general.status);
    if let Some(stats) = &snapshot.general.data {
        let _ = writeln!(
            out,
            "  reservas {} (aprobadas {}, pendientes {}, rechazadas {})",
            stats.total_reservas,
            stats.reservas_aprobadas,
            stats.reservas_pendientes,
            stats.reservas_rechazadas
        );
        let _ = writeln!(
            out,
            "  espacios {}, incidencias {}",
            stats.total_espacios, stats.total_incidencias
        );
    }

    let _ = writeln!(out, "Uso de espacios");
    status_line(&mut out, "uso", &snapshot.usage.status);
    for usage in &snapshot.usage.data {
        let _ = writeln!(
            out,
            "  {:<24} {:>4} reservas {:>7.1} h",
            usage.espacio_nombre, usage.total_reservas, usage.horas_reservadas
        );
    }

    let _ = writeln!(out, "Reservas por mes");
    status_line(&mut out, "mensual", &snapshot.monthly.status);
    for month in &snapshot.monthly.data {
        let _ = writeln!(out, "  {}  {}", month.mes, month.total);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_test_utils::{audit_entry, incident};

    #[test]
    fn missing_fields_render_as_dash() {
        let text = audits([&audit_entry(1, "PENDIENTE", None, "Ana")]);
        assert!(text.contains("PENDIENTE -> -"));
        assert!(text.contains("reserva 501"));
    }

    #[test]
    fn incidents_show_state_and_space() {
        let text = incidents(&[incident(3, Some("ABIERTA"), "Aula Magna")]);
        assert!(text.starts_with("#3"));
        assert!(text.contains("ABIERTA"));
        assert!(text.contains("Aula Magna"));
    }

    #[test]
    fn failed_dimension_shows_its_error() {
        let mut snapshot = CatalogSnapshot::default();
        snapshot.school_status.fail("escuelas no disponibles");
        let text = catalog(&snapshot);
        assert!(text.contains("[Escuelas] error: escuelas no disponibles"));
        assert!(text.contains("[Facultades] not loaded"));
    }
}
