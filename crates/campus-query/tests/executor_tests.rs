//! Functional tests for query execution and exports.
//!
//! - Overlapping loads: only the newest result set is committed
//! - Reset returns to the baseline and reload re-issues the committed query
//! - Export failures reach the caller

use async_trait::async_trait;
use campus_core::{
    AuditEntry, AuditQuery, DashboardError, ExportFormat, ExportService, ExportTarget, Incident,
    IncidentQuery, RoleContext, Service,
};
use campus_query::{export_dataset, projector, ExecOutcome, QueryExecutor};
use campus_test_utils::{audit_entry, backend_error, incident, FakeReports, ScriptedRows};
use mockall::mock;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

mock! {
    Exporter {}

    #[async_trait]
    impl ExportService for Exporter {
        async fn export(&self, target: ExportTarget, format: ExportFormat) -> Result<Vec<u8>, DashboardError>;
    }
}

/// Helper: audit trail with mixed terminal states
fn audit_trail() -> Vec<AuditEntry> {
    vec![
        audit_entry(1, "PENDIENTE", Some("APROBADA"), "Ana Ruiz"),
        audit_entry(2, "PENDIENTE", Some("RECHAZADA"), "Luis Paz"),
        audit_entry(3, "APROBADA", Some("aprobada"), "Ana Ruiz"),
        audit_entry(4, "PENDIENTE", None, "Marta Gil"),
    ]
}

#[tokio::test(start_paused = true)]
async fn newer_load_wins_over_slower_older_one() {
    let source = Arc::new(ScriptedRows::<AuditQuery, AuditEntry>::new(vec![]));
    source.push_ok_after(Duration::from_millis(300), audit_trail());
    source.push_ok_after(Duration::from_millis(50), vec![audit_entry(9, "PENDIENTE", None, "Ana")]);
    let executor = QueryExecutor::new(Arc::clone(&source));

    let older_query = AuditQuery::default();
    let newer_query = AuditQuery {
        usuario: Some("ana".into()),
        ..AuditQuery::default()
    };
    let (older, newer) = tokio::join!(executor.load(older_query), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        executor.load(newer_query.clone()).await
    });

    assert_eq!(older.unwrap(), ExecOutcome::Superseded);
    assert!(newer.unwrap().is_applied());
    let snapshot = executor.snapshot();
    assert_eq!(snapshot.rows.len(), 1);
    assert_eq!(snapshot.rows[0].id, 9);
    assert_eq!(snapshot.committed, newer_query);
    assert!(!snapshot.status.loading);
}

#[tokio::test]
async fn reset_then_reload_equals_loading_the_empty_query() {
    let source = Arc::new(ScriptedRows::<AuditQuery, AuditEntry>::new(audit_trail()));
    let executor = QueryExecutor::new(Arc::clone(&source));
    executor
        .apply_filters(AuditQuery {
            estado: Some("APROBADA".into()),
            ..AuditQuery::default()
        })
        .await
        .unwrap();

    executor.reset_filters().await.unwrap();
    executor.reload().await.unwrap();
    let after_reset = executor.snapshot();

    let fresh_source = Arc::new(ScriptedRows::<AuditQuery, AuditEntry>::new(audit_trail()));
    let fresh = QueryExecutor::new(Arc::clone(&fresh_source));
    fresh.load(AuditQuery::default()).await.unwrap();

    assert_eq!(after_reset.committed, fresh.committed_query());
    assert_eq!(after_reset.rows, fresh.rows());
    let queries = source.queries();
    assert_eq!(queries[1..], [AuditQuery::default(), AuditQuery::default()]);
}

#[tokio::test]
async fn supervisor_reset_keeps_school_constraints() {
    let role = RoleContext::Supervisor {
        escuela_id: 42,
        escuela_nombre: "Escuela X".into(),
    };
    let source = Arc::new(ScriptedRows::<IncidentQuery, Incident>::new(vec![incident(
        1,
        Some("ABIERTA"),
        "Aula 101",
    )]));
    let executor = QueryExecutor::with_baseline(Arc::clone(&source), IncidentQuery::for_role(&role));

    executor
        .apply_filters(IncidentQuery {
            espacio_id: Some(5),
            ..IncidentQuery::for_role(&role)
        })
        .await
        .unwrap();
    executor.reset_filters().await.unwrap();

    let last = source.queries().pop().unwrap();
    assert_eq!(last.escuela_id, Some(42));
    assert_eq!(last.escuela_contexto_id, Some(42));
    assert_eq!(last.espacio_id, None);
}

#[tokio::test]
async fn placeholder_only_before_first_success() {
    let source = Arc::new(ScriptedRows::<AuditQuery, AuditEntry>::new(audit_trail()));
    source.push_err(Service::Audits, "caído");
    let executor = QueryExecutor::new(Arc::clone(&source));

    assert!(executor.load(AuditQuery::default()).await.is_err());
    assert!(executor.rows().is_empty());
    executor.reload().await.unwrap();
    assert!(!executor.shows_placeholder());
    assert_eq!(executor.rows().len(), 4);
}

#[tokio::test]
async fn loaded_rows_feed_the_projector() {
    let source = Arc::new(ScriptedRows::<AuditQuery, AuditEntry>::new(audit_trail()));
    let executor = QueryExecutor::new(Arc::clone(&source));
    executor.load(AuditQuery::default()).await.unwrap();
    let rows = executor.rows();

    let summary = projector::summarize(&rows);
    assert_eq!(summary.get("APROBADA"), Some(&2));
    assert_eq!(summary.get("RECHAZADA"), Some(&1));
    assert_eq!(summary.get(projector::NO_STATE), Some(&1));

    let ana: Vec<_> = projector::filter(&rows, "ana ruiz").map(|r| r.id).collect();
    assert_eq!(ana, [1, 3]);
}

#[tokio::test]
async fn export_names_file_after_dataset_and_format() {
    let reports = FakeReports::default();
    let file = export_dataset(&reports, ExportTarget::Reports, ExportFormat::Excel)
        .await
        .unwrap();

    assert!(file.file_name.ends_with("Z-reporte-estadisticas.xlsx"));
    assert!(!file.file_name.contains(':'));
    assert_eq!(file.bytes, b"reporte-estadisticas:xlsx".to_vec());
}

#[tokio::test]
async fn export_failure_reaches_the_caller() {
    let mut exporter = MockExporter::new();
    exporter
        .expect_export()
        .withf(|target, format| *target == ExportTarget::Audits && *format == ExportFormat::Pdf)
        .times(1)
        .returning(|_, _| Err(backend_error(Service::Audits, "exportación no disponible")));

    let err = export_dataset(&exporter, ExportTarget::Audits, ExportFormat::Pdf)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "exportación no disponible");
}
