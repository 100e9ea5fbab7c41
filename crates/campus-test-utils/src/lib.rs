//! Testing utilities for the campus panel workspace
//!
//! In-memory fakes of the backend collaborators, with per-call delays and
//! failures, plus row fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use campus_core::{
    AuditEntry, CatalogDimension, CatalogId, CatalogOption, CatalogService, DashboardError,
    ExportFormat, ExportService, ExportTarget, GeneralStats, Incident, MonthlyReservations,
    ReportService, RowSource, Service, SpaceUsage,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn backend_error(service: Service, message: &str) -> DashboardError {
    DashboardError::Backend {
        service,
        status: Some(500),
        message: message.to_string(),
    }
}

/// Catalog fake: two faculties, three schools, four spaces
#[derive(Debug, Default)]
pub struct FakeCatalog {
    faculties: Vec<CatalogOption>,
    schools: Vec<CatalogOption>,
    spaces: Vec<CatalogOption>,
    delays: Mutex<HashMap<CatalogDimension, Duration>>,
    school_delays: Mutex<HashMap<Option<CatalogId>, Duration>>,
    failures: Mutex<HashMap<CatalogDimension, String>>,
    faculty_calls: AtomicUsize,
    school_calls: AtomicUsize,
    space_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn campus() -> Self {
        Self {
            faculties: vec![
                CatalogOption::new(1, "Ingeniería"),
                CatalogOption::new(2, "Ciencias"),
            ],
            schools: vec![
                CatalogOption::new(10, "Sistemas").with_parent(1),
                CatalogOption::new(11, "Civil").with_parent(1),
                CatalogOption::new(20, "Biología").with_parent(2),
            ],
            spaces: vec![
                CatalogOption::new(100, "Laboratorio de Redes").with_parent(10),
                CatalogOption::new(101, "Aula 101").with_parent(10),
                CatalogOption::new(110, "Aula Magna").with_parent(11),
                CatalogOption::new(200, "Laboratorio de Biología").with_parent(20),
            ],
            ..Self::default()
        }
    }

    pub fn delay(&self, dimension: CatalogDimension, delay: Duration) {
        self.delays.lock().insert(dimension, delay);
    }

    pub fn delay_schools_for(&self, faculty: Option<CatalogId>, delay: Duration) {
        self.school_delays.lock().insert(faculty, delay);
    }

    pub fn fail(&self, dimension: CatalogDimension, message: &str) {
        self.failures.lock().insert(dimension, message.to_string());
    }

    pub fn recover(&self, dimension: CatalogDimension) {
        self.failures.lock().remove(&dimension);
    }

    pub fn calls(&self, dimension: CatalogDimension) -> usize {
        match dimension {
            CatalogDimension::Faculty => self.faculty_calls.load(Ordering::SeqCst),
            CatalogDimension::School => self.school_calls.load(Ordering::SeqCst),
            CatalogDimension::Space => self.space_calls.load(Ordering::SeqCst),
        }
    }

    async fn respond(
        &self,
        dimension: CatalogDimension,
        extra_delay: Option<Duration>,
        rows: Vec<CatalogOption>,
    ) -> Result<Vec<CatalogOption>, DashboardError> {
        let delay = extra_delay.or_else(|| self.delays.lock().get(&dimension).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.failures.lock().get(&dimension).cloned();
        match failure {
            Some(message) => Err(backend_error(Service::Catalogs, &message)),
            None => Ok(rows),
        }
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn faculties(&self) -> Result<Vec<CatalogOption>, DashboardError> {
        self.faculty_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(CatalogDimension::Faculty, None, self.faculties.clone())
            .await
    }

    async fn schools(
        &self,
        faculty_id: Option<CatalogId>,
    ) -> Result<Vec<CatalogOption>, DashboardError> {
        self.school_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self
            .schools
            .iter()
            .filter(|s| faculty_id.is_none() || s.parent_id == faculty_id)
            .cloned()
            .collect();
        let delay = self.school_delays.lock().get(&faculty_id).copied();
        self.respond(CatalogDimension::School, delay, rows).await
    }

    async fn spaces(&self) -> Result<Vec<CatalogOption>, DashboardError> {
        self.space_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(CatalogDimension::Space, None, self.spaces.clone())
            .await
    }
}

/// Row source answering from a script, then from a fallback
#[derive(Debug)]
pub struct ScriptedRows<Q, R> {
    script: Mutex<VecDeque<(Duration, Result<Vec<R>, DashboardError>)>>,
    fallback: Mutex<Vec<R>>,
    queries: Mutex<Vec<Q>>,
}

impl<Q, R: Clone> ScriptedRows<Q, R> {
    pub fn new(fallback: Vec<R>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn push_ok(&self, rows: Vec<R>) {
        self.push_ok_after(Duration::ZERO, rows);
    }

    pub fn push_ok_after(&self, delay: Duration, rows: Vec<R>) {
        self.script.lock().push_back((delay, Ok(rows)));
    }

    pub fn push_err(&self, service: Service, message: &str) {
        self.push_err_after(Duration::ZERO, service, message);
    }

    pub fn push_err_after(&self, delay: Duration, service: Service, message: &str) {
        self.script
            .lock()
            .push_back((delay, Err(backend_error(service, message))));
    }

    pub fn set_fallback(&self, rows: Vec<R>) {
        *self.fallback.lock() = rows;
    }

    pub fn queries(&self) -> Vec<Q>
    where
        Q: Clone,
    {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl<Q, R> RowSource<Q> for ScriptedRows<Q, R>
where
    Q: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    type Row = R;

    async fn fetch_rows(&self, query: &Q) -> Result<Vec<R>, DashboardError> {
        self.queries.lock().push(query.clone());
        let next = self.script.lock().pop_front();
        match next {
            Some((delay, outcome)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                outcome
            }
            None => Ok(self.fallback.lock().clone()),
        }
    }
}

/// Report and export fake
#[derive(Debug, Default)]
pub struct FakeReports {
    failing: Mutex<Vec<&'static str>>,
    export_failure: Mutex<Option<String>>,
}

impl FakeReports {
    pub fn fail(&self, resource: &'static str) {
        self.failing.lock().push(resource);
    }

    pub fn recover(&self) {
        self.failing.lock().clear();
    }

    pub fn fail_exports(&self, message: &str) {
        *self.export_failure.lock() = Some(message.to_string());
    }

    fn check(&self, resource: &'static str) -> Result<(), DashboardError> {
        if self.failing.lock().contains(&resource) {
            return Err(backend_error(Service::Reports, &format!("{resource} no disponible")));
        }
        Ok(())
    }
}

#[async_trait]
impl ReportService for FakeReports {
    async fn general_stats(&self) -> Result<GeneralStats, DashboardError> {
        self.check("estadisticas")?;
        Ok(GeneralStats {
            total_reservas: 40,
            reservas_aprobadas: 25,
            reservas_pendientes: 10,
            reservas_rechazadas: 5,
            total_espacios: 4,
            total_incidencias: 3,
        })
    }

    async fn space_usage(&self) -> Result<Vec<SpaceUsage>, DashboardError> {
        self.check("uso")?;
        Ok(vec![SpaceUsage {
            espacio_id: 101,
            espacio_nombre: "Aula 101".into(),
            total_reservas: 18,
            horas_reservadas: 36.5,
        }])
    }

    async fn monthly_reservations(&self) -> Result<Vec<MonthlyReservations>, DashboardError> {
        self.check("mensual")?;
        Ok(vec![
            MonthlyReservations {
                mes: "2024-02".into(),
                total: 15,
            },
            MonthlyReservations {
                mes: "2024-03".into(),
                total: 25,
            },
        ])
    }
}

#[async_trait]
impl ExportService for FakeReports {
    async fn export(
        &self,
        target: ExportTarget,
        format: ExportFormat,
    ) -> Result<Vec<u8>, DashboardError> {
        let failure = self.export_failure.lock().clone();
        if let Some(message) = failure {
            let service = match target {
                ExportTarget::Audits => Service::Audits,
                ExportTarget::Reports => Service::Reports,
            };
            return Err(backend_error(service, &message));
        }
        Ok(format!("{}:{}", target.file_suffix(), format.extension()).into_bytes())
    }
}

pub fn incident(id: i64, estado: Option<&str>, espacio: &str) -> Incident {
    Incident {
        id,
        reserva_id: Some(id * 10),
        estado: estado.map(str::to_string),
        espacio_nombre: Some(espacio.to_string()),
        reportado_por: Some("Carla Mendoza".to_string()),
        ..Incident::default()
    }
}

pub fn audit_entry(id: i64, before: &str, after: Option<&str>, usuario: &str) -> AuditEntry {
    AuditEntry {
        id,
        reserva_id: Some(500 + id),
        estado_anterior: Some(before.to_string()),
        estado_nuevo: after.map(str::to_string),
        usuario_nombre: Some(usuario.to_string()),
        espacio_nombre: Some("Aula 101".to_string()),
        ..AuditEntry::default()
    }
}
