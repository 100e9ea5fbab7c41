//! HTTP implementation of every backend collaborator
//!
//! One `reqwest::Client` with a fixed request ceiling serves all four
//! services. Failures are turned into [`DashboardError`] through
//! [`normalize_error`]; nothing here retries.

use async_trait::async_trait;
use campus_core::{
    normalize_error, AuditEntry, AuditQuery, CatalogId, CatalogOption, CatalogService,
    DashboardConfig, DashboardError, EffectiveQuery, ExportFormat, ExportService, ExportTarget,
    GeneralStats, Incident, IncidentQuery, MonthlyReservations, RawFailure, ReportService,
    RowSource, Service, SpaceUsage,
};
use serde::de::DeserializeOwned;

use crate::dto::{EscuelaDto, EspacioDto, FacultadDto};

/// Client for the reservation platform REST API
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client honouring the configured base URL and request ceiling
    ///
    /// # Errors
    /// Returns the builder error if the TLS backend cannot be initialised
    pub fn new(config: &DashboardConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_root().to_string(),
        })
    }

    /// Base URL requests are sent to
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        service: Service,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<reqwest::Response, DashboardError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%service, %url, ?params, "GET");

        let resp = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|err| transport_failure(service, &err))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%service, %url, status, "request failed");
            return Err(normalize_error(service, RawFailure::Status { status, body }));
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: Service,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, DashboardError> {
        let resp = self.send(service, path, params).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| transport_failure(service, &err))?;
        serde_json::from_slice(&bytes).map_err(|err| {
            normalize_error(
                service,
                RawFailure::Decode {
                    detail: err.to_string(),
                },
            )
        })
    }

    async fn get_bytes(&self, service: Service, path: &str) -> Result<Vec<u8>, DashboardError> {
        let resp = self.send(service, path, &[]).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| transport_failure(service, &err))?;
        Ok(bytes.to_vec())
    }
}

fn transport_failure(service: Service, err: &reqwest::Error) -> DashboardError {
    normalize_error(
        service,
        RawFailure::Transport {
            detail: err.to_string(),
            timed_out: err.is_timeout(),
        },
    )
}

#[async_trait]
impl CatalogService for HttpBackend {
    async fn faculties(&self) -> Result<Vec<CatalogOption>, DashboardError> {
        let rows: Vec<FacultadDto> = self
            .get_json(Service::Catalogs, "/api/catalogos/facultades", &[])
            .await?;
        Ok(rows.into_iter().map(CatalogOption::from).collect())
    }

    async fn schools(
        &self,
        faculty_id: Option<CatalogId>,
    ) -> Result<Vec<CatalogOption>, DashboardError> {
        let params: Vec<_> = faculty_id
            .map(|id| ("facultadId", id.to_string()))
            .into_iter()
            .collect();
        let rows: Vec<EscuelaDto> = self
            .get_json(Service::Catalogs, "/api/catalogos/escuelas", &params)
            .await?;
        Ok(rows.into_iter().map(CatalogOption::from).collect())
    }

    async fn spaces(&self) -> Result<Vec<CatalogOption>, DashboardError> {
        let rows: Vec<EspacioDto> = self.get_json(Service::Catalogs, "/api/espacios", &[]).await?;
        Ok(rows.into_iter().map(CatalogOption::from).collect())
    }
}

#[async_trait]
impl RowSource<IncidentQuery> for HttpBackend {
    type Row = Incident;

    async fn fetch_rows(&self, query: &IncidentQuery) -> Result<Vec<Incident>, DashboardError> {
        self.get_json(Service::Incidents, "/api/incidencias", &query.to_params())
            .await
    }
}

#[async_trait]
impl RowSource<AuditQuery> for HttpBackend {
    type Row = AuditEntry;

    async fn fetch_rows(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, DashboardError> {
        self.get_json(Service::Audits, "/api/auditorias", &query.to_params())
            .await
    }
}

#[async_trait]
impl ReportService for HttpBackend {
    async fn general_stats(&self) -> Result<GeneralStats, DashboardError> {
        self.get_json(Service::Reports, "/api/reportes/estadisticas-generales", &[])
            .await
    }

    async fn space_usage(&self) -> Result<Vec<SpaceUsage>, DashboardError> {
        self.get_json(Service::Reports, "/api/reportes/uso-espacios", &[])
            .await
    }

    async fn monthly_reservations(&self) -> Result<Vec<MonthlyReservations>, DashboardError> {
        self.get_json(Service::Reports, "/api/reportes/reservas-mes", &[])
            .await
    }
}

#[async_trait]
impl ExportService for HttpBackend {
    async fn export(
        &self,
        target: ExportTarget,
        format: ExportFormat,
    ) -> Result<Vec<u8>, DashboardError> {
        let (service, base) = match target {
            ExportTarget::Audits => (Service::Audits, "/api/auditorias/exportacion"),
            ExportTarget::Reports => (Service::Reports, "/api/reportes/exportacion"),
        };
        let path = format!("{base}/{}", format.path_segment());
        self.get_bytes(service, &path).await
    }
}
