use anyhow::{anyhow, Context, Result};
use campus_catalog::CatalogResolver;
use campus_client::HttpBackend;
use campus_console::{cli, load_config, render, resolve_role};
use campus_core::{
    AuditFilterForm, AuditQuery, CatalogId, DashboardConfig, ExportFormat, ExportTarget,
    RoleContext,
};
use campus_query::{export_dataset, projector, IncidentView, QueryExecutor, ReportBoard, ViewSync};
use clap::ArgMatches;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

fn text_arg<'a>(args: &'a ArgMatches, name: &str) -> &'a str {
    args.get_one::<String>(name).map_or("", String::as_str)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = cli::command().get_matches();

    let config = load_config(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))
        .context("loading configuration")?;
    let role = resolve_role(
        text_arg(&matches, "role"),
        matches.get_one::<CatalogId>("escuela-id").copied(),
        matches.get_one::<String>("escuela-nombre").cloned(),
    )?;
    let backend = Arc::new(HttpBackend::new(&config).context("building HTTP client")?);
    let json = matches.get_flag("json");
    tracing::info!(base_url = backend.base_url(), role = ?role.kind(), "panel session started");

    match matches.subcommand() {
        Some(("catalog", args)) => catalog(backend, role, &config, args, json).await,
        Some(("incidents", args)) => incidents(backend, role, &config, args, json).await,
        Some(("audits", args)) => audits(backend, args, json).await,
        Some(("reports", _)) => reports(backend, json).await,
        Some(("export", args)) => export(backend, args).await,
        _ => {
            cli::command().print_help()?;
            Ok(())
        }
    }
}

async fn catalog(
    backend: Arc<HttpBackend>,
    role: RoleContext,
    config: &DashboardConfig,
    args: &ArgMatches,
    json: bool,
) -> Result<()> {
    let resolver = CatalogResolver::from_config(backend, role, config);
    let faculty = args.get_one::<CatalogId>("facultad").copied();
    let snapshot = resolver.load_all(faculty).await;
    emit(json, &snapshot, || render::catalog(&snapshot))
}

async fn incidents(
    backend: Arc<HttpBackend>,
    role: RoleContext,
    config: &DashboardConfig,
    args: &ArgMatches,
    json: bool,
) -> Result<()> {
    let mut view = IncidentView::new(Arc::clone(&backend), backend, role, config);
    let mut pending = vec![
        view.set_facultad(text_arg(args, "facultad")),
        view.set_escuela(text_arg(args, "escuela")),
        view.set_espacio(text_arg(args, "espacio")),
    ];
    let search = text_arg(args, "search");
    if !search.trim().is_empty() {
        view.set_search_term(search);
        pending.extend(view.next_search_update().await);
    }

    let fetched = pending.iter().any(ViewSync::fetches_rows);
    for sync in pending {
        if let Some(rows) = sync.settled().await.rows {
            rows?;
        }
    }
    if !fetched {
        view.incidents().reload().await?;
    }

    let executor = view.incidents();
    let rows = executor.rows();
    let narrowed = projector::filter_slice(&rows, text_arg(args, "filtro"));
    let summary = projector::summarize(&narrowed);
    let output = serde_json::json!({
        "query": executor.committed_query(),
        "rows": narrowed,
        "summary": summary,
    });
    emit(json, &output, || {
        format!("{}{}", render::incidents(narrowed.iter()), render::summary(&summary))
    })
}

async fn audits(backend: Arc<HttpBackend>, args: &ArgMatches, json: bool) -> Result<()> {
    let form = AuditFilterForm {
        reserva_id: text_arg(args, "reserva").to_string(),
        estado: text_arg(args, "estado").to_string(),
        usuario: text_arg(args, "usuario").to_string(),
        fecha_inicio: text_arg(args, "desde").to_string(),
        fecha_fin: text_arg(args, "hasta").to_string(),
    };
    let executor = QueryExecutor::<_, AuditQuery>::new(backend);
    executor.apply_filters(form.sanitize()).await?;

    let rows = executor.rows();
    let narrowed = projector::filter_slice(&rows, text_arg(args, "filtro"));
    let summary = projector::summarize(&narrowed);
    let output = serde_json::json!({
        "query": executor.committed_query(),
        "rows": narrowed,
        "summary": summary,
    });
    emit(json, &output, || {
        format!("{}{}", render::audits(narrowed.iter()), render::summary(&summary))
    })
}

async fn reports(backend: Arc<HttpBackend>, json: bool) -> Result<()> {
    let board = ReportBoard::new(backend);
    let snapshot = board.load_all().await;
    emit(json, &snapshot, || render::reports(&snapshot))
}

async fn export(backend: Arc<HttpBackend>, args: &ArgMatches) -> Result<()> {
    let target = match text_arg(args, "dataset") {
        "audits" => ExportTarget::Audits,
        _ => ExportTarget::Reports,
    };
    let format: ExportFormat = text_arg(args, "format").parse().map_err(|e: String| anyhow!(e))?;
    let out_dir = args
        .get_one::<PathBuf>("out-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    let file = export_dataset(backend.as_ref(), target, format).await?;
    let path = out_dir.join(&file.file_name);
    tokio::fs::write(&path, &file.bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}
