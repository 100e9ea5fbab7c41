//! Functional tests for the incident view.
//!
//! - Filter edits reach the catalog resolver and the executor
//! - A slower school load for an older faculty never overwrites a newer one
//! - Typing only fetches once the search term settles

use async_trait::async_trait;
use campus_catalog::LoadOutcome;
use campus_core::{
    CatalogDimension, CatalogId, CatalogOption, CatalogService, DashboardConfig, DashboardError,
    Incident, IncidentQuery, RoleContext,
};
use campus_filter::Transition;
use campus_query::IncidentView;
use campus_test_utils::{incident, FakeCatalog, ScriptedRows};
use mockall::mock;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

mock! {
    Catalog {}

    #[async_trait]
    impl CatalogService for Catalog {
        async fn faculties(&self) -> Result<Vec<CatalogOption>, DashboardError>;
        async fn schools(&self, faculty_id: Option<CatalogId>) -> Result<Vec<CatalogOption>, DashboardError>;
        async fn spaces(&self) -> Result<Vec<CatalogOption>, DashboardError>;
    }
}

type Rows = ScriptedRows<IncidentQuery, Incident>;

/// Helper: incident source answering every query with one row
fn incident_rows() -> Arc<Rows> {
    Arc::new(Rows::new(vec![incident(1, Some("ABIERTA"), "Aula Magna")]))
}

fn supervisor() -> RoleContext {
    RoleContext::Supervisor {
        escuela_id: 10,
        escuela_nombre: "Sistemas".into(),
    }
}

#[tokio::test]
async fn faculty_change_loads_schools_of_that_faculty_once() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_schools()
        .withf(|faculty| *faculty == Some(2))
        .times(1)
        .returning(|_| Ok(vec![CatalogOption::new(20, "Biología").with_parent(2)]));
    let rows = incident_rows();
    let mut view = IncidentView::new(
        Arc::new(catalog),
        Arc::clone(&rows),
        RoleContext::Administrative,
        &DashboardConfig::default(),
    );

    let settled = view.set_facultad("2").settled().await;

    assert_eq!(settled.transition, Transition::ReloadSchools(Some(2)));
    assert!(matches!(settled.schools, Some(Ok(LoadOutcome::Applied(_)))));
    assert_eq!(
        view.catalog().options(CatalogDimension::School),
        [CatalogOption::new(20, "Biología").with_parent(2)]
    );
    assert_eq!(
        rows.queries(),
        [IncidentQuery {
            facultad_id: Some(2),
            ..IncidentQuery::for_role(&RoleContext::Administrative)
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn slower_school_load_of_previous_faculty_is_superseded() {
    let fake = Arc::new(FakeCatalog::campus());
    fake.delay_schools_for(Some(1), Duration::from_millis(300));
    let rows = incident_rows();
    let mut view = IncidentView::new(
        Arc::clone(&fake),
        Arc::clone(&rows),
        RoleContext::Administrative,
        &DashboardConfig::default(),
    );

    let older = view.set_facultad("1");
    tokio::time::sleep(Duration::from_millis(10)).await;
    let newer = view.set_facultad("2");
    let (older, newer) = tokio::join!(older.settled(), newer.settled());

    assert_eq!(older.schools, Some(Ok(LoadOutcome::Superseded)));
    assert_eq!(
        newer.schools,
        Some(Ok(LoadOutcome::Applied(vec![
            CatalogOption::new(20, "Biología").with_parent(2)
        ])))
    );
    let schools: Vec<_> = view
        .catalog()
        .options(CatalogDimension::School)
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(schools, [20]);
    assert_eq!(fake.calls(CatalogDimension::School), 2);
    assert_eq!(view.incidents().committed_query().facultad_id, Some(2));
}

#[tokio::test(start_paused = true)]
async fn burst_of_keystrokes_fetches_once() {
    let rows = incident_rows();
    let mut view = IncidentView::new(
        Arc::new(FakeCatalog::campus()),
        Arc::clone(&rows),
        RoleContext::Administrative,
        &DashboardConfig::default(),
    );
    let start = Instant::now();

    for term in ["p", "pr", "proy", "proyector"] {
        view.set_search_term(term);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(rows.queries().is_empty());

    let Some(sync) = view.next_search_update().await else {
        panic!("buffered search term never settled");
    };
    assert_eq!(start.elapsed(), Duration::from_millis(700));
    assert!(sync.fetches_rows());
    let settled = sync.settled().await;
    assert!(settled.rows.unwrap().unwrap().is_applied());

    let queries = rows.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].search.as_deref(), Some("proyector"));
    assert!(view.next_search_update().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn settling_on_the_effective_term_fetches_nothing() {
    let rows = incident_rows();
    let mut view = IncidentView::new(
        Arc::new(FakeCatalog::campus()),
        Arc::clone(&rows),
        RoleContext::Other,
        &DashboardConfig::default(),
    );
    view.set_search_term("aula");
    if let Some(sync) = view.next_search_update().await {
        let _ = sync.settled().await;
    }

    view.set_search_term("aula ");
    let Some(sync) = view.next_search_update().await else {
        panic!("buffered search term never settled");
    };
    assert_eq!(sync.transition(), Transition::Unchanged);
    assert!(!sync.fetches_rows());
    assert_eq!(rows.queries().len(), 1);
}

#[tokio::test]
async fn supervisor_edits_never_reach_school_endpoint() {
    let fake = Arc::new(FakeCatalog::campus());
    let rows = incident_rows();
    let mut view = IncidentView::new(
        Arc::clone(&fake),
        Arc::clone(&rows),
        supervisor(),
        &DashboardConfig::default(),
    );

    let ignored = view.set_facultad("1");
    assert_eq!(ignored.transition(), Transition::Ignored);
    assert!(!ignored.reloads_schools());
    assert!(!ignored.fetches_rows());

    let settled = view.set_espacio("100").settled().await;
    assert!(settled.rows.unwrap().unwrap().is_applied());
    let repeated = view.set_espacio("100");
    assert_eq!(repeated.transition(), Transition::Unchanged);
    assert!(!repeated.fetches_rows());

    assert_eq!(fake.calls(CatalogDimension::School), 0);
    let last = rows.queries().pop().unwrap();
    assert_eq!(last.escuela_id, Some(10));
    assert_eq!(last.escuela_contexto_id, Some(10));
    assert_eq!(last.espacio_id, Some(100));
}

#[tokio::test]
async fn unparsable_faculty_reloads_every_school_without_fetching() {
    let fake = Arc::new(FakeCatalog::campus());
    let rows = incident_rows();
    let mut view = IncidentView::new(
        Arc::clone(&fake),
        Arc::clone(&rows),
        RoleContext::Administrative,
        &DashboardConfig::default(),
    );

    let sync = view.set_facultad("ingenieria");
    assert_eq!(sync.transition(), Transition::ReloadSchools(None));
    assert!(!sync.fetches_rows());
    let settled = sync.settled().await;

    assert!(settled.schools.unwrap().unwrap().is_applied());
    assert_eq!(view.catalog().options(CatalogDimension::School).len(), 3);
    assert!(rows.queries().is_empty());
}

#[tokio::test]
async fn reset_returns_to_role_baseline() {
    let fake = Arc::new(FakeCatalog::campus());
    let rows = incident_rows();
    let mut view = IncidentView::new(
        Arc::clone(&fake),
        Arc::clone(&rows),
        RoleContext::Administrative,
        &DashboardConfig::default(),
    );
    let _ = view.set_facultad("1").settled().await;
    let _ = view.set_escuela("10").settled().await;

    let settled = view.reset().settled().await;

    assert_eq!(settled.transition, Transition::ReloadSchools(None));
    assert_eq!(view.catalog().options(CatalogDimension::School).len(), 3);
    assert_eq!(
        rows.queries().pop(),
        Some(IncidentQuery::for_role(&RoleContext::Administrative))
    );
    assert_eq!(view.filter().facultad_id(), None);
}

#[tokio::test]
async fn open_loads_selectors_and_first_result_set() {
    let rows = incident_rows();
    let mut view = IncidentView::new(
        Arc::new(FakeCatalog::campus()),
        Arc::clone(&rows),
        RoleContext::Administrative,
        &DashboardConfig::default(),
    );

    assert!(view.open().await.unwrap().is_applied());
    assert_eq!(view.visible_spaces().len(), 4);
    assert_eq!(view.incidents().rows().len(), 1);

    let _ = view.set_escuela("11").settled().await;
    let ids: Vec<_> = view.visible_spaces().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, [110]);
}

#[tokio::test(start_paused = true)]
async fn cancel_discards_school_load_in_flight() {
    let fake = Arc::new(FakeCatalog::campus());
    fake.delay_schools_for(Some(1), Duration::from_millis(300));
    let mut view = IncidentView::new(
        Arc::clone(&fake),
        incident_rows(),
        RoleContext::Administrative,
        &DashboardConfig::default(),
    );

    let sync = view.set_facultad("1");
    tokio::time::sleep(Duration::from_millis(10)).await;
    view.cancel();
    let settled = sync.settled().await;

    assert_eq!(settled.schools, Some(Ok(LoadOutcome::Superseded)));
    assert!(view.catalog().options(CatalogDimension::School).is_empty());
    assert!(!view.catalog().status(CatalogDimension::School).loading);
}
