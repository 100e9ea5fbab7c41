//! Incident view
//!
//! Keeps the incident result set and the school selector in step with the
//! draft filter:
//! - A faculty change reloads the school options scoped to the new faculty
//! - An edit or promoted search whose effective query differs from the
//!   committed one is applied and fetched
//! - Loads run as background tasks; a newer load of the same kind supersedes
//!   an older one still in flight, so edits never wait on the network

use campus_catalog::{CatalogResolver, LoadOutcome};
use campus_core::{
    CatalogDimension, CatalogOption, CatalogService, DashboardConfig, DashboardError,
    IncidentQuery, RoleContext, RowSource,
};
use campus_filter::{FilterStateMachine, SearchUpdate, Transition};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::executor::{ExecOutcome, QueryExecutor};

type SchoolTask = JoinHandle<Result<LoadOutcome, DashboardError>>;
type RowTask<T> = JoinHandle<Result<ExecOutcome<T>, DashboardError>>;

/// Loads started by one change of the view
#[must_use = "dropping a sync detaches its loads; await `settled` to observe them"]
#[derive(Debug)]
pub struct ViewSync<T> {
    transition: Transition,
    schools: Option<SchoolTask>,
    rows: Option<RowTask<T>>,
}

/// Outcome of every load started by one change
#[derive(Debug)]
pub struct Settled<T> {
    /// Effect on the draft
    pub transition: Transition,
    /// School reload, when the change started one
    pub schools: Option<Result<LoadOutcome, DashboardError>>,
    /// Incident fetch, when the effective query changed
    pub rows: Option<Result<ExecOutcome<T>, DashboardError>>,
}

impl<T> ViewSync<T> {
    #[inline]
    pub fn transition(&self) -> Transition {
        self.transition
    }

    /// Whether the change started a school reload
    #[inline]
    #[must_use]
    pub fn reloads_schools(&self) -> bool {
        self.schools.is_some()
    }

    /// Whether the change started an incident fetch
    #[inline]
    #[must_use]
    pub fn fetches_rows(&self) -> bool {
        self.rows.is_some()
    }

    /// Wait for the loads started by the change
    ///
    /// A load whose task was aborted reports `Superseded`; a panic inside a
    /// load resumes on the caller.
    pub async fn settled(self) -> Settled<T> {
        let schools = match self.schools {
            Some(task) => Some(joined(task, Ok(LoadOutcome::Superseded)).await),
            None => None,
        };
        let rows = match self.rows {
            Some(task) => Some(joined(task, Ok(ExecOutcome::Superseded)).await),
            None => None,
        };
        Settled {
            transition: self.transition,
            schools,
            rows,
        }
    }
}

async fn joined<T>(task: JoinHandle<T>, aborted: T) -> T {
    match task.await {
        Ok(value) => value,
        Err(err) => match err.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            Err(_) => aborted,
        },
    }
}

/// Draft filter, catalog selectors and result set of the incident view
///
/// Edits spawn their loads on the current Tokio runtime and return at once.
pub struct IncidentView<C, R>
where
    C: ?Sized,
    R: RowSource<IncidentQuery> + ?Sized,
{
    filter: FilterStateMachine,
    catalog: CatalogResolver<C>,
    incidents: QueryExecutor<R, IncidentQuery>,
}

impl<C, R> std::fmt::Debug for IncidentView<C, R>
where
    C: ?Sized,
    R: RowSource<IncidentQuery> + ?Sized,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncidentView")
            .field("filter", &self.filter)
            .field("incidents", &self.incidents)
            .finish_non_exhaustive()
    }
}

impl<C, R> IncidentView<C, R>
where
    C: CatalogService + ?Sized + 'static,
    R: RowSource<IncidentQuery> + ?Sized + 'static,
{
    /// Create the view for a session role
    #[must_use]
    pub fn new(catalog: Arc<C>, rows: Arc<R>, role: RoleContext, config: &DashboardConfig) -> Self {
        let baseline = IncidentQuery::for_role(&role);
        Self::from_parts(
            FilterStateMachine::from_config(role.clone(), config),
            CatalogResolver::from_config(catalog, role, config),
            QueryExecutor::with_baseline(rows, baseline),
        )
    }

    /// Assemble from collaborators scoped to the same role
    #[must_use]
    pub fn from_parts(
        filter: FilterStateMachine,
        catalog: CatalogResolver<C>,
        incidents: QueryExecutor<R, IncidentQuery>,
    ) -> Self {
        Self {
            filter,
            catalog,
            incidents,
        }
    }

    #[inline]
    #[must_use]
    pub fn filter(&self) -> &FilterStateMachine {
        &self.filter
    }

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &CatalogResolver<C> {
        &self.catalog
    }

    #[inline]
    #[must_use]
    pub fn incidents(&self) -> &QueryExecutor<R, IncidentQuery> {
        &self.incidents
    }

    /// Space options of the selected school, or all without one
    #[must_use]
    pub fn visible_spaces(&self) -> Vec<CatalogOption> {
        let spaces = self.catalog.options(CatalogDimension::Space);
        self.filter.visible_spaces(&spaces).cloned().collect()
    }

    /// Load the selectors and the first result set
    ///
    /// Catalog failures stay on their dimension's status.
    ///
    /// # Errors
    /// Returns the incident fetch error of a current (not superseded) load
    pub async fn open(&self) -> Result<ExecOutcome<R::Row>, DashboardError> {
        let (_, rows) = tokio::join!(
            self.catalog.load_all(self.filter.selected_faculty()),
            self.incidents.load(self.filter.effective_query())
        );
        rows
    }

    /// Select a faculty; reloads schools for it and refetches
    pub fn set_facultad(&mut self, raw: &str) -> ViewSync<R::Row> {
        let transition = self.filter.set_facultad(raw);
        self.follow(transition)
    }

    /// Select a school; refetches when the effective query changed
    pub fn set_escuela(&mut self, raw: &str) -> ViewSync<R::Row> {
        let transition = self.filter.set_escuela(raw);
        self.follow(transition)
    }

    /// Select a space; refetches when the effective query changed
    pub fn set_espacio(&mut self, raw: &str) -> ViewSync<R::Row> {
        let transition = self.filter.set_espacio(raw);
        self.follow(transition)
    }

    /// Buffer a typed search term; nothing is fetched until it settles
    pub fn set_search_term(&mut self, raw: impl Into<String>) {
        self.filter.set_search_term(raw);
    }

    /// Wait for the buffered search term to settle and fetch if it was
    /// promoted
    ///
    /// Returns `None` when no term is buffered. Cancel-safe.
    pub async fn next_search_update(&mut self) -> Option<ViewSync<R::Row>> {
        let transition = match self.filter.next_search_update().await? {
            SearchUpdate::Promoted(_) => Transition::Applied,
            SearchUpdate::Unchanged => Transition::Unchanged,
        };
        Some(self.follow(transition))
    }

    /// Clear the draft and fetch the role baseline
    pub fn reset(&mut self) -> ViewSync<R::Row> {
        let transition = self.filter.reset();
        let schools = self.school_reload(transition);
        let rows = transition.changed().then(|| {
            let incidents = self.incidents.clone();
            tokio::spawn(async move { incidents.reset_filters().await })
        });
        ViewSync {
            transition,
            schools,
            rows,
        }
    }

    /// Discard every load in flight, e.g. when the view closes
    pub fn cancel(&self) {
        self.catalog.cancel_all();
        self.incidents.cancel();
    }

    fn follow(&self, transition: Transition) -> ViewSync<R::Row> {
        let schools = self.school_reload(transition);
        let rows = if transition.changed() {
            self.sync_rows()
        } else {
            None
        };
        ViewSync {
            transition,
            schools,
            rows,
        }
    }

    fn school_reload(&self, transition: Transition) -> Option<SchoolTask> {
        let Transition::ReloadSchools(faculty) = transition else {
            return None;
        };
        let catalog = self.catalog.clone();
        Some(tokio::spawn(async move { catalog.load_schools(faculty).await }))
    }

    fn sync_rows(&self) -> Option<RowTask<R::Row>> {
        let query = self.filter.effective_query();
        if query == self.incidents.committed_query() {
            tracing::debug!("effective query unchanged; no fetch");
            return None;
        }
        let incidents = self.incidents.clone();
        Some(tokio::spawn(async move { incidents.apply_filters(query).await }))
    }
}
