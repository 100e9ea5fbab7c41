//! Query executor
//!
//! Owns the authoritative result set of one view. Each load records its
//! query as the committed one, captures a generation at dispatch and commits
//! only if it is still the newest load. A failed load keeps the previous rows
//! and records the normalized message.

use campus_core::{DashboardError, EffectiveQuery, LoadStatus, RowSource};
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Result of a load that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome<R> {
    /// Rows were committed
    Applied(Arc<Vec<R>>),
    /// A newer load was dispatched; nothing was committed
    Superseded,
}

impl<R> ExecOutcome<R> {
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Read-only view of an executor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSnapshot<Q, R> {
    /// Rows of the last successful load
    pub rows: Arc<Vec<R>>,
    /// Load status
    pub status: LoadStatus,
    /// Query of the last load
    pub committed: Q,
}

#[derive(Debug)]
struct ExecutorState<Q, R> {
    rows: Arc<Vec<R>>,
    status: LoadStatus,
    committed: Q,
    generation: u64,
}

/// Executor of one effective query type against a row source
pub struct QueryExecutor<S, Q>
where
    S: RowSource<Q> + ?Sized,
{
    source: Arc<S>,
    baseline: Q,
    state: Arc<Mutex<ExecutorState<Q, S::Row>>>,
}

impl<S, Q> Clone for QueryExecutor<S, Q>
where
    S: RowSource<Q> + ?Sized,
    Q: Clone,
{
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            baseline: self.baseline.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S, Q> std::fmt::Debug for QueryExecutor<S, Q>
where
    S: RowSource<Q> + ?Sized,
    Q: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("QueryExecutor")
            .field("baseline", &self.baseline)
            .field("committed", &state.committed)
            .field("rows", &state.rows.len())
            .field("status", &state.status)
            .finish_non_exhaustive()
    }
}

impl<S, Q> QueryExecutor<S, Q>
where
    S: RowSource<Q> + ?Sized,
    Q: EffectiveQuery,
{
    /// Create with the empty query as baseline
    #[must_use]
    pub fn new(source: Arc<S>) -> Self {
        Self::with_baseline(source, Q::default())
    }

    /// Create with role-derived constraints every reset returns to
    #[must_use]
    pub fn with_baseline(source: Arc<S>, baseline: Q) -> Self {
        let state = ExecutorState {
            rows: Arc::new(Vec::new()),
            status: LoadStatus::default(),
            committed: baseline.clone(),
            generation: 0,
        };
        Self {
            source,
            baseline,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Query a reset returns to
    #[inline]
    #[must_use]
    pub fn baseline(&self) -> &Q {
        &self.baseline
    }

    /// Fetch `query`, committing it as the last used query
    ///
    /// # Errors
    /// Returns the normalized error of a current (not superseded) load
    pub async fn load(&self, query: Q) -> Result<ExecOutcome<S::Row>, DashboardError> {
        let generation = {
            let mut state = self.state.lock();
            state.committed = query.clone();
            state.generation += 1;
            state.status.begin();
            state.generation
        };
        self.execute(generation, &query).await
    }

    /// Re-issue the committed query
    ///
    /// # Errors
    /// Returns the normalized error of a current (not superseded) load
    pub async fn reload(&self) -> Result<ExecOutcome<S::Row>, DashboardError> {
        let (generation, query) = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.status.begin();
            (state.generation, state.committed.clone())
        };
        self.execute(generation, &query).await
    }

    /// Commit a sanitized draft and fetch it
    ///
    /// # Errors
    /// Returns the normalized error of a current (not superseded) load
    pub async fn apply_filters(&self, query: Q) -> Result<ExecOutcome<S::Row>, DashboardError> {
        tracing::info!(params = ?query.to_params(), "filters applied");
        self.load(query).await
    }

    /// Commit the baseline query and fetch it
    ///
    /// # Errors
    /// Returns the normalized error of a current (not superseded) load
    pub async fn reset_filters(&self) -> Result<ExecOutcome<S::Row>, DashboardError> {
        tracing::info!("filters reset");
        self.load(self.baseline.clone()).await
    }

    /// Discard every pending load
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.status.abandon();
    }

    /// Dismiss the error banner
    pub fn dismiss_error(&self) {
        self.state.lock().status.dismiss_error();
    }

    /// Rows of the last successful load
    #[must_use]
    pub fn rows(&self) -> Arc<Vec<S::Row>> {
        Arc::clone(&self.state.lock().rows)
    }

    #[must_use]
    pub fn status(&self) -> LoadStatus {
        self.state.lock().status.clone()
    }

    #[must_use]
    pub fn committed_query(&self) -> Q {
        self.state.lock().committed.clone()
    }

    /// Whether no load has succeeded yet and one is running
    #[must_use]
    pub fn shows_placeholder(&self) -> bool {
        self.state.lock().status.shows_placeholder()
    }

    #[must_use]
    pub fn snapshot(&self) -> ResultSnapshot<Q, S::Row> {
        let state = self.state.lock();
        ResultSnapshot {
            rows: Arc::clone(&state.rows),
            status: state.status.clone(),
            committed: state.committed.clone(),
        }
    }

    async fn execute(
        &self,
        generation: u64,
        query: &Q,
    ) -> Result<ExecOutcome<S::Row>, DashboardError> {
        tracing::debug!(generation, params = ?query.to_params(), "query dispatched");
        let result = self.source.fetch_rows(query).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::debug!(generation, current = state.generation, "stale result discarded");
            return Ok(ExecOutcome::Superseded);
        }
        match result {
            Ok(rows) => {
                tracing::debug!(generation, count = rows.len(), "result set replaced");
                let rows = Arc::new(rows);
                state.rows = Arc::clone(&rows);
                state.status.succeed(Utc::now());
                Ok(ExecOutcome::Applied(rows))
            }
            Err(err) => {
                tracing::warn!(error = %err, retryable = err.is_retryable(), "query failed");
                state.status.fail(err.user_message());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::{AuditEntry, AuditQuery, Service};
    use campus_test_utils::{audit_entry, ScriptedRows};
    use pretty_assertions::assert_eq;

    type Source = ScriptedRows<AuditQuery, AuditEntry>;

    #[tokio::test]
    async fn success_replaces_rows_and_stamps_status() {
        let source = Arc::new(Source::new(vec![]));
        source.push_ok(vec![audit_entry(1, "PENDIENTE", Some("APROBADA"), "Ana")]);
        let executor = QueryExecutor::new(Arc::clone(&source));

        assert!(!executor.shows_placeholder());
        let outcome = executor.load(AuditQuery::default()).await.unwrap();
        assert!(outcome.is_applied());

        let status = executor.status();
        assert!(!status.loading);
        assert!(status.error.is_none());
        assert!(status.last_updated.is_some());
        assert_eq!(executor.rows().len(), 1);
    }

    #[tokio::test]
    async fn failed_reload_keeps_rows_and_sets_error() {
        let source = Arc::new(Source::new(vec![]));
        source.push_ok(vec![
            audit_entry(1, "PENDIENTE", Some("APROBADA"), "Ana"),
            audit_entry(2, "PENDIENTE", None, "Luis"),
        ]);
        source.push_err(Service::Audits, "servicio en mantenimiento");
        let executor = QueryExecutor::new(Arc::clone(&source));
        executor.load(AuditQuery::default()).await.unwrap();

        let err = executor.reload().await.unwrap_err();
        assert_eq!(err.user_message(), "servicio en mantenimiento");
        assert_eq!(executor.rows().len(), 2);
        assert_eq!(
            executor.status().error.as_deref(),
            Some("servicio en mantenimiento")
        );

        executor.dismiss_error();
        assert!(executor.status().error.is_none());
    }

    #[tokio::test]
    async fn load_commits_the_query_for_reload() {
        let source = Arc::new(Source::new(vec![]));
        let executor = QueryExecutor::new(Arc::clone(&source));
        let query = AuditQuery {
            usuario: Some("ana".into()),
            ..AuditQuery::default()
        };

        executor.load(query.clone()).await.unwrap();
        executor.reload().await.unwrap();
        assert_eq!(source.queries(), vec![query.clone(), query.clone()]);
        assert_eq!(executor.committed_query(), query);
    }
}
