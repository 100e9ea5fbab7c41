//! Filter state machine
//!
//! Draft filter of the incident view:
//! - Changing the faculty clears school and space and asks for a school reload
//! - Changing the school clears the space
//! - Free-text search is buffered and promoted after a quiet period, only if it
//!   differs from the value already in effect
//! - A supervisor's school is pinned; faculty and school edits are ignored

use campus_core::query::{keep, non_blank, parse_id};
use campus_core::{
    CatalogId, CatalogOption, DashboardConfig, FilterDimensions, IncidentQuery, RoleContext,
};
use std::time::Duration;

use crate::debounce::Debouncer;

/// Effect of a draft edit
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The role does not allow editing this dimension
    Ignored,
    /// The value was already in effect; nothing cascaded
    Unchanged,
    /// The draft changed
    Applied,
    /// The draft changed and schools must be reloaded for this faculty
    /// (`None` means every school)
    ReloadSchools(Option<CatalogId>),
}

impl Transition {
    /// Whether the draft changed
    #[inline]
    #[must_use]
    pub fn changed(self) -> bool {
        matches!(self, Self::Applied | Self::ReloadSchools(_))
    }
}

/// Outcome of a debounced search tick
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchUpdate {
    /// The buffered term is now the effective search
    Promoted(String),
    /// The buffered term equals the effective search
    Unchanged,
}

/// Role-aware draft of the incident filter
#[derive(Debug)]
pub struct FilterStateMachine {
    role: RoleContext,
    facultad_id: Option<String>,
    escuela_id: Option<String>,
    espacio_id: Option<String>,
    search_term: String,
    debounced_search: String,
    debouncer: Debouncer<String>,
}

impl FilterStateMachine {
    /// Create with the default search quiet period
    #[must_use]
    pub fn new(role: RoleContext) -> Self {
        Self::with_debounce(role, DashboardConfig::default().search_debounce())
    }

    /// Create with the quiet period from configuration
    #[must_use]
    pub fn from_config(role: RoleContext, config: &DashboardConfig) -> Self {
        Self::with_debounce(role, config.search_debounce())
    }

    /// Create with an explicit search quiet period
    #[must_use]
    pub fn with_debounce(role: RoleContext, delay: Duration) -> Self {
        Self {
            escuela_id: role.fixed_school().map(|id| id.to_string()),
            role,
            facultad_id: None,
            espacio_id: None,
            search_term: String::new(),
            debounced_search: String::new(),
            debouncer: Debouncer::new(delay),
        }
    }

    /// Session role the draft is scoped to
    #[inline]
    #[must_use]
    pub fn role(&self) -> &RoleContext {
        &self.role
    }

    /// Visibility of each dimension for the role
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> FilterDimensions {
        self.role.dimensions()
    }

    /// Faculty as selected, unparsed
    #[inline]
    #[must_use]
    pub fn facultad_id(&self) -> Option<&str> {
        self.facultad_id.as_deref()
    }

    /// School as selected, unparsed
    #[inline]
    #[must_use]
    pub fn escuela_id(&self) -> Option<&str> {
        self.escuela_id.as_deref()
    }

    /// Space as selected, unparsed
    #[inline]
    #[must_use]
    pub fn espacio_id(&self) -> Option<&str> {
        self.espacio_id.as_deref()
    }

    /// Search text as typed
    #[inline]
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Search text in effect
    #[inline]
    #[must_use]
    pub fn debounced_search(&self) -> &str {
        &self.debounced_search
    }

    /// Whether a typed search term is waiting for its quiet period
    #[inline]
    #[must_use]
    pub fn has_pending_search(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Select a faculty; blank clears it
    pub fn set_facultad(&mut self, raw: &str) -> Transition {
        if !self.dimensions().faculty.is_editable() {
            tracing::debug!(role = ?self.role.kind(), "faculty edit ignored");
            return Transition::Ignored;
        }
        let value = non_blank(raw);
        if value == self.facultad_id {
            return Transition::Unchanged;
        }
        self.facultad_id = value;
        self.escuela_id = None;
        self.espacio_id = None;
        let faculty = self.selected_faculty();
        tracing::debug!(?faculty, "faculty changed; school and space cleared");
        Transition::ReloadSchools(faculty)
    }

    /// Select a school; blank clears it
    pub fn set_escuela(&mut self, raw: &str) -> Transition {
        if !self.dimensions().school.is_editable() {
            tracing::debug!(role = ?self.role.kind(), "school edit ignored");
            return Transition::Ignored;
        }
        let value = non_blank(raw);
        if value == self.escuela_id {
            return Transition::Unchanged;
        }
        self.escuela_id = value;
        self.espacio_id = None;
        Transition::Applied
    }

    /// Select a space; blank clears it
    pub fn set_espacio(&mut self, raw: &str) -> Transition {
        if !self.dimensions().space.is_editable() {
            return Transition::Ignored;
        }
        let value = non_blank(raw);
        if value == self.espacio_id {
            return Transition::Unchanged;
        }
        self.espacio_id = value;
        Transition::Applied
    }

    /// Buffer a typed search term and restart the quiet period
    pub fn set_search_term(&mut self, raw: impl Into<String>) {
        self.search_term = raw.into();
        self.debouncer.arm(self.search_term.clone());
    }

    /// Wait for the buffered search term to settle and promote it
    ///
    /// Returns `None` when no term is buffered. Cancel-safe.
    pub async fn next_search_update(&mut self) -> Option<SearchUpdate> {
        let candidate = self.debouncer.fired().await?;
        Some(self.promote_search(candidate))
    }

    /// Promote a settled term if the search it sends differs from the one
    /// in effect; surrounding whitespace and blank terms compare as sent
    pub fn promote_search(&mut self, candidate: String) -> SearchUpdate {
        if non_blank(&candidate) == non_blank(&self.debounced_search) {
            return SearchUpdate::Unchanged;
        }
        tracing::debug!(search = %candidate, "search promoted");
        self.debounced_search.clone_from(&candidate);
        SearchUpdate::Promoted(candidate)
    }

    /// Parsed faculty selection; unparsable input counts as none
    #[must_use]
    pub fn selected_faculty(&self) -> Option<CatalogId> {
        self.facultad_id
            .as_deref()
            .and_then(|raw| keep(parse_id("facultadId", raw)))
    }

    /// Parsed school selection; unparsable input counts as none
    #[must_use]
    pub fn selected_school(&self) -> Option<CatalogId> {
        self.escuela_id
            .as_deref()
            .and_then(|raw| keep(parse_id("escuelaId", raw)))
    }

    /// Spaces belonging to the selected school, or all without one
    pub fn visible_spaces<'a>(
        &self,
        spaces: &'a [CatalogOption],
    ) -> impl Iterator<Item = &'a CatalogOption> + 'a {
        let school = self.selected_school();
        spaces
            .iter()
            .filter(move |space| school.is_none() || space.parent_id == school)
    }

    /// Sanitized query for the executor, with the role constraints merged in
    #[must_use]
    pub fn effective_query(&self) -> IncidentQuery {
        let mut query = IncidentQuery::for_role(&self.role);
        if self.role.fixed_school().is_none() {
            if self.dimensions().faculty.is_editable() {
                query.facultad_id = self.selected_faculty();
            }
            if self.dimensions().school.is_editable() {
                query.escuela_id = self.selected_school();
            }
        }
        query.espacio_id = self
            .espacio_id
            .as_deref()
            .and_then(|raw| keep(parse_id("espacioId", raw)));
        query.search = non_blank(&self.debounced_search);
        query
    }

    /// Clear the draft, keeping a supervisor's school and dropping any
    /// buffered search term
    pub fn reset(&mut self) -> Transition {
        let had_faculty = self.facultad_id.is_some();
        let pinned = self.role.fixed_school().map(|id| id.to_string());
        let changed = had_faculty
            || self.escuela_id != pinned
            || self.espacio_id.is_some()
            || !self.search_term.is_empty()
            || !self.debounced_search.is_empty()
            || self.debouncer.is_pending();

        self.debouncer.cancel();
        self.facultad_id = None;
        self.escuela_id = pinned;
        self.espacio_id = None;
        self.search_term.clear();
        self.debounced_search.clear();

        match (changed, had_faculty) {
            (false, _) => Transition::Unchanged,
            (true, true) => Transition::ReloadSchools(None),
            (true, false) => Transition::Applied,
        }
    }
}
