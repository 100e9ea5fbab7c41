//! Functional tests for the incident filter draft.
//!
//! - Cascading resets hold for any edit sequence
//! - A burst of keystrokes promotes exactly one search term
//! - Supervisor queries stay pinned whatever the user does

use campus_core::{CatalogOption, RoleContext};
use campus_filter::{FilterStateMachine, SearchUpdate, Transition};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
enum Edit {
    Faculty(String),
    School(String),
    Space(String),
    Reset,
}

fn edit() -> impl Strategy<Value = Edit> {
    let raw = prop_oneof![Just(String::new()), "[0-9]{1,3}", "[a-z]{1,3}"];
    prop_oneof![
        raw.clone().prop_map(Edit::Faculty),
        raw.clone().prop_map(Edit::School),
        raw.prop_map(Edit::Space),
        Just(Edit::Reset),
    ]
}

fn apply(machine: &mut FilterStateMachine, edit: &Edit) -> Transition {
    match edit {
        Edit::Faculty(raw) => machine.set_facultad(raw),
        Edit::School(raw) => machine.set_escuela(raw),
        Edit::Space(raw) => machine.set_espacio(raw),
        Edit::Reset => machine.reset(),
    }
}

/// Helper: campus with two schools and their spaces
fn spaces() -> Vec<CatalogOption> {
    vec![
        CatalogOption::new(100, "Laboratorio de Redes").with_parent(10),
        CatalogOption::new(101, "Aula 101").with_parent(10),
        CatalogOption::new(110, "Aula Magna").with_parent(11),
    ]
}

proptest! {
    #[test]
    fn changed_faculty_always_clears_school_and_space(edits in prop::collection::vec(edit(), 0..24)) {
        let mut machine = FilterStateMachine::new(RoleContext::Administrative);
        for edit in &edits {
            let transition = apply(&mut machine, edit);
            if let (Edit::Faculty(_), Transition::ReloadSchools(_)) = (edit, transition) {
                prop_assert_eq!(machine.escuela_id(), None);
                prop_assert_eq!(machine.espacio_id(), None);
            }
            if let (Edit::School(_), Transition::Applied) = (edit, transition) {
                prop_assert_eq!(machine.espacio_id(), None);
            }
        }
    }

    #[test]
    fn supervisor_query_is_pinned_for_any_edits(edits in prop::collection::vec(edit(), 0..24)) {
        let role = RoleContext::Supervisor { escuela_id: 42, escuela_nombre: "Escuela X".into() };
        let mut machine = FilterStateMachine::new(role);
        for edit in &edits {
            let transition = apply(&mut machine, edit);
            if matches!(edit, Edit::Faculty(_) | Edit::School(_)) {
                prop_assert_eq!(transition, Transition::Ignored);
            }
            let query = machine.effective_query();
            prop_assert_eq!(query.facultad_id, None);
            prop_assert_eq!(query.escuela_id, Some(42));
            prop_assert_eq!(query.escuela_contexto_id, Some(42));
        }
    }
}

#[test]
fn selecting_school_narrows_spaces_and_faculty_change_resets_them() {
    let catalog = spaces();
    let mut machine = FilterStateMachine::new(RoleContext::Administrative);

    let _ = machine.set_facultad("1");
    let _ = machine.set_escuela("10");
    let ids: Vec<_> = machine.visible_spaces(&catalog).map(|s| s.id).collect();
    assert_eq!(ids, [100, 101]);

    let _ = machine.set_espacio("101");
    assert_eq!(machine.effective_query().espacio_id, Some(101));

    assert_eq!(machine.set_facultad("2"), Transition::ReloadSchools(Some(2)));
    assert_eq!(machine.visible_spaces(&catalog).count(), 3);
    assert_eq!(machine.effective_query().espacio_id, None);
}

#[tokio::test(start_paused = true)]
async fn burst_of_keystrokes_promotes_exactly_once() {
    let mut machine =
        FilterStateMachine::with_debounce(RoleContext::Administrative, Duration::from_millis(400));
    let start = Instant::now();

    for term in ["l", "la", "lab"] {
        machine.set_search_term(term);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    assert_eq!(
        machine.next_search_update().await,
        Some(SearchUpdate::Promoted("lab".into()))
    );
    assert_eq!(start.elapsed(), Duration::from_millis(600));
    assert_eq!(machine.next_search_update().await, None);
    assert_eq!(machine.effective_query().search.as_deref(), Some("lab"));
}

#[tokio::test(start_paused = true)]
async fn retyping_the_effective_term_is_not_promoted() {
    let mut machine = FilterStateMachine::new(RoleContext::Other);
    machine.set_search_term("aula");
    machine.next_search_update().await;

    machine.set_search_term("aul");
    machine.set_search_term("aula");
    assert_eq!(
        machine.next_search_update().await,
        Some(SearchUpdate::Unchanged)
    );
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_pending_search() {
    let mut machine = FilterStateMachine::new(RoleContext::Administrative);
    machine.set_search_term("proyector");
    let _ = machine.reset();

    assert_eq!(machine.next_search_update().await, None);
    assert_eq!(machine.effective_query().search, None);
}
