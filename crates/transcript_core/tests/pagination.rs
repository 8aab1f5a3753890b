use std::sync::Once;

use transcript_core::{
    advance, PaginationEffect, PaginationMsg, PaginationOutcome, PaginationPhase,
    PaginationSettings, PaginationState, TerminalReason,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn settings() -> PaginationSettings {
    PaginationSettings {
        settle_delay_ms: 0,
        ..PaginationSettings::default()
    }
}

fn located(settings: PaginationSettings, offset: f64, item_count: usize) -> PaginationState {
    let (state, effects) = advance(
        PaginationState::new(settings),
        PaginationMsg::ContainerLocated { offset, item_count },
    );
    assert_eq!(state.phase(), PaginationPhase::Scrolling);
    assert_eq!(effects.len(), 1);
    state
}

fn tick(
    state: PaginationState,
    offset: f64,
    item_count: usize,
) -> (PaginationState, Vec<PaginationEffect>) {
    advance(state, PaginationMsg::Tick { offset, item_count })
}

fn converged(effects: &[PaginationEffect]) -> Option<PaginationOutcome> {
    effects.iter().find_map(|effect| match effect {
        PaginationEffect::Converged(outcome) => Some(*outcome),
        _ => None,
    })
}

#[test]
fn locating_scrolls_one_step_up() {
    init_logging();
    let (state, effects) = advance(
        PaginationState::new(settings()),
        PaginationMsg::ContainerLocated {
            offset: 1200.0,
            item_count: 8,
        },
    );

    assert_eq!(effects, vec![PaginationEffect::ScrollTo { offset: 700.0 }]);
    assert_eq!(state.previous_visible_count(), 8);
    assert_eq!(state.previous_scroll_offset(), 1200.0);
    assert_eq!(state.iteration_count(), 0);
}

#[test]
fn scroll_target_never_goes_negative() {
    init_logging();
    let state = located(settings(), 900.0, 3);
    let (_state, effects) = tick(state, 120.0, 4);
    assert_eq!(
        effects,
        vec![
            PaginationEffect::ReportProgress {
                iteration: 1,
                offset: 120.0,
                item_count: 4,
            },
            PaginationEffect::ScrollTo { offset: 0.0 },
        ]
    );
}

#[test]
fn reaching_the_boundary_requires_a_recheck() {
    init_logging();
    let settings = PaginationSettings {
        boundary_threshold: 10.0,
        ..settings()
    };
    let mut state = located(settings, 800.0, 5);

    for (offset, count) in [(500.0, 10), (200.0, 20), (50.0, 30)] {
        let (next, effects) = tick(state, offset, count);
        assert!(converged(&effects).is_none());
        assert!(matches!(
            effects.last(),
            Some(PaginationEffect::ScrollTo { .. })
        ));
        state = next;
    }

    let (state, effects) = tick(state, 0.0, 40);
    assert_eq!(state.phase(), PaginationPhase::ConfirmingBoundary);
    assert_eq!(
        effects,
        vec![
            PaginationEffect::ReportProgress {
                iteration: 4,
                offset: 0.0,
                item_count: 40,
            },
            PaginationEffect::RecheckBoundary,
        ]
    );

    let (state, effects) = advance(state, PaginationMsg::BoundaryRechecked { item_count: 42 });
    assert_eq!(
        converged(&effects),
        Some(PaginationOutcome {
            reason: TerminalReason::ReachedBoundary,
            iterations: 4,
            item_count: 42,
        })
    );
    assert_eq!(state.terminal_reason(), Some(TerminalReason::ReachedBoundary));
    assert!(state.is_terminal());
}

#[test]
fn frozen_viewport_converges_as_stable_before_the_boundary() {
    init_logging();
    let mut state = located(settings(), 400.0, 10);

    for expected_streak in 1..=2 {
        let (next, effects) = tick(state, 400.0, 10);
        assert!(converged(&effects).is_none());
        assert_eq!(next.stable_iteration_streak(), expected_streak);
        state = next;
    }

    let (state, effects) = tick(state, 400.0, 10);
    assert_eq!(
        converged(&effects),
        Some(PaginationOutcome {
            reason: TerminalReason::Stable,
            iterations: 3,
            item_count: 10,
        })
    );
    assert_eq!(state.phase(), PaginationPhase::Converged);
}

#[test]
fn new_items_reset_the_stability_streak() {
    init_logging();
    let mut state = located(settings(), 400.0, 10);
    let observations = [(400.0, 10), (400.0, 10), (400.0, 11), (400.0, 11), (400.0, 11)];
    for (offset, count) in observations {
        let (next, effects) = tick(state, offset, count);
        assert!(converged(&effects).is_none());
        state = next;
    }
    assert_eq!(state.stable_iteration_streak(), 2);

    let (_state, effects) = tick(state, 400.0, 11);
    let outcome = converged(&effects).expect("stable after reset");
    assert_eq!(outcome.reason, TerminalReason::Stable);
    assert_eq!(outcome.iterations, 6);
}

#[test]
fn moving_offset_is_not_stable_even_with_frozen_count() {
    init_logging();
    let mut state = located(settings(), 5000.0, 10);
    for offset in [4500.0, 4000.0, 3500.0, 3000.0, 2500.0] {
        let (next, effects) = tick(state, offset, 10);
        assert!(converged(&effects).is_none());
        state = next;
    }
    assert_eq!(state.stable_iteration_streak(), 0);
}

#[test]
fn iteration_ceiling_is_a_soft_success() {
    init_logging();
    let settings = PaginationSettings {
        max_iterations: 2,
        ..settings()
    };
    let state = located(settings, 5000.0, 1);
    let (state, _) = tick(state, 4500.0, 2);
    let (state, _) = tick(state, 4000.0, 3);
    let (state, effects) = tick(state, 3500.0, 4);

    let outcome = converged(&effects).expect("ceiling reached");
    assert_eq!(
        outcome,
        PaginationOutcome {
            reason: TerminalReason::MaxIterationsExceeded,
            iterations: 2,
            item_count: 4,
        }
    );
    assert!(outcome.is_success());
    assert_eq!(state.iteration_count(), 2);
}

#[test]
fn cancellation_keeps_the_partial_count() {
    init_logging();
    let state = located(settings(), 3000.0, 7);
    let (state, _) = tick(state, 2500.0, 12);
    let (state, effects) = advance(state, PaginationMsg::CancelRequested);

    let outcome = converged(&effects).expect("cancelled");
    assert_eq!(outcome.reason, TerminalReason::Cancelled);
    assert_eq!(outcome.item_count, 12);
    assert_eq!(outcome.iterations, 1);
    assert!(!outcome.is_success());
    assert_eq!(state.terminal_reason(), Some(TerminalReason::Cancelled));
}

#[test]
fn missing_container_fails_and_ignores_later_ticks() {
    init_logging();
    let (state, effects) = advance(
        PaginationState::new(settings()),
        PaginationMsg::ContainerMissing,
    );
    assert_eq!(effects, vec![PaginationEffect::ContainerNotFound]);
    assert_eq!(state.phase(), PaginationPhase::Failed);

    let (state, effects) = tick(state, 100.0, 3);
    assert!(effects.is_empty());
    assert_eq!(state.iteration_count(), 0);
}

#[test]
fn terminal_state_is_sticky() {
    init_logging();
    let state = located(settings(), 400.0, 10);
    let (state, _) = tick(state, 400.0, 10);
    let (state, _) = tick(state, 400.0, 10);
    let (state, _) = tick(state, 400.0, 10);
    assert_eq!(state.terminal_reason(), Some(TerminalReason::Stable));

    let before = state.clone();
    let (state, effects) = advance(state, PaginationMsg::CancelRequested);
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn ticks_before_location_are_ignored() {
    init_logging();
    let state = PaginationState::new(settings());
    let (state, effects) = tick(state, 100.0, 3);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), PaginationPhase::Locating);
}
