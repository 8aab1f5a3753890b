use engine_logging::{engine_debug, engine_info, engine_warn};

use super::{
    PaginationEffect, PaginationMsg, PaginationOutcome, PaginationPhase, PaginationState,
    TerminalReason,
};

/// Pure transition function: applies one observation and returns the effects to run.
pub fn advance(
    mut state: PaginationState,
    msg: PaginationMsg,
) -> (PaginationState, Vec<PaginationEffect>) {
    if state.is_terminal() {
        return (state, Vec::new());
    }

    let effects = match (state.phase, msg) {
        (_, PaginationMsg::CancelRequested) => {
            engine_info!(
                "History load cancelled after {} iterations ({} items)",
                state.iteration_count,
                state.previous_visible_count
            );
            let item_count = state.previous_visible_count;
            vec![converge(&mut state, TerminalReason::Cancelled, item_count)]
        }
        (PaginationPhase::Locating, PaginationMsg::ContainerLocated { offset, item_count }) => {
            state.phase = PaginationPhase::Scrolling;
            state.previous_scroll_offset = offset;
            state.previous_visible_count = item_count;
            vec![PaginationEffect::ScrollTo {
                offset: scroll_target(&state, offset),
            }]
        }
        (PaginationPhase::Locating, PaginationMsg::ContainerMissing) => {
            state.phase = PaginationPhase::Failed;
            vec![PaginationEffect::ContainerNotFound]
        }
        (PaginationPhase::Scrolling, PaginationMsg::Tick { offset, item_count }) => {
            on_tick(&mut state, offset, item_count)
        }
        (PaginationPhase::ConfirmingBoundary, PaginationMsg::BoundaryRechecked { item_count }) => {
            state.previous_visible_count = item_count;
            engine_info!("Reached the top of the history ({} items)", item_count);
            vec![converge(&mut state, TerminalReason::ReachedBoundary, item_count)]
        }
        (phase, msg) => {
            engine_debug!("Ignoring {:?} while {:?}", msg, phase);
            Vec::new()
        }
    };

    (state, effects)
}

fn on_tick(state: &mut PaginationState, offset: f64, item_count: usize) -> Vec<PaginationEffect> {
    if state.iteration_count >= state.settings.max_iterations {
        engine_warn!(
            "Stopped after the maximum of {} iterations ({} items loaded)",
            state.settings.max_iterations,
            item_count
        );
        state.previous_visible_count = item_count;
        return vec![converge(
            state,
            TerminalReason::MaxIterationsExceeded,
            item_count,
        )];
    }

    state.iteration_count += 1;
    engine_debug!(
        "Iteration {}: offset={} items={}",
        state.iteration_count,
        offset,
        item_count
    );
    let mut effects = vec![PaginationEffect::ReportProgress {
        iteration: state.iteration_count,
        offset,
        item_count,
    }];

    if offset <= state.settings.boundary_threshold {
        state.phase = PaginationPhase::ConfirmingBoundary;
        state.previous_scroll_offset = offset;
        state.previous_visible_count = item_count;
        effects.push(PaginationEffect::RecheckBoundary);
        return effects;
    }

    if item_count == state.previous_visible_count && offset == state.previous_scroll_offset {
        state.stable_iteration_streak += 1;
    } else {
        state.stable_iteration_streak = 0;
    }
    state.previous_visible_count = item_count;
    state.previous_scroll_offset = offset;

    if state.stable_iteration_streak >= state.settings.stable_ticks {
        engine_info!("Item count stable at {}", item_count);
        effects.push(converge(state, TerminalReason::Stable, item_count));
    } else {
        effects.push(PaginationEffect::ScrollTo {
            offset: scroll_target(state, offset),
        });
    }
    effects
}

fn scroll_target(state: &PaginationState, offset: f64) -> f64 {
    (offset - state.settings.scroll_step).max(0.0)
}

fn converge(
    state: &mut PaginationState,
    reason: TerminalReason,
    item_count: usize,
) -> PaginationEffect {
    state.phase = PaginationPhase::Converged;
    state.terminal_reason = Some(reason);
    PaginationEffect::Converged(PaginationOutcome {
        reason,
        iterations: state.iteration_count,
        item_count,
    })
}
