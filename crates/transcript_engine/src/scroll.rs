use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use tokio_util::sync::CancellationToken;
use transcript_core::{
    advance, PaginationEffect, PaginationMsg, PaginationOutcome, PaginationSettings,
    PaginationState, TerminalReason,
};

use crate::document::{DocumentError, DocumentProvider, NodeRole};
use crate::progress::ProgressSink;
use crate::types::{ExportError, ExportEvent};

/// Drives a conversation view back through its history until nothing more loads.
///
/// Decisions are made by [`advance`]; this type only performs the effects it asks for:
/// writing the scroll offset, waiting, and re-reading the view.
pub struct PaginationController<'a, P: DocumentProvider> {
    doc: &'a P,
    settings: &'a PaginationSettings,
}

impl<'a, P: DocumentProvider> PaginationController<'a, P> {
    pub fn new(doc: &'a P, settings: &'a PaginationSettings) -> Self {
        Self { doc, settings }
    }

    /// The dedicated viewport if there is one, otherwise the nearest scrollable ancestor
    /// of the first loaded item within `max_ancestor_depth` levels.
    pub fn locate_container(&self) -> Result<Option<P::Node>, DocumentError> {
        if let Some(viewport) = self.doc.query_first(None, NodeRole::ScrollViewport)? {
            engine_info!("Using the dedicated scroll viewport");
            return Ok(Some(viewport));
        }

        let Some(first_item) = self.doc.query_first(None, NodeRole::ConversationItem)? else {
            engine_warn!("No conversation items to locate a scroll container from");
            return Ok(None);
        };

        let mut candidate = self.doc.parent(&first_item);
        let mut depth = 0;
        while let Some(node) = candidate {
            if depth >= self.settings.max_ancestor_depth {
                break;
            }
            if self.doc.scroll_metrics(&node).can_scroll() {
                engine_info!("Scroll container found at depth {}", depth);
                return Ok(Some(node));
            }
            candidate = self.doc.parent(&node);
            depth += 1;
        }

        engine_warn!("No scrollable container within {} levels", depth);
        Ok(None)
    }

    /// Scrolls towards the start of the conversation until the boundary is confirmed, the
    /// view stops changing, or the iteration ceiling is hit.
    ///
    /// `cancel` is checked after each settle delay; a cancelled load reports how many items
    /// were loaded at that point.
    pub async fn load_full_history(
        &self,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<PaginationOutcome, ExportError> {
        sink.emit(ExportEvent::Locating);
        let container = self.locate_container()?;

        let mut state = PaginationState::new(self.settings.clone());
        let mut msg = match &container {
            Some(node) => {
                let item_count = self.doc.item_count()?;
                sink.emit(ExportEvent::Counting { item_count });
                PaginationMsg::ContainerLocated {
                    offset: self.doc.scroll_offset(node)?,
                    item_count,
                }
            }
            None => PaginationMsg::ContainerMissing,
        };

        loop {
            let (next_state, effects) = advance(state, msg);
            state = next_state;

            let mut next_msg = None;
            for effect in effects {
                match effect {
                    PaginationEffect::ReportProgress {
                        iteration,
                        offset,
                        item_count,
                    } => sink.emit(ExportEvent::Scrolling {
                        iteration,
                        offset,
                        item_count,
                    }),
                    PaginationEffect::ScrollTo { offset } => {
                        let Some(node) = &container else {
                            return Err(ExportError::ContainerNotFound);
                        };
                        self.doc.set_scroll_offset(node, offset)?;
                        settle(self.settings.settle_delay()).await;
                        next_msg = Some(if cancel.is_cancelled() {
                            PaginationMsg::CancelRequested
                        } else {
                            PaginationMsg::Tick {
                                offset: self.doc.scroll_offset(node)?,
                                item_count: self.doc.item_count()?,
                            }
                        });
                    }
                    PaginationEffect::RecheckBoundary => {
                        settle(self.settings.boundary_recheck_delay()).await;
                        next_msg = Some(PaginationMsg::BoundaryRechecked {
                            item_count: self.doc.item_count()?,
                        });
                    }
                    PaginationEffect::Converged(outcome) => {
                        engine_info!(
                            "History load finished: {} after {} iterations ({} items)",
                            outcome.reason.as_str(),
                            outcome.iterations,
                            outcome.item_count
                        );
                        if outcome.reason == TerminalReason::Cancelled {
                            return Err(ExportError::Cancelled {
                                loaded_items: outcome.item_count,
                            });
                        }
                        return Ok(outcome);
                    }
                    PaginationEffect::ContainerNotFound => {
                        return Err(ExportError::ContainerNotFound)
                    }
                }
            }

            match next_msg {
                Some(next) => msg = next,
                None => return Err(stalled(&state)),
            }
        }
    }
}

/// A step that neither converged nor asked for more work.
fn stalled(state: &PaginationState) -> ExportError {
    engine_error!(
        "History load stopped without converging in phase {:?}",
        state.phase()
    );
    ExportError::Stalled {
        iterations: state.iteration_count(),
        loaded_items: state.previous_visible_count(),
    }
}

async fn settle(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        engine_debug!("Settling for {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}
