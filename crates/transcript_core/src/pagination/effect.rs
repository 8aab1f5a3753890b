use super::TerminalReason;

#[derive(Debug, Clone, PartialEq)]
pub enum PaginationEffect {
    /// Report one tick to the caller.
    ReportProgress {
        iteration: u32,
        offset: f64,
        item_count: usize,
    },
    /// Write the new scroll offset, then wait for the settle delay.
    ScrollTo { offset: f64 },
    /// Wait twice the settle delay and re-count loaded items.
    RecheckBoundary,
    /// Terminal: loading is over, successfully or not.
    Converged(PaginationOutcome),
    /// Fatal: there is nothing to scroll.
    ContainerNotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOutcome {
    pub reason: TerminalReason,
    pub iterations: u32,
    pub item_count: usize,
}

impl PaginationOutcome {
    /// Everything except cancellation counts as a usable load.
    pub fn is_success(&self) -> bool {
        self.reason != TerminalReason::Cancelled
    }
}
