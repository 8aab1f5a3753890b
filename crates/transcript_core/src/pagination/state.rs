use std::time::Duration;

use serde::Deserialize;

/// Tunables for the history loader.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    /// Pixels scrolled towards the top per tick.
    pub scroll_step: f64,
    /// Wait between a scroll and the next observation.
    pub settle_delay_ms: u64,
    /// Offsets at or below this count as the top of the history.
    pub boundary_threshold: f64,
    /// Hard ceiling on ticks; reaching it is a soft success.
    pub max_iterations: u32,
    /// Consecutive unchanged ticks that mean nothing more will load.
    pub stable_ticks: u32,
    /// How far up the ancestry to look for the scrollable region.
    pub max_ancestor_depth: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            scroll_step: 500.0,
            settle_delay_ms: 800,
            boundary_threshold: 50.0,
            max_iterations: 200,
            stable_ticks: 3,
            max_ancestor_depth: 15,
        }
    }
}

impl PaginationSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// The longer wait used to confirm the boundary.
    pub fn boundary_recheck_delay(&self) -> Duration {
        self.settle_delay() * 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalReason {
    ReachedBoundary,
    Stable,
    MaxIterationsExceeded,
    Cancelled,
}

impl TerminalReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TerminalReason::ReachedBoundary => "reached_boundary",
            TerminalReason::Stable => "stable",
            TerminalReason::MaxIterationsExceeded => "max_iterations",
            TerminalReason::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationPhase {
    Locating,
    Scrolling,
    ConfirmingBoundary,
    Converged,
    Failed,
}

/// State of one full-history load. Never shared between loads.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    pub(super) settings: PaginationSettings,
    pub(super) phase: PaginationPhase,
    pub(super) iteration_count: u32,
    pub(super) previous_visible_count: usize,
    pub(super) stable_iteration_streak: u32,
    pub(super) previous_scroll_offset: f64,
    pub(super) terminal_reason: Option<TerminalReason>,
}

impl PaginationState {
    pub fn new(settings: PaginationSettings) -> Self {
        Self {
            settings,
            phase: PaginationPhase::Locating,
            iteration_count: 0,
            previous_visible_count: 0,
            stable_iteration_streak: 0,
            previous_scroll_offset: 0.0,
            terminal_reason: None,
        }
    }

    pub fn settings(&self) -> &PaginationSettings {
        &self.settings
    }

    pub fn phase(&self) -> PaginationPhase {
        self.phase
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    pub fn previous_visible_count(&self) -> usize {
        self.previous_visible_count
    }

    pub fn stable_iteration_streak(&self) -> u32 {
        self.stable_iteration_streak
    }

    pub fn previous_scroll_offset(&self) -> f64 {
        self.previous_scroll_offset
    }

    pub fn terminal_reason(&self) -> Option<TerminalReason> {
        self.terminal_reason
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.phase,
            PaginationPhase::Converged | PaginationPhase::Failed
        )
    }
}
