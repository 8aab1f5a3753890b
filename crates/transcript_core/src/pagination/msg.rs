#[derive(Debug, Clone, PartialEq)]
pub enum PaginationMsg {
    /// The scrollable region was found; initial offset and loaded item count.
    ContainerLocated { offset: f64, item_count: usize },
    /// No scrollable region exists.
    ContainerMissing,
    /// Viewport re-read after a settle delay.
    Tick { offset: f64, item_count: usize },
    /// Item count re-read after the extra wait at the boundary.
    BoundaryRechecked { item_count: usize },
    /// Caller asked to stop; observed at the next tick boundary.
    CancelRequested,
}
