//! # Page Break Decisions
//!
//! The single rule that decides whether an atomic block stays on the current
//! page. Blocks are never split: either the whole block fits above the
//! bottom limit, or it moves to a fresh page.

/// Decide what to do with a block before it is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakDecision {
    /// Place the block on the current page (it fits).
    Place,
    /// Start a new page and place the block at its content start.
    MoveToNextPage,
}

/// Given the cursor, the block height and the lowest y the block may reach,
/// decide whether to break.
pub fn decide_break(cursor_y: f64, height_needed: f64, limit_y: f64) -> BreakDecision {
    if cursor_y + height_needed > limit_y {
        BreakDecision::MoveToNextPage
    } else {
        BreakDecision::Place
    }
}

/// Whether a block can ever fit between `content_top` and `limit_y`.
pub fn fits_on_empty_page(height_needed: f64, content_top: f64, limit_y: f64) -> bool {
    height_needed <= limit_y - content_top
}
