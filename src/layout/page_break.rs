//! # Page Break Decisions
//!
//! A letter is a single column of fixed-pitch lines, so the only question
//! is whether the next line still fits above the bottom margin.

/// Slack, in millimetres, allowed past the bottom margin before a line is
/// pushed to the next page. Accumulated line advances drift in floating
/// point; without slack a page filled exactly to its margin could spill a
/// blank trailing page.
pub const PAGE_BREAK_EPSILON: f64 = 1.0;

/// What to do with the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// The line fits on the current page.
    Place,
    /// Start a new page before placing the line.
    NewPage,
}

/// Decide whether a line advancing from `y` by `line_height` still fits
/// above `content_bottom`.
pub fn decide_break(y: f64, line_height: f64, content_bottom: f64) -> BreakDecision {
    if y + line_height > content_bottom + PAGE_BREAK_EPSILON {
        BreakDecision::NewPage
    } else {
        BreakDecision::Place
    }
}
