//! UI event types.
//!
//! All external inputs (terminal, clock, async results) are converted to
//! `UiEvent` before being processed by the reducer. Async work sends its
//! result straight to the runtime's inbox.

use std::time::Duration;

use crossterm::event::Event as CrosstermEvent;
use lattice_core::intercept::{InterceptReport, InterceptStatus};

#[derive(Debug)]
pub enum UiEvent {
    /// Start of a loop iteration: terminal size and page clock.
    Frame {
        width: u16,
        height: u16,
        now: Duration,
    },
    /// Render cadence.
    Tick,
    Terminal(CrosstermEvent),
    /// The intercept demo request finished.
    InterceptFinished(Result<InterceptReport, InterceptStatus>),
}
