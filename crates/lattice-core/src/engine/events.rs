//! Engine event types.
//!
//! Everything the engine reacts to arrives as a `PageEvent` carrying the
//! host's notion of the current time (elapsed since page load).

use std::time::Duration;

use crate::bars::ScheduledBar;
use crate::visibility::Rect;

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The viewport moved or resized; visibility is re-evaluated.
    ViewportChanged { viewport: Rect, now: Duration },
    /// A display refresh requested via `PageEffect::RequestFrame`.
    Frame { now: Duration },
    /// A bar's stagger delay elapsed.
    BarDue { bar: ScheduledBar },
    /// One period of the live metrics interval.
    LiveTick { now: Duration },
}
