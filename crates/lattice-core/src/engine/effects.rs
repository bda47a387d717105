//! Engine effect types.
//!
//! Effects are commands returned by the reducer that the host executes.
//! Display effects write to the display surface; scheduling effects ask
//! the host to deliver a later event. The engine never reads the display
//! and never owns a timer.

use std::fmt;
use std::time::Duration;

use crate::bars::ScheduledBar;
use crate::visibility::ElementId;

/// State flag added to revealed elements.
pub const VISIBLE_CLASS: &str = "visible";

/// Where a `SetText` effect writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextTarget {
    /// The text content of a page element (counters).
    Element(ElementId),
    /// A named output slot (live metrics).
    Slot(&'static str),
}

impl fmt::Display for TextTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextTarget::Element(id) => write!(f, "{id}"),
            TextTarget::Slot(name) => write!(f, "slot:{name}"),
        }
    }
}

/// Effects returned by `PageEngine::update` for the host to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEffect {
    /// Add a state flag to an element. Idempotent.
    AddClass {
        element: ElementId,
        class: &'static str,
    },

    /// Replace the text of an element or slot.
    SetText { target: TextTarget, text: String },

    /// Give a bar its target width. The renderer animates the change.
    SetBarWidth {
        group: ElementId,
        index: usize,
        width_percent: f64,
    },

    /// Deliver `PageEvent::BarDue` after `bar.delay`.
    ScheduleBar { bar: ScheduledBar },

    /// Deliver one `PageEvent::Frame` at the next display refresh.
    RequestFrame,

    /// Deliver `PageEvent::LiveTick` every `period`, forever.
    StartInterval { period: Duration },
}

impl fmt::Display for PageEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageEffect::AddClass { element, class } => write!(f, "add-class {element} {class}"),
            PageEffect::SetText { target, text } => write!(f, "set-text {target} {text:?}"),
            PageEffect::SetBarWidth {
                group,
                index,
                width_percent,
            } => write!(f, "set-bar-width {group}[{index}] {width_percent}%"),
            PageEffect::ScheduleBar { bar } => write!(
                f,
                "schedule-bar {}[{}] +{}ms",
                bar.group,
                bar.index,
                bar.delay.as_millis()
            ),
            PageEffect::RequestFrame => write!(f, "request-frame"),
            PageEffect::StartInterval { period } => {
                write!(f, "start-interval {}ms", period.as_millis())
            }
        }
    }
}
