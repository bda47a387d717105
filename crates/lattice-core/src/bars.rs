//! Staggered reveal of bar groups.
//!
//! The sequencer only decides *when* each bar receives its target width.
//! How the width animates is left to the renderer's declarative transition.

use std::time::Duration;

use crate::visibility::ElementId;

/// Default offset between consecutive bars of a group.
pub const BAR_STAGGER: Duration = Duration::from_millis(200);

/// One bar of a group, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    pub index: usize,
    pub width_percent: f64,
}

/// A bar width change waiting for its delay to elapse.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledBar {
    pub group: ElementId,
    pub index: usize,
    pub width_percent: f64,
    /// Offset from the group's trigger moment.
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct BarSequencer {
    stagger: Duration,
}

impl Default for BarSequencer {
    fn default() -> Self {
        Self::new(BAR_STAGGER)
    }
}

impl BarSequencer {
    pub fn new(stagger: Duration) -> Self {
        Self { stagger }
    }

    /// Assigns each bar a delay of `position * stagger`.
    ///
    /// Position is the bar's place in `bars`, which is registration order.
    pub fn schedule(&self, group: ElementId, bars: &[BarSpec]) -> Vec<ScheduledBar> {
        bars.iter()
            .enumerate()
            .map(|(position, bar)| ScheduledBar {
                group,
                index: bar.index,
                width_percent: bar.width_percent,
                delay: self.stagger.saturating_mul(position as u32),
            })
            .collect()
    }
}
