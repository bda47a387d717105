//! Display surface written by engine effects.
//!
//! Hosts apply display effects here and renderers read from it. The
//! engine never reads it back.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::engine::{PageEffect, TextTarget};
use crate::visibility::ElementId;

/// A bar's target width and when it was assigned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarState {
    pub width_percent: f64,
    pub set_at: Duration,
}

#[derive(Debug, Default, Clone)]
pub struct DisplaySurface {
    texts: BTreeMap<TextTarget, String>,
    classes: BTreeSet<(ElementId, &'static str)>,
    bars: BTreeMap<(ElementId, usize), BarState>,
}

impl DisplaySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a display effect at `now`. Returns `true` if anything
    /// changed; scheduling effects are ignored.
    pub fn apply(&mut self, effect: &PageEffect, now: Duration) -> bool {
        match effect {
            PageEffect::AddClass { element, class } => self.classes.insert((*element, *class)),
            PageEffect::SetText { target, text } => {
                if self.texts.get(target) == Some(text) {
                    return false;
                }
                self.texts.insert(*target, text.clone());
                true
            }
            PageEffect::SetBarWidth {
                group,
                index,
                width_percent,
            } => {
                self.bars.insert(
                    (*group, *index),
                    BarState {
                        width_percent: *width_percent,
                        set_at: now,
                    },
                );
                true
            }
            PageEffect::ScheduleBar { .. }
            | PageEffect::RequestFrame
            | PageEffect::StartInterval { .. } => false,
        }
    }

    pub fn text(&self, target: TextTarget) -> Option<&str> {
        self.texts.get(&target).map(String::as_str)
    }

    pub fn slot(&self, name: &'static str) -> Option<&str> {
        self.text(TextTarget::Slot(name))
    }

    pub fn element_text(&self, element: ElementId) -> Option<&str> {
        self.text(TextTarget::Element(element))
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.classes
            .iter()
            .any(|(id, c)| *id == element && *c == class)
    }

    pub fn bar(&self, group: ElementId, index: usize) -> Option<BarState> {
        self.bars.get(&(group, index)).copied()
    }

    /// Every assigned bar as `(group, index, state)`.
    pub fn bars(&self) -> impl Iterator<Item = (ElementId, usize, BarState)> {
        self.bars.iter().map(|((group, index), bar)| (*group, *index, *bar))
    }
}
