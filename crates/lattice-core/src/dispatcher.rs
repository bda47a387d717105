//! One-shot effect dispatch on first visibility.

use tracing::debug;

use crate::animator::CounterTarget;
use crate::bars::BarSpec;
use crate::visibility::{ElementId, VisibilityEntry};

/// What an element does the first time it becomes visible.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetKind {
    /// Gains the "visible" state flag.
    Reveal,
    /// Counts up to its target.
    Counter(CounterTarget),
    /// Reveals its bars in a staggered sequence.
    BarGroup(Vec<BarSpec>),
}

impl TargetKind {
    pub fn name(&self) -> &'static str {
        match self {
            TargetKind::Reveal => "reveal",
            TargetKind::Counter(_) => "counter",
            TargetKind::BarGroup(_) => "bar_group",
        }
    }
}

/// A tracked element and its at-most-once guard.
#[derive(Debug, Clone)]
pub struct AnimatableTarget {
    pub id: ElementId,
    pub kind: TargetKind,
    triggered: bool,
}

impl AnimatableTarget {
    pub fn new(id: ElementId, kind: TargetKind) -> Self {
        Self {
            id,
            kind,
            triggered: false,
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }
}

/// Effect produced by a target's first visibility.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Reveal { element: ElementId },
    Counter {
        element: ElementId,
        target: CounterTarget,
    },
    BarGroup {
        element: ElementId,
        bars: Vec<BarSpec>,
    },
}

/// Fans visibility entries out to registered targets.
#[derive(Debug, Default)]
pub struct TriggerDispatcher {
    targets: Vec<AnimatableTarget>,
}

impl TriggerDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a target. Re-registering an id replaces its kind but keeps
    /// its triggered state.
    pub fn register(&mut self, id: ElementId, kind: TargetKind) {
        if let Some(existing) = self.targets.iter_mut().find(|t| t.id == id) {
            existing.kind = kind;
            return;
        }
        self.targets.push(AnimatableTarget::new(id, kind));
    }

    pub fn targets(&self) -> &[AnimatableTarget] {
        &self.targets
    }

    pub fn target(&self, id: ElementId) -> Option<&AnimatableTarget> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Returns one trigger per entry whose target is intersecting for the
    /// first time, in entry order.
    pub fn dispatch(&mut self, entries: &[VisibilityEntry]) -> Vec<Trigger> {
        let mut triggers = Vec::new();
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            let Some(target) = self.targets.iter_mut().find(|t| t.id == entry.target) else {
                continue;
            };
            if target.triggered {
                continue;
            }
            target.triggered = true;
            debug!(
                element = %target.id,
                kind = target.kind.name(),
                ratio = entry.ratio,
                "target triggered"
            );
            triggers.push(match &target.kind {
                TargetKind::Reveal => Trigger::Reveal { element: target.id },
                TargetKind::Counter(counter) => Trigger::Counter {
                    element: target.id,
                    target: *counter,
                },
                TargetKind::BarGroup(bars) => Trigger::BarGroup {
                    element: target.id,
                    bars: bars.clone(),
                },
            });
        }
        triggers
    }
}
