//! Page engine reducer.
//!
//! `PageEngine` owns all animation and simulation state for one page.
//! Hosts call `update(event)` and execute the returned effects; the engine
//! itself performs no I/O and owns no timers.
//!
//! ## State
//!
//! ```text
//! PageEngine
//! ├── layout: PageLayout              (placed blocks, registration input)
//! ├── reveal_observer                 (20% / -50px bottom predicate)
//! ├── dispatcher: TriggerDispatcher   (one-shot triggered flags)
//! ├── animations: Vec<CounterAnimation>
//! ├── live_observer                   (30% predicate, live container only)
//! └── live: LiveSimulator             (Idle / Armed / Running + totals)
//! ```

mod effects;
mod events;

use std::time::Duration;

pub use effects::{PageEffect, TextTarget, VISIBLE_CLASS};
pub use events::PageEvent;
use tracing::trace;

use crate::animator::{COUNTER_DURATION, CounterAnimation};
use crate::bars::{BAR_STAGGER, BarSequencer};
use crate::dispatcher::{Trigger, TriggerDispatcher};
use crate::live::{LiveParams, LiveSimulator};
use crate::page::{ElementRole, PageLayout};
use crate::visibility::{ElementId, ObserverOptions, Rect, RootMargin, VisibilityObserver};

/// Tunables for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    pub reveal: ObserverOptions,
    pub live: ObserverOptions,
    pub counter_duration: Duration,
    pub bar_stagger: Duration,
    pub live_params: LiveParams,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            reveal: ObserverOptions {
                threshold: 0.2,
                root_margin: RootMargin {
                    bottom: -50.0,
                    ..RootMargin::NONE
                },
            },
            live: ObserverOptions {
                threshold: 0.3,
                root_margin: RootMargin::NONE,
            },
            counter_duration: COUNTER_DURATION,
            bar_stagger: BAR_STAGGER,
            live_params: LiveParams::default(),
        }
    }
}

pub struct PageEngine {
    layout: PageLayout,
    options: EngineOptions,
    reveal_observer: VisibilityObserver,
    dispatcher: TriggerDispatcher,
    sequencer: BarSequencer,
    animations: Vec<CounterAnimation>,
    frame_pending: bool,
    live_observer: VisibilityObserver,
    live: LiveSimulator,
}

impl PageEngine {
    /// Registers every block of `layout`.
    ///
    /// Only the first live block drives the simulator.
    pub fn new(layout: PageLayout, options: EngineOptions) -> Self {
        let mut reveal_observer = VisibilityObserver::new(options.reveal);
        let mut dispatcher = TriggerDispatcher::new();
        let mut live_observer = VisibilityObserver::new(options.live);
        let mut live = LiveSimulator::inert(options.live_params);

        for element in &layout.elements {
            if let ElementRole::Animated(kind) = &element.role {
                dispatcher.register(element.id, kind.clone());
                reveal_observer.observe(element.id);
            }
        }
        if let Some(element) = layout.live_element()
            && let ElementRole::Live { slots } = &element.role
        {
            live = LiveSimulator::register(options.live_params, slots);
            live_observer.observe(element.id);
        }

        Self {
            layout,
            options,
            reveal_observer,
            dispatcher,
            sequencer: BarSequencer::new(options.bar_stagger),
            animations: Vec::new(),
            frame_pending: false,
            live_observer,
            live,
        }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn dispatcher(&self) -> &TriggerDispatcher {
        &self.dispatcher
    }

    pub fn live(&self) -> &LiveSimulator {
        &self.live
    }

    /// Counters still climbing.
    pub fn active_animations(&self) -> &[CounterAnimation] {
        &self.animations
    }

    /// Applies one event and returns the effects for the host to execute.
    pub fn update(&mut self, event: PageEvent) -> Vec<PageEffect> {
        match event {
            PageEvent::ViewportChanged { viewport, now } => self.handle_viewport(&viewport, now),
            PageEvent::Frame { now } => self.handle_frame(now),
            PageEvent::BarDue { bar } => vec![PageEffect::SetBarWidth {
                group: bar.group,
                index: bar.index,
                width_percent: bar.width_percent,
            }],
            PageEvent::LiveTick { now } => {
                let Some(readout) = self.live.tick() else {
                    return vec![];
                };
                trace!(now_ms = now.as_millis() as u64, ticks = self.live.state().ticks, "live tick");
                readout
                    .slots()
                    .into_iter()
                    .map(|(slot, text)| PageEffect::SetText {
                        target: TextTarget::Slot(slot),
                        text: text.to_string(),
                    })
                    .collect()
            }
        }
    }

    fn handle_viewport(&mut self, viewport: &Rect, now: Duration) -> Vec<PageEffect> {
        let layout = &self.layout;
        let entries = self
            .reveal_observer
            .evaluate(viewport, |id| layout.rect_of(id));
        let live_visible = self
            .live_observer
            .evaluate(viewport, |id| layout.rect_of(id))
            .iter()
            .any(|e| e.is_intersecting);

        let mut effects = Vec::new();
        for trigger in self.dispatcher.dispatch(&entries) {
            match trigger {
                Trigger::Reveal { element } => effects.push(PageEffect::AddClass {
                    element,
                    class: VISIBLE_CLASS,
                }),
                Trigger::Counter { element, target } => {
                    self.animations.push(CounterAnimation::new(
                        element,
                        target,
                        now,
                        self.options.counter_duration,
                    ));
                    self.request_frame(&mut effects);
                }
                Trigger::BarGroup { element, bars } => {
                    effects.extend(
                        self.sequencer
                            .schedule(element, &bars)
                            .into_iter()
                            .map(|bar| PageEffect::ScheduleBar { bar }),
                    );
                }
            }
        }

        if live_visible && self.live.on_visible() {
            effects.push(PageEffect::StartInterval {
                period: self.live.params().tick,
            });
        }

        effects
    }

    fn handle_frame(&mut self, now: Duration) -> Vec<PageEffect> {
        self.frame_pending = false;
        let mut effects = Vec::with_capacity(self.animations.len() + 1);
        self.animations.retain(|animation| {
            let frame = animation.sample(now);
            effects.push(PageEffect::SetText {
                target: TextTarget::Element(animation.element),
                text: frame.text,
            });
            !frame.done
        });
        if !self.animations.is_empty() {
            self.request_frame(&mut effects);
        }
        effects
    }

    /// Coalesces frame requests: one outstanding request per refresh.
    fn request_frame(&mut self, effects: &mut Vec<PageEffect>) {
        if !self.frame_pending {
            self.frame_pending = true;
            effects.push(PageEffect::RequestFrame);
        }
    }

    /// Whether `element` has already fired its one-shot effect.
    pub fn is_triggered(&self, element: ElementId) -> bool {
        self.dispatcher
            .target(element)
            .is_some_and(crate::dispatcher::AnimatableTarget::is_triggered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageManifest;

    const PAGE: &str = r#"
title = "Engine"

[[block]]
kind = "reveal"
height = 200
text = "intro"

[[block]]
kind = "counter"
height = 100
label = "Saved"
target = "75"

[[block]]
kind = "bar_group"
height = 200
bars = [{ label = "a", width = 100 }, { label = "b", width = 50 }, { label = "c", width = 25 }]

[[block]]
kind = "live"
height = 400
slots = ["bytesSaved", "txCompressed", "storageReclaimed"]
"#;

    fn engine() -> PageEngine {
        PageEngine::new(
            PageManifest::parse(PAGE).unwrap().layout(),
            EngineOptions::default(),
        )
    }

    fn viewport(top: f64) -> Rect {
        Rect::new(0.0, top, 1200.0, 600.0)
    }

    #[test]
    fn test_first_view_triggers_visible_elements() {
        let mut engine = engine();
        let effects = engine.update(PageEvent::ViewportChanged {
            viewport: viewport(0.0),
            now: Duration::ZERO,
        });
        // Reveal (0..200), counter (224..324) and bars (348..548) all fit in
        // the shrunk viewport (0..550). Live (572..972) shows 28px: 7%.
        assert!(effects.contains(&PageEffect::AddClass {
            element: ElementId(0),
            class: VISIBLE_CLASS
        }));
        assert!(effects.contains(&PageEffect::RequestFrame));
        let scheduled = effects
            .iter()
            .filter(|e| matches!(e, PageEffect::ScheduleBar { .. }))
            .count();
        assert_eq!(scheduled, 3);
        assert!(engine.is_triggered(ElementId(1)));
        assert!(!effects.iter().any(|e| matches!(e, PageEffect::StartInterval { .. })));
    }

    #[test]
    fn test_reentry_does_not_refire() {
        let mut engine = engine();
        let now = Duration::ZERO;
        engine.update(PageEvent::ViewportChanged { viewport: viewport(0.0), now });
        engine.update(PageEvent::ViewportChanged { viewport: viewport(2000.0), now });
        let effects = engine.update(PageEvent::ViewportChanged { viewport: viewport(0.0), now });
        assert!(effects.is_empty(), "unexpected effects: {effects:?}");
    }

    #[test]
    fn test_frames_run_counter_to_exact_target() {
        let mut engine = engine();
        engine.update(PageEvent::ViewportChanged {
            viewport: viewport(0.0),
            now: Duration::ZERO,
        });
        let mid = engine.update(PageEvent::Frame { now: Duration::from_millis(900) });
        assert_eq!(
            mid,
            vec![
                PageEffect::SetText {
                    target: TextTarget::Element(ElementId(1)),
                    text: "65".to_string(),
                },
                PageEffect::RequestFrame,
            ]
        );
        let done = engine.update(PageEvent::Frame { now: Duration::from_millis(1800) });
        assert_eq!(
            done,
            vec![PageEffect::SetText {
                target: TextTarget::Element(ElementId(1)),
                text: "75".to_string(),
            }]
        );
        assert!(engine.active_animations().is_empty());
    }

    #[test]
    fn test_live_starts_once_at_threshold() {
        let mut engine = engine();
        // Live block spans 572..972. Viewport 144..744 shows 172/400 = 43%.
        let start = engine.update(PageEvent::ViewportChanged {
            viewport: viewport(144.0),
            now: Duration::ZERO,
        });
        assert!(start.contains(&PageEffect::StartInterval {
            period: Duration::from_millis(50)
        }));

        let tick = engine.update(PageEvent::LiveTick { now: Duration::from_millis(50) });
        assert_eq!(tick.len(), 3);

        engine.update(PageEvent::ViewportChanged {
            viewport: viewport(5000.0),
            now: Duration::from_millis(60),
        });
        let again = engine.update(PageEvent::ViewportChanged {
            viewport: viewport(500.0),
            now: Duration::from_millis(70),
        });
        assert!(!again.iter().any(|e| matches!(e, PageEffect::StartInterval { .. })));
        assert_eq!(engine.live().state().ticks, 1);
    }

    #[test]
    fn test_live_below_threshold_waits() {
        let mut engine = engine();
        // Viewport 52..652 shows 80px of the live block: 20%.
        let effects = engine.update(PageEvent::ViewportChanged {
            viewport: viewport(52.0),
            now: Duration::ZERO,
        });
        assert!(!effects.iter().any(|e| matches!(e, PageEffect::StartInterval { .. })));
        assert!(engine.update(PageEvent::LiveTick { now: Duration::ZERO }).is_empty());
    }

    #[test]
    fn test_bar_due_sets_width() {
        let mut engine = engine();
        let effects = engine.update(PageEvent::ViewportChanged {
            viewport: viewport(0.0),
            now: Duration::ZERO,
        });
        let bars: Vec<_> = effects
            .into_iter()
            .filter_map(|e| match e {
                PageEffect::ScheduleBar { bar } => Some(bar),
                _ => None,
            })
            .collect();
        let last = bars.last().unwrap().clone();
        assert_eq!(last.delay, Duration::from_millis(400));
        assert_eq!(
            engine.update(PageEvent::BarDue { bar: last }),
            vec![PageEffect::SetBarWidth {
                group: ElementId(2),
                index: 2,
                width_percent: 25.0
            }]
        );
    }

    #[test]
    fn test_second_live_block_is_ignored() {
        let page = format!(
            "{PAGE}\n[[block]]\nkind = \"live\"\nheight = 400\nslots = []\n"
        );
        let engine = PageEngine::new(
            PageManifest::parse(&page).unwrap().layout(),
            EngineOptions::default(),
        );
        assert_eq!(engine.live().phase(), crate::live::LivePhase::Armed);
    }
}
