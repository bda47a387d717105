//! Deterministic virtual-time host.
//!
//! Drives a `PageHost` without a terminal or real clock. Time only moves
//! when the caller advances it, so runs are reproducible; used by
//! `lattice simulate` and by tests.

use std::time::Duration;

use crate::display::DisplaySurface;
use crate::engine::PageEngine;
use crate::page::PAGE_WIDTH;
use crate::scheduler::{EffectSink, PageHost};
use crate::visibility::Rect;

pub struct HeadlessRuntime {
    host: PageHost,
    now: Duration,
    viewport: Rect,
}

impl HeadlessRuntime {
    /// Creates a runtime whose viewport starts at the top of the page.
    ///
    /// Nothing is evaluated until the first `scroll_to` or `start`.
    pub fn new(engine: PageEngine, frame_interval: Duration, viewport_height: f64) -> Self {
        Self {
            host: PageHost::new(engine, frame_interval),
            now: Duration::ZERO,
            viewport: Rect::new(0.0, 0.0, PAGE_WIDTH, viewport_height.max(0.0)),
        }
    }

    pub fn set_effect_sink(&mut self, sink: EffectSink) {
        self.host.set_effect_sink(sink);
    }

    /// Delivers the initial visibility evaluation (page load).
    pub fn start(&mut self) {
        self.host.viewport_changed(self.viewport, self.now);
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn host(&self) -> &PageHost {
        &self.host
    }

    pub fn engine(&self) -> &PageEngine {
        self.host.engine()
    }

    pub fn display(&self) -> &DisplaySurface {
        self.host.display()
    }

    /// Moves the viewport top to `top` (clamped to the page) at the current
    /// time and re-evaluates visibility.
    pub fn scroll_to(&mut self, top: f64) {
        let max = self
            .host
            .engine()
            .layout()
            .max_scroll(self.viewport.height);
        self.viewport.y = top.clamp(0.0, max);
        self.host.viewport_changed(self.viewport, self.now);
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.viewport.y + delta);
    }

    /// Fires every timer due up to `target`, then sets the clock to it.
    /// Moving backwards is a no-op.
    pub fn advance_to(&mut self, target: Duration) {
        if target < self.now {
            return;
        }
        self.host.run_due(target);
        self.now = target;
    }

    pub fn advance_by(&mut self, delta: Duration) {
        self.advance_to(self.now + delta);
    }

    /// Scrolls down the page in `step` increments every `interval`, until
    /// the bottom is reached or `until` elapses, then runs to `until`.
    pub fn scroll_through(&mut self, step: f64, interval: Duration, until: Duration) {
        let max = self
            .host
            .engine()
            .layout()
            .max_scroll(self.viewport.height);
        while self.viewport.y < max && self.now + interval <= until {
            self.advance_by(interval);
            self.scroll_by(step.max(1.0));
        }
        self.advance_to(until);
    }
}
