//! Eased counter animation.
//!
//! A counter climbs from 0 to its target over a fixed window, sampled once
//! per display refresh. The host owns the refresh clock; this module only
//! maps elapsed time to display text.

use std::time::Duration;

use crate::format::to_fixed;
use crate::visibility::ElementId;

/// Default length of a counter animation.
pub const COUNTER_DURATION: Duration = Duration::from_millis(1800);

/// Cubic ease-out: fast start, gentle landing. Monotonic on `[0, 1]`.
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Target value of a counter and the precision it is displayed with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterTarget {
    pub value: f64,
    /// Digits after the decimal point; zero for whole-number targets.
    pub decimals: usize,
}

impl CounterTarget {
    /// Parses a target literal from page markup.
    ///
    /// Precision comes from the canonical form of the parsed number, so
    /// `"99.90"` displays with one decimal. Non-finite or unparseable
    /// literals yield `None`.
    pub fn parse(literal: &str) -> Option<Self> {
        let value: f64 = literal.trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(Self::new(value))
    }

    pub fn new(value: f64) -> Self {
        let canonical = value.to_string();
        let decimals = canonical
            .split_once('.')
            .map_or(0, |(_, fraction)| fraction.len());
        Self { value, decimals }
    }

    pub fn is_whole(&self) -> bool {
        self.decimals == 0
    }

    /// Renders an intermediate value at this target's precision.
    ///
    /// Whole-number targets show the floor of `current`.
    pub fn render(&self, current: f64) -> String {
        if self.is_whole() {
            let floored = current.floor();
            // Avoid "-0" for tiny negative products.
            let floored = if floored == 0.0 { 0.0 } else { floored };
            format!("{floored}")
        } else {
            to_fixed(current, self.decimals)
        }
    }

    /// Renders the exact target, used for the terminal sample.
    pub fn render_final(&self) -> String {
        self.render(self.value)
    }
}

/// One sample of a running counter.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterFrame {
    pub text: String,
    pub done: bool,
}

/// An in-flight counter animation. Runs to completion once started.
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    pub element: ElementId,
    pub target: CounterTarget,
    pub started_at: Duration,
    pub duration: Duration,
}

impl CounterAnimation {
    pub fn new(
        element: ElementId,
        target: CounterTarget,
        started_at: Duration,
        duration: Duration,
    ) -> Self {
        Self {
            element,
            target,
            started_at,
            duration,
        }
    }

    /// Linear progress in `[0, 1]` at `now`.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Samples the display text at `now`.
    pub fn sample(&self, now: Duration) -> CounterFrame {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return CounterFrame {
                text: self.target.render_final(),
                done: true,
            };
        }
        let current = self.target.value * ease_out_cubic(progress);
        CounterFrame {
            text: self.target.render(current),
            done: false,
        }
    }
}
