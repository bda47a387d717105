//! Timer queue and effect execution shared by all hosts.
//!
//! `PageHost` is the runtime boundary around a `PageEngine`: it executes
//! scheduling effects by queueing wakeups and applies display effects to
//! the `DisplaySurface`. Hosts only differ in where `now` comes from (a
//! virtual clock in `HeadlessRuntime`, `Instant` in the TUI).

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::bars::ScheduledBar;
use crate::display::DisplaySurface;
use crate::engine::{PageEffect, PageEngine, PageEvent};
use crate::visibility::Rect;

struct Timer<T> {
    due: Duration,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Timer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Timer<T> {}

impl<T> PartialOrd for Timer<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Timer<T> {
    // Reversed: BinaryHeap is a max-heap and we want the earliest first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Due-time ordered queue. Items with equal due times pop in push order.
pub struct TimerQueue<T> {
    heap: BinaryHeap<Timer<T>>,
    seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, due: Duration, item: T) {
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Timer { due, seq, item });
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.heap.peek().map(|t| t.due)
    }

    /// Pops the earliest item if it is due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, T)> {
        if self.next_due()? > now {
            return None;
        }
        self.heap.pop().map(|t| (t.due, t.item))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// What a queued timer delivers when it fires.
#[derive(Debug, Clone, PartialEq)]
pub enum Wakeup {
    Frame,
    Bar(ScheduledBar),
    LiveTick { period: Duration },
}

/// Effect observer used for tracing runs.
pub type EffectSink = Box<dyn FnMut(Duration, &PageEffect)>;

/// Engine plus the timers and display it drives.
pub struct PageHost {
    engine: PageEngine,
    display: DisplaySurface,
    timers: TimerQueue<Wakeup>,
    frame_interval: Duration,
    sink: Option<EffectSink>,
}

impl PageHost {
    pub fn new(engine: PageEngine, frame_interval: Duration) -> Self {
        Self {
            engine,
            display: DisplaySurface::new(),
            timers: TimerQueue::new(),
            frame_interval: frame_interval.max(Duration::from_millis(1)),
            sink: None,
        }
    }

    /// Calls `sink` with every effect the engine emits.
    pub fn set_effect_sink(&mut self, sink: EffectSink) {
        self.sink = Some(sink);
    }

    pub fn engine(&self) -> &PageEngine {
        &self.engine
    }

    pub fn display(&self) -> &DisplaySurface {
        &self.display
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Earliest pending wakeup, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Delivers a viewport change. Returns `true` if the display changed.
    pub fn viewport_changed(&mut self, viewport: Rect, now: Duration) -> bool {
        self.dispatch(PageEvent::ViewportChanged { viewport, now }, now)
    }

    /// Fires every timer due at or before `now`, in due order, each at its
    /// own due time. Returns `true` if the display changed.
    pub fn run_due(&mut self, now: Duration) -> bool {
        let mut changed = false;
        while let Some((due, wakeup)) = self.timers.pop_due(now) {
            changed |= self.fire(due, wakeup);
        }
        changed
    }

    fn fire(&mut self, due: Duration, wakeup: Wakeup) -> bool {
        match wakeup {
            Wakeup::Frame => self.dispatch(PageEvent::Frame { now: due }, due),
            Wakeup::Bar(bar) => self.dispatch(PageEvent::BarDue { bar }, due),
            Wakeup::LiveTick { period } => {
                // The interval is never cancelled; re-arm before dispatching.
                self.timers.push(due + period, Wakeup::LiveTick { period });
                self.dispatch(PageEvent::LiveTick { now: due }, due)
            }
        }
    }

    fn dispatch(&mut self, event: PageEvent, now: Duration) -> bool {
        let effects = self.engine.update(event);
        let mut changed = false;
        for effect in effects {
            if let Some(sink) = self.sink.as_mut() {
                sink(now, &effect);
            }
            changed |= self.execute(effect, now);
        }
        changed
    }

    fn execute(&mut self, effect: PageEffect, now: Duration) -> bool {
        match effect {
            PageEffect::RequestFrame => {
                self.timers.push(self.next_frame_after(now), Wakeup::Frame);
                false
            }
            PageEffect::ScheduleBar { bar } => {
                self.timers.push(now + bar.delay, Wakeup::Bar(bar));
                false
            }
            PageEffect::StartInterval { period } => {
                let period = period.max(Duration::from_millis(1));
                self.timers.push(now + period, Wakeup::LiveTick { period });
                false
            }
            display => self.display.apply(&display, now),
        }
    }

    /// Next display refresh boundary strictly after `now`.
    fn next_frame_after(&self, now: Duration) -> Duration {
        let interval = self.frame_interval.as_nanos();
        let next = (now.as_nanos() / interval + 1) * interval;
        Duration::from_nanos(next as u64)
    }
}
