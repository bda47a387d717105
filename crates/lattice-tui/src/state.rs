//! Application state.
//!
//! ```text
//! AppState
//! ├── page: PageHost          (engine, timers, display surface)
//! ├── now                     (page clock, set once per loop iteration)
//! ├── scroll: ScrollState     (offset and viewport size in CSS px)
//! ├── intercept: InterceptState
//! └── bar_transition          (width transition drawn for bars)
//! ```
//!
//! Terminal rows map to CSS pixels through `row_px`; the engine only ever
//! sees pixel geometry.

use std::time::Duration;

use lattice_core::Config;
use lattice_core::animator::ease_out_cubic;
use lattice_core::display::BarState;
use lattice_core::engine::PageEngine;
use lattice_core::intercept::{InterceptReport, InterceptStatus};
use lattice_core::page::{PAGE_WIDTH, PageLayout};
use lattice_core::scheduler::PageHost;
use lattice_core::visibility::Rect;

/// Rows taken by the header, intercept line and status line.
pub const CHROME_ROWS: u16 = 3;

#[derive(Debug, Clone, Copy)]
pub struct ScrollState {
    /// Viewport top in CSS px.
    pub offset_px: f64,
    /// Terminal rows available to the page.
    pub viewport_rows: u16,
    pub row_px: f64,
}

impl ScrollState {
    pub fn viewport_px(&self) -> f64 {
        f64::from(self.viewport_rows) * self.row_px
    }

    /// First page row shown.
    pub fn offset_rows(&self) -> usize {
        px_to_rows(self.offset_px, self.row_px)
    }
}

/// Converts a pixel position to the nearest terminal row.
pub fn px_to_rows(px: f64, row_px: f64) -> usize {
    (px / row_px).round().max(0.0) as usize
}

#[derive(Debug, Default)]
pub struct InterceptState {
    pub payload_hex: String,
    pub status: Option<InterceptStatus>,
    pub report: Option<InterceptReport>,
}

impl InterceptState {
    pub fn in_flight(&self) -> bool {
        self.status == Some(InterceptStatus::Sending)
    }
}

pub struct AppState {
    pub page: PageHost,
    pub now: Duration,
    pub scroll: ScrollState,
    pub intercept: InterceptState,
    pub bar_transition: Duration,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: &Config, layout: PageLayout) -> Self {
        let engine = PageEngine::new(layout, config.engine_options());
        let row_px = if config.display.row_px.is_finite() {
            config.display.row_px.max(1.0)
        } else {
            16.0
        };
        Self {
            page: PageHost::new(engine, config.frame_interval()),
            now: Duration::ZERO,
            scroll: ScrollState {
                offset_px: 0.0,
                viewport_rows: 0,
                row_px,
            },
            intercept: InterceptState {
                payload_hex: config.intercept.payload_hex.clone(),
                ..InterceptState::default()
            },
            bar_transition: Duration::from_millis(config.bars.transition_ms),
            should_quit: false,
        }
    }

    pub fn layout(&self) -> &PageLayout {
        self.page.engine().layout()
    }

    pub fn viewport(&self) -> Rect {
        Rect::new(
            0.0,
            self.scroll.offset_px,
            PAGE_WIDTH,
            self.scroll.viewport_px(),
        )
    }

    pub fn max_scroll(&self) -> f64 {
        self.layout().max_scroll(self.scroll.viewport_px())
    }

    /// Moves the viewport (clamped to the page) and re-evaluates visibility.
    pub fn scroll_to(&mut self, offset_px: f64) {
        self.scroll.offset_px = offset_px.clamp(0.0, self.max_scroll());
        let viewport = self.viewport();
        self.page.viewport_changed(viewport, self.now);
    }

    pub fn scroll_by(&mut self, delta_px: f64) {
        self.scroll_to(self.scroll.offset_px + delta_px);
    }

    /// Applies a new terminal height. The first call delivers the initial
    /// visibility evaluation.
    pub fn resize(&mut self, terminal_rows: u16) {
        let rows = terminal_rows.saturating_sub(CHROME_ROWS);
        if rows == self.scroll.viewport_rows {
            return;
        }
        self.scroll.viewport_rows = rows;
        self.scroll_to(self.scroll.offset_px);
    }

    /// Width of a bar as currently drawn.
    pub fn bar_width(&self, bar: BarState) -> f64 {
        displayed_width(bar, self.now, self.bar_transition)
    }

    fn bars_in_transition(&self) -> bool {
        self.page
            .display()
            .bars()
            .any(|(_, _, bar)| self.now < bar.set_at + self.bar_transition)
    }

    /// Whether anything on screen is still moving.
    pub fn is_animating(&self) -> bool {
        !self.page.engine().active_animations().is_empty()
            || self.page.pending_timers() > 0
            || self.intercept.in_flight()
            || self.bars_in_transition()
    }
}

/// Bar width `transition` after it was assigned, growing from zero with a
/// cubic ease-out.
pub fn displayed_width(bar: BarState, now: Duration, transition: Duration) -> f64 {
    if transition.is_zero() {
        return bar.width_percent;
    }
    let elapsed = now.saturating_sub(bar.set_at);
    let progress = elapsed.as_secs_f64() / transition.as_secs_f64();
    bar.width_percent * ease_out_cubic(progress)
}

#[cfg(test)]
mod tests {
    use lattice_core::PageManifest;

    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_displayed_width_eases_to_target() {
        let bar = BarState {
            width_percent: 50.0,
            set_at: ms(1000),
        };
        let transition = ms(1000);
        assert_eq!(displayed_width(bar, ms(500), transition), 0.0);
        assert_eq!(displayed_width(bar, ms(1000), transition), 0.0);
        assert_eq!(displayed_width(bar, ms(1500), transition), 43.75);
        assert_eq!(displayed_width(bar, ms(2000), transition), 50.0);
        assert_eq!(displayed_width(bar, ms(9000), transition), 50.0);
        assert_eq!(displayed_width(bar, ms(1000), Duration::ZERO), 50.0);
    }

    #[test]
    fn test_resize_evaluates_and_clamps() {
        let layout = PageManifest::builtin().unwrap().layout();
        let mut app = AppState::new(&Config::default(), layout);
        app.resize(40);
        assert_eq!(app.scroll.viewport_rows, 37);
        assert_eq!(app.scroll.viewport_px(), 592.0);

        app.scroll_to(1.0e9);
        assert_eq!(app.scroll.offset_px, app.max_scroll());
        app.scroll_by(-1.0e9);
        assert_eq!(app.scroll.offset_px, 0.0);
    }

    #[test]
    fn test_px_to_rows_rounds() {
        assert_eq!(px_to_rows(0.0, 16.0), 0);
        assert_eq!(px_to_rows(420.0, 16.0), 26);
        assert_eq!(px_to_rows(444.0, 16.0), 28);
        assert_eq!(px_to_rows(-5.0, 16.0), 0);
    }
}
