//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use lattice_core::intercept::InterceptStatus;
use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Frame { height, now, .. } => {
            app.now = now;
            // Timers due before this instant fire before the viewport moves.
            app.page.run_due(now);
            app.resize(height);
            vec![]
        }
        UiEvent::Tick => vec![],
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::InterceptFinished(result) => {
            match result {
                Ok(report) => {
                    app.intercept.status = Some(InterceptStatus::Success);
                    app.intercept.report = Some(report);
                }
                Err(status) => {
                    app.intercept.status = Some(status);
                    app.intercept.report = None;
                }
            }
            vec![]
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Resize(_, rows) => {
            app.resize(rows);
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.kind == KeyEventKind::Release {
        return vec![];
    }

    let row = app.scroll.row_px;
    let page = f64::from(app.scroll.viewport_rows.saturating_sub(1).max(1)) * row;

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            vec![UiEffect::Quit]
        }
        KeyCode::Char('q') | KeyCode::Esc => vec![UiEffect::Quit],
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll_by(row);
            vec![]
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll_by(-row);
            vec![]
        }
        KeyCode::PageDown | KeyCode::Char(' ') => {
            app.scroll_by(page);
            vec![]
        }
        KeyCode::PageUp => {
            app.scroll_by(-page);
            vec![]
        }
        KeyCode::Home | KeyCode::Char('g') => {
            app.scroll_to(0.0);
            vec![]
        }
        KeyCode::End | KeyCode::Char('G') => {
            let bottom = app.max_scroll();
            app.scroll_to(bottom);
            vec![]
        }
        KeyCode::Char('i') => start_intercept(app),
        _ => vec![],
    }
}

fn start_intercept(app: &mut AppState) -> Vec<UiEffect> {
    if app.intercept.in_flight() {
        debug!("intercept already in flight");
        return vec![];
    }
    app.intercept.status = Some(InterceptStatus::Sending);
    vec![UiEffect::RunIntercept {
        payload_hex: app.intercept.payload_hex.clone(),
    }]
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use lattice_core::intercept::InterceptReport;
    use lattice_core::{Config, PageManifest};

    use super::*;

    fn app() -> AppState {
        let layout = PageManifest::builtin().unwrap().layout();
        let mut app = AppState::new(&Config::default(), layout);
        update(
            &mut app,
            UiEvent::Frame {
                width: 100,
                height: 40,
                now: Duration::ZERO,
            },
        );
        app
    }

    fn press(app: &mut AppState, code: KeyCode) -> Vec<UiEffect> {
        update(
            app,
            UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE))),
        )
    }

    #[test]
    fn test_scroll_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.scroll.offset_px, 16.0);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.scroll.offset_px, 32.0);
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.scroll.offset_px, 16.0);
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.scroll.offset_px, 16.0 + 36.0 * 16.0);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.scroll.offset_px, 0.0);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.scroll.offset_px, 0.0);
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.scroll.offset_px, app.max_scroll());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), vec![UiEffect::Quit]);
        assert_eq!(press(&mut app, KeyCode::Esc), vec![UiEffect::Quit]);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(
            update(&mut app, UiEvent::Terminal(Event::Key(ctrl_c))),
            vec![UiEffect::Quit]
        );
    }

    #[test]
    fn test_scrolling_to_live_section_starts_feed() {
        let mut app = app();
        assert_eq!(app.page.engine().live().state().ticks, 0);
        press(&mut app, KeyCode::Char('G'));
        update(
            &mut app,
            UiEvent::Frame {
                width: 100,
                height: 40,
                now: Duration::from_millis(1000),
            },
        );
        assert_eq!(app.page.engine().live().state().ticks, 20);
        assert_eq!(
            app.page.display().slot("txCompressed"),
            Some("10,000")
        );
    }

    #[test]
    fn test_intercept_lifecycle() {
        let mut app = app();
        let effects = press(&mut app, KeyCode::Char('i'));
        assert_eq!(
            effects,
            vec![UiEffect::RunIntercept {
                payload_hex: Config::default().intercept.payload_hex
            }]
        );
        assert!(app.intercept.in_flight());
        assert!(press(&mut app, KeyCode::Char('i')).is_empty());

        update(
            &mut app,
            UiEvent::InterceptFinished(Err(InterceptStatus::Unreachable)),
        );
        assert_eq!(app.intercept.status, Some(InterceptStatus::Unreachable));

        press(&mut app, KeyCode::Char('i'));
        let report = InterceptReport {
            original_size: 68,
            packed_size: 24,
            tx_hash: "0x1234567890abcdef".to_string(),
            gas_used: 21000,
            compression_time_ms: 0.5,
        };
        update(&mut app, UiEvent::InterceptFinished(Ok(report.clone())));
        assert_eq!(app.intercept.status, Some(InterceptStatus::Success));
        assert_eq!(app.intercept.report, Some(report));
    }
}
