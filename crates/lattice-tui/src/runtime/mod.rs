//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! This is the Elm runtime boundary; all side effects happen here. The
//! page clock is `Instant`-based and handed to the reducer once per loop
//! iteration, so the page engine sees the same time model as the
//! headless host.
//!
//! ## Inbox Pattern
//!
//! Async handlers send their result `UiEvent` to `inbox_tx`; the runtime
//! drains `inbox_rx` every iteration.

mod handlers;
mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use lattice_core::Config;
use lattice_core::intercept::InterceptClient;
use lattice_core::page::PageLayout;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Render cadence while anything is moving (~60fps).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when the page is at rest.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    client: InterceptClient,
    /// Page clock origin.
    started: Instant,
    last_tick: Instant,
    last_terminal_event: Instant,
}

impl TuiRuntime {
    /// # Errors
    /// Returns an error if the intercept URL is invalid or the terminal
    /// cannot be set up.
    pub fn new(config: &Config, layout: PageLayout) -> Result<Self> {
        let client = InterceptClient::new(&config.intercept.base_url)?;

        // Panic hook goes in before the alternate screen.
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let now = Instant::now();
        Ok(Self {
            terminal,
            state: AppState::new(config, layout),
            inbox_tx,
            inbox_rx,
            client,
            started: now,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if terminal I/O fails.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            // Clock and size first so every other event sees them.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                    now: self.started.elapsed(),
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                let marks_dirty = !matches!(&event, UiEvent::Frame { .. });
                let effects = update::update(&mut self.state, event);
                dirty |= marks_dirty;
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }
        }

        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let tick_interval = if self.state.is_animating() || recent_terminal_activity {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Wake for whichever comes first: the next render tick or the next
        // page timer.
        let mut wait = tick_interval.saturating_sub(self.last_tick.elapsed());
        if let Some(deadline) = self.state.page.next_deadline() {
            wait = wait.min(deadline.saturating_sub(self.started.elapsed()));
        }
        let poll_duration = if events.is_empty() {
            wait
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async handler and delivers its result through the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::RunIntercept { payload_hex } => {
                debug!(endpoint = %self.client.endpoint(), "spawning intercept request");
                let client = self.client.clone();
                self.spawn_effect(move || handlers::run_intercept(client, payload_hex));
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
