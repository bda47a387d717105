//! Simulated live throughput feed.
//!
//! ```text
//! Idle ──register(all slots present)──▶ Armed ──first ≥30% visibility──▶ Running
//! ```
//!
//! `Running` is terminal: the tick timer is never stopped and the totals
//! are never reset.

use std::time::Duration;

use anyhow::{Result, bail};
use tracing::{debug, info};

use crate::format::{format_bytes, format_number};

/// Slot names the live section must expose before it arms.
pub const SLOT_BYTES_SAVED: &str = "bytesSaved";
pub const SLOT_TX_COMPRESSED: &str = "txCompressed";
pub const SLOT_STORAGE_RECLAIMED: &str = "storageReclaimed";
pub const REQUIRED_SLOTS: [&str; 3] = [SLOT_BYTES_SAVED, SLOT_TX_COMPRESSED, SLOT_STORAGE_RECLAIMED];

/// Constants of the simulated network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveParams {
    pub tick: Duration,
    pub transactions_per_second: f64,
    pub uncompressed_tx_bytes: f64,
    pub compressed_tx_bytes: f64,
}

impl Default for LiveParams {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(50),
            transactions_per_second: 10_000.0,
            uncompressed_tx_bytes: 500.0,
            compressed_tx_bytes: 125.0,
        }
    }
}

impl LiveParams {
    pub fn tx_per_tick(&self) -> f64 {
        self.transactions_per_second * self.tick.as_micros() as f64 / 1_000_000.0
    }

    pub fn bytes_saved_per_tx(&self) -> f64 {
        self.uncompressed_tx_bytes - self.compressed_tx_bytes
    }

    /// Checks that every tick adds a finite, non-negative amount to both
    /// totals.
    ///
    /// # Errors
    /// Names the first offending value.
    pub fn validate(&self) -> Result<()> {
        if self.tick.is_zero() {
            bail!("tick must be at least 1ms");
        }
        for (name, value) in [
            ("transactions_per_second", self.transactions_per_second),
            ("uncompressed_tx_bytes", self.uncompressed_tx_bytes),
            ("compressed_tx_bytes", self.compressed_tx_bytes),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{name} must be a finite non-negative number, got {value}");
            }
        }
        if self.compressed_tx_bytes > self.uncompressed_tx_bytes {
            bail!(
                "compressed_tx_bytes ({}) exceeds uncompressed_tx_bytes ({})",
                self.compressed_tx_bytes,
                self.uncompressed_tx_bytes
            );
        }
        Ok(())
    }
}

/// Accumulated simulation totals. Owned by the simulator; only `tick`
/// mutates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveSimState {
    pub total_bytes_saved: f64,
    pub total_tx_compressed: f64,
    pub started: bool,
    pub ticks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivePhase {
    /// Missing display slots or invalid params; the simulator never runs.
    Idle,
    /// Waiting for the container's first qualifying visibility.
    Armed,
    Running,
}

/// Formatted values for the three output slots.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveReadout {
    pub bytes_saved: String,
    pub tx_compressed: String,
    pub storage_reclaimed: String,
}

impl LiveReadout {
    pub fn from_state(state: &LiveSimState) -> Self {
        let bytes = state.total_bytes_saved.floor().max(0.0) as u64;
        let tx = state.total_tx_compressed.floor().max(0.0) as u64;
        Self {
            bytes_saved: format_number(bytes),
            tx_compressed: format_number(tx),
            storage_reclaimed: format_bytes(bytes),
        }
    }

    /// Pairs each value with its slot name.
    pub fn slots(&self) -> [(&'static str, &str); 3] {
        [
            (SLOT_BYTES_SAVED, self.bytes_saved.as_str()),
            (SLOT_TX_COMPRESSED, self.tx_compressed.as_str()),
            (SLOT_STORAGE_RECLAIMED, self.storage_reclaimed.as_str()),
        ]
    }
}

#[derive(Debug)]
pub struct LiveSimulator {
    params: LiveParams,
    phase: LivePhase,
    state: LiveSimState,
}

impl LiveSimulator {
    /// Registers the simulator against the slots the page provides.
    ///
    /// Arms only if every required slot is present and the params are
    /// valid; otherwise stays idle.
    pub fn register<S: AsRef<str>>(params: LiveParams, available_slots: &[S]) -> Self {
        if let Err(err) = params.validate() {
            debug!(error = %err, "live metrics inert: invalid params");
            return Self {
                params,
                phase: LivePhase::Idle,
                state: LiveSimState::default(),
            };
        }
        let missing: Vec<&str> = REQUIRED_SLOTS
            .iter()
            .copied()
            .filter(|required| !available_slots.iter().any(|s| s.as_ref() == *required))
            .collect();
        let phase = if missing.is_empty() {
            LivePhase::Armed
        } else {
            debug!(?missing, "live metrics inert: display slots missing");
            LivePhase::Idle
        };
        Self {
            params,
            phase,
            state: LiveSimState::default(),
        }
    }

    /// A simulator with no display slots.
    pub fn inert(params: LiveParams) -> Self {
        Self::register::<&str>(params, &[])
    }

    pub fn phase(&self) -> LivePhase {
        self.phase
    }

    pub fn state(&self) -> &LiveSimState {
        &self.state
    }

    pub fn params(&self) -> &LiveParams {
        &self.params
    }

    /// Handles the container becoming visible.
    ///
    /// Returns `true` exactly once: on the Armed→Running transition. The
    /// caller starts the recurring tick when it sees `true`.
    pub fn on_visible(&mut self) -> bool {
        if self.phase != LivePhase::Armed || self.state.started {
            return false;
        }
        self.state.started = true;
        self.phase = LivePhase::Running;
        info!(
            tick_ms = self.params.tick.as_millis() as u64,
            tx_per_tick = self.params.tx_per_tick(),
            "live metrics started"
        );
        true
    }

    /// Advances the simulation by one tick. Ignored unless running.
    pub fn tick(&mut self) -> Option<LiveReadout> {
        if self.phase != LivePhase::Running {
            return None;
        }
        let tx = self.params.tx_per_tick();
        self.state.ticks += 1;
        self.state.total_tx_compressed += tx;
        self.state.total_bytes_saved += tx * self.params.bytes_saved_per_tx();
        Some(LiveReadout::from_state(&self.state))
    }
}
