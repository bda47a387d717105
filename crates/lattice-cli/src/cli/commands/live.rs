//! Real-time live metrics feed.

use std::time::Duration;

use anyhow::{Context, Result};
use lattice_core::Config;
use lattice_core::live::{LiveReadout, LiveSimulator, REQUIRED_SLOTS};
use tokio::time::{Instant, interval_at, sleep};
use tracing::info;

pub async fn run(config: &Config, seconds: u64) -> Result<()> {
    let params = config.live_params();
    let mut sim = LiveSimulator::register(params, &REQUIRED_SLOTS);
    sim.on_visible();

    let ticks_per_line = (1000 / params.tick.as_millis().max(1)).max(1) as u64;
    let mut ticker = interval_at(Instant::now() + params.tick, params.tick);
    let deadline = sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last = LiveReadout::from_state(sim.state());
    loop {
        tokio::select! {
            () = &mut deadline => break,
            result = &mut ctrl_c => {
                result.context("listen for Ctrl+C")?;
                info!("interrupted");
                break;
            }
            _ = ticker.tick() => {
                if let Some(readout) = sim.tick() {
                    if sim.state().ticks % ticks_per_line == 0 {
                        print_line(sim.state().ticks, &readout);
                    }
                    last = readout;
                }
            }
        }
    }

    println!("final after {} ticks:", sim.state().ticks);
    for (slot, text) in last.slots() {
        println!("  {slot}: {text}");
    }
    Ok(())
}

fn print_line(ticks: u64, readout: &LiveReadout) {
    println!(
        "[{ticks:>6}] bytes saved {:>16} | tx compressed {:>12} | storage reclaimed {:>10}",
        readout.bytes_saved, readout.tx_compressed, readout.storage_reclaimed
    );
}
