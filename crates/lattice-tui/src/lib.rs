//! Full-screen terminal viewer for a Lattice page.

pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stdout};

use anyhow::Result;
use lattice_core::Config;
use lattice_core::page::PageLayout;
pub use runtime::TuiRuntime;
use tracing::info;

/// Opens the page in the terminal and runs until the user quits.
///
/// Must be called inside a tokio runtime; the intercept demo is spawned
/// onto it.
///
/// # Errors
/// Returns an error if stdout is not a terminal or the terminal fails.
pub fn run_page(config: &Config, layout: PageLayout) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The page viewer requires a terminal.\n\
             Use `lattice simulate` for a headless run."
        );
    }

    info!(title = %layout.title, blocks = layout.elements.len(), "opening page");
    let mut runtime = TuiRuntime::new(config, layout)?;
    runtime.run()
}
