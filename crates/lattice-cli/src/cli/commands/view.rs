//! Interactive page viewer.

use anyhow::Result;
use lattice_core::config::paths;
use lattice_core::{Config, PageManifest, logging};

pub fn run(config: &Config, manifest: &PageManifest) -> Result<()> {
    // The viewer owns the screen, so logs go to a file.
    let _guard = logging::init_file(&paths::logs_dir(), config.log.filter.as_deref())?;
    lattice_tui::run_page(config, manifest.layout())
}
