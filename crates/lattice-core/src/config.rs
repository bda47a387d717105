//! Configuration management for Lattice.
//!
//! Loads configuration from ${LATTICE_HOME}/config.toml with sensible defaults.
//! Every value defaults to the constants the page was designed around, so
//! an empty or missing file reproduces the stock behavior.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::EngineOptions;
use crate::live::LiveParams;
use crate::visibility::{ObserverOptions, RootMargin};

/// Scroll-reveal observer settings (reveals, counters, bar groups).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Fraction of an element that must be visible to trigger it.
    pub threshold: f64,
    /// CSS-style margin applied to the viewport (negative shrinks).
    pub root_margin: RootMargin,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            root_margin: RootMargin {
                bottom: -50.0,
                ..RootMargin::NONE
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub duration_ms: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self { duration_ms: 1800 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarsConfig {
    /// Delay between consecutive bars of a group.
    pub stagger_ms: u64,
    /// Length of the width transition drawn by renderers.
    pub transition_ms: u64,
}

impl Default for BarsConfig {
    fn default() -> Self {
        Self {
            stagger_ms: 200,
            transition_ms: 1000,
        }
    }
}

/// Live metrics simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub threshold: f64,
    pub tick_ms: u64,
    pub transactions_per_second: f64,
    pub uncompressed_tx_bytes: f64,
    pub compressed_tx_bytes: f64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            tick_ms: 50,
            transactions_per_second: 10_000.0,
            uncompressed_tx_bytes: 500.0,
            compressed_tx_bytes: 125.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Refresh interval used when no real display clock exists (~60Hz).
    pub frame_interval_ms: u64,
    /// CSS pixels per terminal row in the TUI.
    pub row_px: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            row_px: 16.0,
        }
    }
}

/// Demo interceptor endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptConfig {
    pub base_url: String,
    /// Payload sent when none is given on the command line.
    pub payload_hex: String,
}

impl Default for InterceptConfig {
    fn default() -> Self {
        Self {
            base_url: crate::intercept::DEFAULT_BASE_URL.to_string(),
            payload_hex: crate::intercept::DEMO_PAYLOAD_HEX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive; `LATTICE_LOG` takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reveal: RevealConfig,
    pub counter: CounterConfig,
    pub bars: BarsConfig,
    pub live: LiveConfig,
    pub display: DisplayConfig,
    pub intercept: InterceptConfig,
    pub log: LogConfig,
}

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for Lattice configuration and data directories.
    //!
    //! LATTICE_HOME resolution order:
    //! 1. LATTICE_HOME environment variable (if set)
    //! 2. ~/.config/lattice (default)
    //! 3. ./.lattice when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the Lattice home directory.
    pub fn lattice_home() -> PathBuf {
        if let Ok(home) = std::env::var("LATTICE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".lattice"),
            |h| h.join(".config").join("lattice"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        lattice_home().join("config.toml")
    }

    /// Returns the directory the TUI writes its log file to.
    pub fn logs_dir() -> PathBuf {
        lattice_home().join("logs")
    }
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if its `[live]` values would make the totals shrink.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?;
            config
                .live_params()
                .validate()
                .with_context(|| format!("Invalid [live] section in {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the commented default config to `path`.
    ///
    /// # Errors
    /// Fails if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Uses the embedded template for structure/comments and merges
    /// generated values from `Config::default()` into it. This is what
    /// `xtask update-default-config` writes back to `default_config.toml`.
    ///
    /// # Errors
    /// Returns an error if serialization or template parsing fails.
    pub fn generate() -> Result<String> {
        use toml_edit::{DocumentMut, Item};

        let config = Config::default();
        let generated_toml =
            toml::to_string(&config).context("Failed to serialize default config to TOML")?;

        // Parse template as base (preserves comments)
        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;

        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        // Overwrites values, keeps comments
        fn merge(target: &mut toml_edit::Table, source: &toml_edit::Table) {
            for (key, value) in source.iter() {
                match value {
                    Item::Value(v) => {
                        if let Some(Item::Value(existing)) = target.get_mut(key) {
                            let decor = existing.decor().clone();
                            *existing = v.clone();
                            *existing.decor_mut() = decor;
                        } else {
                            target[key] = Item::Value(v.clone());
                        }
                    }
                    Item::Table(src_table) => {
                        if let Some(Item::Table(target_table)) = target.get_mut(key) {
                            merge(target_table, src_table);
                        } else {
                            target[key] = Item::Table(src_table.clone());
                        }
                    }
                    Item::ArrayOfTables(arr) => {
                        target[key] = Item::ArrayOfTables(arr.clone());
                    }
                    Item::None => {}
                }
            }
        }

        merge(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.display.frame_interval_ms.max(1))
    }

    pub fn live_params(&self) -> LiveParams {
        LiveParams {
            tick: Duration::from_millis(self.live.tick_ms.max(1)),
            transactions_per_second: self.live.transactions_per_second,
            uncompressed_tx_bytes: self.live.uncompressed_tx_bytes,
            compressed_tx_bytes: self.live.compressed_tx_bytes,
        }
    }

    /// Engine settings derived from this config.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            reveal: ObserverOptions {
                threshold: self.reveal.threshold.clamp(0.0, 1.0),
                root_margin: self.reveal.root_margin,
            },
            live: ObserverOptions {
                threshold: self.live.threshold.clamp(0.0, 1.0),
                root_margin: RootMargin::NONE,
            },
            counter_duration: Duration::from_millis(self.counter.duration_ms),
            bar_stagger: Duration::from_millis(self.bars.stagger_ms),
            live_params: self.live_params(),
        }
    }
}
