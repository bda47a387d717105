//! Core Lattice library (page engine, hosts, config, intercept client).

pub mod animator;
pub mod bars;
pub mod config;
pub mod dispatcher;
pub mod display;
pub mod engine;
pub mod format;
pub mod headless;
pub mod intercept;
pub mod live;
pub mod logging;
pub mod page;
pub mod scheduler;
pub mod visibility;

pub use config::Config;
pub use engine::{EngineOptions, PageEffect, PageEngine, PageEvent};
pub use headless::HeadlessRuntime;
pub use page::{PageLayout, PageManifest};
