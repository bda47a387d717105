//! CLI command handlers.

pub mod config;
pub mod intercept;
pub mod live;
pub mod simulate;
pub mod view;
