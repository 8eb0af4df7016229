#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod components;
pub mod config;
pub mod error;
pub mod metrics;
pub mod process;
pub mod view;

pub use app::ProcessManagerApp;
pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use metrics::{MonitorEngine, RefreshOutcome, Refresher};
