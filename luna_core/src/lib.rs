#![forbid(unsafe_code)]

//! Core domain model and prediction logic for Luna.
//!
//! This crate provides:
//! - Domain types (logged days, cycle configuration, day records)
//! - Period episode detection
//! - Cycle prediction (periods, fertile window, ovulation)
//! - Dashboard summary and month view
//! - Persistence (logged days, day records, CSV export) and configuration

pub mod types;
pub mod error;
pub mod dates;
pub mod episodes;
pub mod predictor;
pub mod dashboard;
pub mod calendar;
pub mod config;
pub mod logging;
pub mod store;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use dates::CalendarDate;
pub use episodes::{detect_episode_starts, detect_episodes, Episode};
pub use predictor::{
    predict_cycle, CyclePredictor, DEFAULT_CYCLE_WINDOW, LUTEAL_PHASE_DAYS, MAX_CYCLE_WINDOW,
};
pub use dashboard::summarize;
pub use calendar::month_view;
pub use config::Config;
pub use store::DataPaths;
pub use export::export_csv;
