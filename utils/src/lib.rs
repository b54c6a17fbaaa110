//! Shared utilities for senatus.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{format_duration, next_run_after, parse_daily_time};
