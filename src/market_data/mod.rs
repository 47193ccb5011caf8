pub mod period;
pub mod series;

// Re-export the core types for convenient access (e.g. `use crate::market_data::TimeSeries`).
pub use period::{Interval, Period};
pub use series::{Sample, TimeSeries};
