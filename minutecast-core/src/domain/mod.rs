//! Domain types for minutecast

pub mod bar;

pub use bar::{count_gaps, validate_series, Bar, BarError};
