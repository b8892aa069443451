//! Utility functions for date and age formatting.

pub mod format;

pub use format::{format_age_minutes, format_long_date, truncate};
