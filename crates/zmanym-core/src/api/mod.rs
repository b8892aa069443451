//! Remote calendar gateway for the Hebcal API.
//!
//! This module provides the `CalendarGateway` trait, the seam the rest of the
//! crate talks to, and `HebcalClient`, its `reqwest`-backed implementation.
//!
//! The gateway is deliberately thin: one request per call, no retries, no
//! caching. It returns the parsed JSON body untouched.

pub mod client;
pub mod error;

pub use client::{CalendarGateway, HebcalClient, LocationQuery};
pub use error::ApiError;
