//! Location search and coordinate resolution.
//!
//! Hebcal's autocomplete endpoint returns either a bare array of records or
//! an object with an `items` array, and record fields differ between geoname
//! and zip results. The resolver accepts both and maps each record through a
//! fixed field precedence into a `LocationRecord`.

pub mod resolver;

pub use resolver::{parse_record, record_list, LocationResolver, SupportedRegion};
