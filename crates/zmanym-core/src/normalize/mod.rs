//! Pure conversion from upstream payloads to normalized snapshots.
//!
//! Nothing in here returns an error. A field that cannot be extracted
//! becomes [`UNAVAILABLE`](crate::models::UNAVAILABLE) and the rest of the
//! snapshot is still built.

pub mod daily;
pub mod time;
pub mod weekly;

pub use daily::normalize_daily;
pub use time::{extract_time, format_zman};
pub use weekly::{normalize_shabbat, MAX_HOLIDAYS};
