//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Prayer schedule uses local wall time (`chrono::NaiveDateTime`) from a `Clock`
//! - Heading calibration uses monotonic `std::time::Instant`

mod blueprint;
mod clock;
mod error;
mod geo;
mod location;
mod magnetometer;
mod navigation;
mod sink;
mod subscription;
mod timetable;

pub use blueprint::*;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::*;
pub use geo::{GeoPoint, KAABA};
pub use location::{LocalLocationSource, LocationCallback, LocationSource, WatchOptions};
pub use magnetometer::{MagnetometerCallback, MagnetometerSource, RawMagnetometerSample};
pub use navigation::*;
pub use sink::*;
pub use subscription::Subscription;
pub use timetable::*;
