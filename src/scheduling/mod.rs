//! Class scheduling support: fixed-offset timezone resolution for the
//! marketplace's operating countries and timestamp normalization at the API
//! boundary.

mod instant;
mod zones;

pub use instant::{InstantError, TimestampInput};
pub use zones::{
    convert_from_utc, convert_to_utc, has_multiple_timezones, timezones_for, zone,
    SchedulingError, ZoneEntry, ZoneView,
};
