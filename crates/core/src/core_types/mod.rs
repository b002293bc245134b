//! Core input types and units

pub mod hazard;
pub mod spatial;
pub mod unit;
pub mod units;
pub mod vulnerability;
pub mod weather;

pub use hazard::*;
pub use spatial::{bearing_vector, vector_bearing, GeoPoint};
pub use unit::UnitInput;
pub use units::*;
pub use vulnerability::*;
pub use weather::*;
