//! geodist: great-circle distances between named cities.
//!
//! Coordinates come from a pluggable [`location::CoordinateSource`]; the
//! [`report`] module compares every pair and picks the closest.

pub mod geo;
pub mod location;
pub mod logging;
pub mod report;
