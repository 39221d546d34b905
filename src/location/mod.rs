//! Coordinate lookup for named cities.
//!
//! Three interchangeable sources sit behind the [`CoordinateSource`] trait:
//! a CSV file, the Nominatim geocoder, and a small built-in mock table.

pub mod providers;
pub mod resolver;
pub mod types;

pub use providers::{CoordinateSource, CsvSource, MockSource, NominatimSource, SourceConfig};
pub use resolver::LocationResolver;
pub use types::{City, LocationError, SourceKind};
