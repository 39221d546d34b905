//! Location resolver: holds the selected coordinate source.
//!
//! Every lookup goes through here so results are range-checked and logged
//! the same way regardless of where they came from.

use super::providers::{CoordinateSource, CsvSource, MockSource, NominatimSource, SourceConfig};
use super::types::{City, LocationError, SourceKind};
use crate::geo::Coordinate;

/// Delegates city lookups to one coordinate source.
pub struct LocationResolver {
    source: Box<dyn CoordinateSource>,
}

impl LocationResolver {
    /// Build the resolver for a source kind.
    pub fn new(kind: SourceKind, config: &SourceConfig) -> Self {
        let source: Box<dyn CoordinateSource> = match kind {
            SourceKind::Csv => Box::new(CsvSource::new(config.csv_path.clone())),
            SourceKind::Api => Box::new(NominatimSource::new(config.endpoint.clone(), config.timeout)),
            SourceKind::Mock => Box::new(MockSource),
        };
        Self::with_source(source)
    }

    /// Create a resolver around an existing source (for testing).
    pub fn with_source(source: Box<dyn CoordinateSource>) -> Self {
        Self { source }
    }

    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    /// Look up one city. `Ok(None)` when the source has no entry for it.
    pub fn resolve(&self, city: &City) -> Result<Option<Coordinate>, LocationError> {
        let kind = self.source.kind();
        match self.source.resolve(city)? {
            Some(c) => {
                let c = Coordinate::new(c.lat, c.lon)?;
                tracing::debug!(city = %city, source = %kind, lat = c.lat, lon = c.lon, "resolved");
                Ok(Some(c))
            }
            None => {
                tracing::warn!(city = %city, source = %kind, "no coordinates found");
                Ok(None)
            }
        }
    }
}
