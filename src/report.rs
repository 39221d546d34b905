//! Closest-pair report. Resolves a set of cities and compares every pair.

use crate::geo::{format_coords, Coordinate};
use crate::location::{City, LocationError, LocationResolver, SourceKind};
use serde::Serialize;
use thiserror::Error;

/// Cities compared when none are given on the command line.
pub const DEFAULT_CITIES: &[(&str, &str)] = &[("Lima", "Peru"), ("Cusco", "Peru"), ("Arequipa", "Peru")];

pub fn default_cities() -> Vec<City> {
    DEFAULT_CITIES
        .iter()
        .map(|(name, country)| City::new(*name, *country))
        .collect()
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("At least two cities are needed, got {0}")]
    TooFewCities(usize),

    #[error("Could not get coordinates for {0}")]
    NotFound(City),

    #[error("Coordinate source unavailable: {0}")]
    SourceUnavailable(#[from] LocationError),
}

impl ReportError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TooFewCities(_) | Self::NotFound(_) => 1,
            Self::SourceUnavailable(_) => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedCity {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_coords: String,
}

/// Two cities, by index into the report's city list, and their distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CityPair {
    pub from: usize,
    pub to: usize,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistanceReport {
    pub source: SourceKind,
    pub cities: Vec<ResolvedCity>,
    pub pairs: Vec<CityPair>,
    pub closest: CityPair,
}

impl DistanceReport {
    pub fn closest_names(&self) -> (&str, &str) {
        (
            &self.cities[self.closest.from].name,
            &self.cities[self.closest.to].name,
        )
    }

    /// One-line result, distance to two decimals.
    pub fn summary(&self) -> String {
        let (a, b) = self.closest_names();
        format!("Closest pair: {} and {} ({:.2} km)", a, b, self.closest.distance_km)
    }
}

/// Resolve every city, then pick the pair with the smallest distance.
///
/// Stops at the first city that cannot be resolved; no distances are
/// computed in that case.
pub fn closest_pair(resolver: &LocationResolver, cities: &[City]) -> Result<DistanceReport, ReportError> {
    if cities.len() < 2 {
        return Err(ReportError::TooFewCities(cities.len()));
    }

    let mut coords = Vec::with_capacity(cities.len());
    for city in cities {
        match resolver.resolve(city)? {
            Some(c) => coords.push(c),
            None => return Err(ReportError::NotFound(city.clone())),
        }
    }

    let pairs = pairwise_distances(&coords);
    let closest = closest(&pairs).ok_or(ReportError::TooFewCities(cities.len()))?;
    tracing::info!(
        from = %cities[closest.from],
        to = %cities[closest.to],
        km = closest.distance_km,
        "closest pair"
    );

    let cities = cities
        .iter()
        .zip(&coords)
        .map(|(city, c)| ResolvedCity {
            name: city.name.clone(),
            country: city.country.clone(),
            latitude: c.lat,
            longitude: c.lon,
            formatted_coords: format_coords(*c),
        })
        .collect();

    Ok(DistanceReport {
        source: resolver.kind(),
        cities,
        pairs,
        closest,
    })
}

/// Distances for every unordered pair (i, j), i < j, in index order.
pub fn pairwise_distances(coords: &[Coordinate]) -> Vec<CityPair> {
    let mut pairs = Vec::new();
    for (i, a) in coords.iter().enumerate() {
        for (j, b) in coords.iter().enumerate().skip(i + 1) {
            pairs.push(CityPair {
                from: i,
                to: j,
                distance_km: a.distance_to(b),
            });
        }
    }
    pairs
}

/// Strict minimum by distance; on an exact tie the earlier pair is kept.
pub fn closest(pairs: &[CityPair]) -> Option<CityPair> {
    pairs.iter().copied().fold(None, |best, p| match best {
        Some(b) if b.distance_km <= p.distance_km => Some(b),
        _ => Some(p),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{CoordinateSource, CsvSource, SourceConfig};
    use approx::assert_abs_diff_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn mock_resolver() -> LocationResolver {
        LocationResolver::new(SourceKind::Mock, &SourceConfig::default())
    }

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    /// Mock lookups that count how often they were asked.
    struct CountingSource {
        calls: Rc<Cell<usize>>,
    }

    impl CoordinateSource for CountingSource {
        fn kind(&self) -> SourceKind {
            SourceKind::Mock
        }

        fn resolve(&self, city: &City) -> Result<Option<Coordinate>, LocationError> {
            self.calls.set(self.calls.get() + 1);
            crate::location::MockSource.resolve(city)
        }
    }

    #[test]
    fn test_default_cities_mock() {
        let report = closest_pair(&mock_resolver(), &default_cities()).unwrap();
        assert_eq!(report.source, SourceKind::Mock);
        assert_eq!(report.pairs.len(), 3);
        assert_eq!(report.closest_names(), ("Cusco", "Arequipa"));
        assert_abs_diff_eq!(report.closest.distance_km, 326.91, epsilon = 0.01);
        assert_eq!(report.summary(), "Closest pair: Cusco and Arequipa (326.91 km)");
    }

    #[test]
    fn test_lima_cusco_mock() {
        let cities = [City::new("Lima", "Peru"), City::new("Cusco", "Peru")];
        let report = closest_pair(&mock_resolver(), &cities).unwrap();
        assert_abs_diff_eq!(report.closest.distance_km, 564.04, epsilon = 0.01);
        assert_eq!(report.summary(), "Closest pair: Lima and Cusco (564.04 km)");
    }

    #[test]
    fn test_unknown_city_stops_before_distances() {
        let calls = Rc::new(Cell::new(0));
        let resolver = LocationResolver::with_source(Box::new(CountingSource { calls: calls.clone() }));
        let cities = [
            City::new("Lima", "Peru"),
            City::new("Atlantis", "Nowhere"),
            City::new("Cusco", "Peru"),
        ];

        let err = closest_pair(&resolver, &cities).unwrap_err();
        assert!(matches!(&err, ReportError::NotFound(c) if c.name == "Atlantis"));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        let resolver = LocationResolver::with_source(Box::new(CsvSource::new(dir.path().join("missing.csv"))));
        let err = closest_pair(&resolver, &default_cities()).unwrap_err();
        assert!(matches!(err, ReportError::SourceUnavailable(LocationError::Io { .. })));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_too_few_cities() {
        let err = closest_pair(&mock_resolver(), &[City::new("Lima", "Peru")]).unwrap_err();
        assert!(matches!(err, ReportError::TooFewCities(1)));
        assert!(matches!(closest_pair(&mock_resolver(), &[]), Err(ReportError::TooFewCities(0))));
    }

    #[test]
    fn test_pairwise_order() {
        let pairs = pairwise_distances(&[coord(0.0, 0.0), coord(0.0, 1.0), coord(0.0, 3.0), coord(0.0, 6.0)]);
        let idx: Vec<_> = pairs.iter().map(|p| (p.from, p.to)).collect();
        assert_eq!(idx, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_closest_is_strict_minimum() {
        // The shortest leg is the last pair checked.
        let coords = [coord(0.0, 0.0), coord(0.0, 10.0), coord(0.0, 11.0)];
        let best = closest(&pairwise_distances(&coords)).unwrap();
        assert_eq!((best.from, best.to), (1, 2));

        // ... and the middle one.
        let coords = [coord(0.0, 0.0), coord(0.0, 20.0), coord(0.0, 1.0)];
        let best = closest(&pairwise_distances(&coords)).unwrap();
        assert_eq!((best.from, best.to), (0, 2));
    }

    #[test]
    fn test_closest_tie_keeps_first_pair() {
        // d(0,1) == d(1,2) < d(0,2)
        let coords = [coord(0.0, -1.0), coord(0.0, 0.0), coord(0.0, 1.0)];
        let pairs = pairwise_distances(&coords);
        assert_eq!(pairs[0].distance_km, pairs[2].distance_km);
        let best = closest(&pairs).unwrap();
        assert_eq!((best.from, best.to), (0, 1));
    }

    #[test]
    fn test_closest_empty() {
        assert!(closest(&[]).is_none());
    }

    #[test]
    fn test_report_json() {
        let report = closest_pair(&mock_resolver(), &default_cities()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["source"], "mock");
        assert_eq!(json["cities"][0]["name"], "Lima");
        assert_eq!(json["cities"][0]["formatted_coords"], "12.1000°S, 77.0000°W");
        assert_eq!(json["closest"]["from"], 1);
        assert_eq!(json["closest"]["to"], 2);
    }
}
