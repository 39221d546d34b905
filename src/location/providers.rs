//! Coordinate providers: CSV file, Nominatim, and built-in mock table.

use super::types::{City, LocationError, SourceKind};
use crate::geo::Coordinate;
use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

/// A strategy that turns a city into coordinates.
///
/// `Ok(None)` means the source has no entry for the city. `Err` means the
/// source itself could not be consulted.
pub trait CoordinateSource {
    fn kind(&self) -> SourceKind;

    fn resolve(&self, city: &City) -> Result<Option<Coordinate>, LocationError>;
}

pub const DEFAULT_CSV_FILE: &str = "worldcities.csv";
pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings for the sources that need them.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub csv_path: PathBuf,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            csv_path: Self::default_csv_path(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SourceConfig {
    /// ./worldcities.csv, then <data dir>/geodist/worldcities.csv.
    /// Falls back to the first so a missing file is reported with a local path.
    pub fn default_csv_path() -> PathBuf {
        let local = PathBuf::from(DEFAULT_CSV_FILE);
        if local.is_file() {
            return local;
        }
        dirs::data_dir()
            .map(|d| d.join("geodist").join(DEFAULT_CSV_FILE))
            .filter(|p| p.is_file())
            .unwrap_or(local)
    }
}

// ─── CSV provider ───────────────────────────────────────────────

/// Looks cities up in a delimited file with a header row.
///
/// Required columns are `city`, `country`, `lat` (or `latitude`) and
/// `lng` (or `lon`, `longitude`). The simplemaps worldcities.csv layout
/// works unchanged.
pub struct CsvSource {
    path: PathBuf,
}

const REQUIRED_COLUMNS: &[&[&str]] = &[
    &["city"],
    &["country"],
    &["lat", "latitude"],
    &["lng", "lon", "longitude"],
];

/// Positions of the required columns, in `REQUIRED_COLUMNS` order.
struct ColumnIndex {
    city: usize,
    country: usize,
    lat: usize,
    lng: usize,
}

impl ColumnIndex {
    /// First header matching each alias group; later duplicates are ignored.
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LocationError> {
        let mut found = [0usize; 4];
        for (slot, aliases) in found.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| aliases.contains(&h))
                .ok_or(LocationError::MissingColumn(aliases[0]))?;
        }
        let [city, country, lat, lng] = found;
        Ok(Self { city, country, lat, lng })
    }
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<(csv::Reader<File>, ColumnIndex), LocationError> {
        let file = File::open(&self.path).map_err(|source| LocationError::Io {
            path: self.path.clone(),
            source,
        })?;
        // Ragged rows are tolerated; only the matched row has to be complete.
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(file);

        let columns = ColumnIndex::from_headers(reader.headers()?)?;
        Ok((reader, columns))
    }
}

impl CoordinateSource for CsvSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Csv
    }

    fn resolve(&self, city: &City) -> Result<Option<Coordinate>, LocationError> {
        let (mut reader, columns) = self.open()?;
        let name = city.name.trim().to_lowercase();
        let country = city.country.trim().to_lowercase();

        for record in reader.records() {
            let record = record?;
            let field_matches = |idx: usize, want: &str| {
                record.get(idx).is_some_and(|v| v.to_lowercase() == want)
            };
            if !field_matches(columns.city, &name) || !field_matches(columns.country, &country) {
                continue;
            }
            let lat = parse_field(city, "lat", record.get(columns.lat).unwrap_or(""))?;
            let lon = parse_field(city, "lng", record.get(columns.lng).unwrap_or(""))?;
            return Coordinate::new(lat, lon).map(Some);
        }
        Ok(None)
    }
}

fn parse_field(city: &City, field: &'static str, value: &str) -> Result<f64, LocationError> {
    value.parse().map_err(|_| LocationError::InvalidField {
        city: city.to_string(),
        field,
        value: value.to_string(),
    })
}

// ─── Nominatim provider ─────────────────────────────────────────

const USER_AGENT: &str = concat!("geodist/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize, Debug, Clone)]
pub struct NominatimResult {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Geocodes cities through an OpenStreetMap Nominatim search endpoint.
pub struct NominatimSource {
    endpoint: String,
    agent: ureq::Agent,
}

impl NominatimSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            endpoint: endpoint.into(),
            agent,
        }
    }

    fn search_url(&self, city: &City) -> String {
        format!(
            "{}/search?q={}&format=json&limit=1",
            self.endpoint.trim_end_matches('/'),
            urlencode(&format!("{},{}", city.name, city.country)),
        )
    }
}

impl CoordinateSource for NominatimSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Api
    }

    fn resolve(&self, city: &City) -> Result<Option<Coordinate>, LocationError> {
        let url = self.search_url(city);
        tracing::debug!(%url, "querying geocoder");

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| LocationError::Network(e.to_string()))?;
        let body = response
            .into_string()
            .map_err(|e| LocationError::Network(e.to_string()))?;

        parse_search_response(&body)
    }
}

/// Take the first hit of a Nominatim search body; an empty array is "not found".
pub fn parse_search_response(body: &str) -> Result<Option<Coordinate>, LocationError> {
    let results: Vec<NominatimResult> =
        serde_json::from_str(body).map_err(|e| LocationError::InvalidResponse(e.to_string()))?;

    let Some(top) = results.into_iter().next() else {
        return Ok(None);
    };
    if let Some(ref name) = top.display_name {
        tracing::debug!(display_name = %name, "geocoder match");
    }

    let lat: f64 = top
        .lat
        .trim()
        .parse()
        .map_err(|_| LocationError::InvalidResponse(format!("non-numeric lat '{}'", top.lat)))?;
    let lon: f64 = top
        .lon
        .trim()
        .parse()
        .map_err(|_| LocationError::InvalidResponse(format!("non-numeric lon '{}'", top.lon)))?;

    Coordinate::new(lat, lon).map(Some)
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            b' ' => out.push_str("%20"),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

// ─── Mock provider ──────────────────────────────────────────────

struct MockCity {
    name: &'static str,
    lat: f64,
    lon: f64,
}

const MOCK_CITIES: &[MockCity] = &[
    MockCity { name: "Lima", lat: -12.1, lon: -77.0 },
    MockCity { name: "Cusco", lat: -13.5, lon: -72.0 },
    MockCity { name: "Arequipa", lat: -16.4, lon: -71.5 },
];

/// Fixed in-memory table keyed by city name; the country is ignored.
pub struct MockSource;

impl CoordinateSource for MockSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Mock
    }

    fn resolve(&self, city: &City) -> Result<Option<Coordinate>, LocationError> {
        match MOCK_CITIES.iter().find(|c| c.name == city.name) {
            Some(c) => Coordinate::new(c.lat, c.lon).map(Some),
            None => Ok(None),
        }
    }
}
