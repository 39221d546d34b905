//! Core types for the location subsystem.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// A city identified by name and country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct City {
    pub name: String,
    pub country: String,
}

impl City {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.country)
    }
}

/// Parse "Lima, Peru" → City { name: "Lima", country: "Peru" }
impl FromStr for City {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, country) = s
            .split_once(',')
            .ok_or_else(|| format!("Expected \"City, Country\", got '{}'", s))?;
        let (name, country) = (name.trim(), country.trim());
        if name.is_empty() || country.is_empty() {
            return Err(format!("Expected \"City, Country\", got '{}'", s));
        }
        Ok(City::new(name, country))
    }
}

/// Which coordinate source to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Api,
    Mock,
}

impl SourceKind {
    /// Map an interactive menu answer (1, 2, 3) to a source.
    pub fn from_menu_choice(input: &str) -> Option<Self> {
        match input.trim().parse::<u8>().ok()? {
            1 => Some(Self::Csv),
            2 => Some(Self::Api),
            3 => Some(Self::Mock),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "CSV"),
            Self::Api => write!(f, "Nominatim"),
            Self::Mock => write!(f, "Mock"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(kind) = Self::from_menu_choice(s) {
            return Ok(kind);
        }
        match s.trim().to_lowercase().as_str() {
            "csv" | "file" => Ok(Self::Csv),
            "api" | "nominatim" => Ok(Self::Api),
            "mock" | "static" => Ok(Self::Mock),
            _ => Err(format!("Unknown source '{}'. Use 'csv', 'api' or 'mock'.", s)),
        }
    }
}

/// Coordinate source failures. A city that simply is not there is not an
/// error; sources report that as `Ok(None)`.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV file is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("Invalid {field} '{value}' for {city}")]
    InvalidField {
        city: String,
        field: &'static str,
        value: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Coordinate out of range: lat {lat}, lon {lon}")]
    OutOfRange { lat: f64, lon: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_from_str() {
        let city: City = "Lima, Peru".parse().unwrap();
        assert_eq!(city, City::new("Lima", "Peru"));
        assert_eq!(city.to_string(), "Lima, Peru");
    }

    #[test]
    fn test_city_from_str_rejects_missing_country() {
        assert!("Lima".parse::<City>().is_err());
        assert!("Lima, ".parse::<City>().is_err());
        assert!(" , Peru".parse::<City>().is_err());
    }

    #[test]
    fn test_menu_choice() {
        assert_eq!(SourceKind::from_menu_choice("1"), Some(SourceKind::Csv));
        assert_eq!(SourceKind::from_menu_choice(" 2\n"), Some(SourceKind::Api));
        assert_eq!(SourceKind::from_menu_choice("3"), Some(SourceKind::Mock));
        assert_eq!(SourceKind::from_menu_choice("4"), None);
        assert_eq!(SourceKind::from_menu_choice("0"), None);
        assert_eq!(SourceKind::from_menu_choice("csv"), None);
        assert_eq!(SourceKind::from_menu_choice(""), None);
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("mock".parse::<SourceKind>(), Ok(SourceKind::Mock));
        assert_eq!("Nominatim".parse::<SourceKind>(), Ok(SourceKind::Api));
        assert_eq!("file".parse::<SourceKind>(), Ok(SourceKind::Csv));
        assert_eq!("2".parse::<SourceKind>(), Ok(SourceKind::Api));
        assert!("gps".parse::<SourceKind>().is_err());
    }
}
