use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// Coarse country-level location for a listing whose page yields none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryLocation {
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city_id: i32,
}

/// Country-code -> location mapping, keyed by the two-letter segment in a
/// listing URL path (`/hotel/fr/...`). Injected so new regions are a config
/// change, not a code change; `Default` carries the table the historical
/// scrapers embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinateTable {
    entries: HashMap<String, CountryLocation>,
}

impl CoordinateTable {
    pub fn new(entries: HashMap<String, CountryLocation>) -> Self {
        Self { entries }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read coordinate table {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse coordinate table {}", path.display()))
    }

    pub fn get(&self, code: &str) -> Option<&CountryLocation> {
        self.entries.get(code)
    }

    /// Resolve a listing URL by scanning its path segments for a known
    /// country code.
    pub fn lookup_url(&self, url: &Url) -> Option<&CountryLocation> {
        url.path_segments()?
            .find_map(|segment| self.entries.get(segment))
    }
}

impl Default for CoordinateTable {
    fn default() -> Self {
        let rows = [
            ("it", "Italy", 41.8719, 12.5674, 10),
            ("tr", "Turkey", 41.0082, 28.9784, 11),
            ("pl", "Poland", 52.2297, 21.0122, 12),
            ("ae", "UAE", 25.2048, 55.2708, 13),
            ("fr", "France", 48.8566, 2.3522, 2),
            ("nl", "Netherlands", 52.3676, 4.9041, 14),
            ("gb", "United Kingdom", 51.5074, -0.1278, 15),
            ("es", "Spain", 40.4168, -3.7038, 16),
            ("be", "Belgium", 50.8503, 4.3517, 17),
            ("za", "South Africa", -33.9249, 18.4241, 18),
            ("lb", "Lebanon", 33.8547, 35.8623, 19),
            ("ro", "Romania", 44.4268, 26.1025, 1),
            ("cn", "China", 39.9042, 116.4074, 3),
        ];
        let entries = rows
            .into_iter()
            .map(|(code, country, latitude, longitude, city_id)| {
                (
                    code.to_string(),
                    CountryLocation {
                        country: country.to_string(),
                        latitude,
                        longitude,
                        city_id,
                    },
                )
            })
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_country_segment_from_listing_url() {
        let table = CoordinateTable::default();
        let url = Url::parse("https://www.booking.com/hotel/fr/radisson-blu-bordeaux.en-gb.html")
            .unwrap();
        let location = table.lookup_url(&url).unwrap();
        assert_eq!(location.country, "France");
        assert_eq!(location.city_id, 2);
    }

    #[test]
    fn unknown_country_yields_none() {
        let table = CoordinateTable::default();
        let url = Url::parse("https://www.booking.com/hotel/jp/some-hotel.html").unwrap();
        assert!(table.lookup_url(&url).is_none());
    }

    #[test]
    fn custom_table_parses_from_json() {
        let raw = r#"{
            "entries": {
                "jp": { "country": "Japan", "latitude": 35.6762, "longitude": 139.6503, "city_id": 20 }
            }
        }"#;
        let table: CoordinateTable = serde_json::from_str(raw).unwrap();
        assert_eq!(table.get("jp").unwrap().country, "Japan");
    }
}
