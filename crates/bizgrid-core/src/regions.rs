//! Region reference data: curated search-origin cities per US state.
//!
//! High-coverage states carry a multi-city list; every other state (and DC)
//! falls back to a single representative city. An optional YAML file can
//! override or extend the curated table per deployment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{GeographyMode, Location, SearchJobConfig};
use crate::ConfigError;

/// A curated search origin. Coordinates are the city center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CuratedCity {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl CuratedCity {
    fn to_location(self) -> Location {
        Location {
            name: self.name.to_owned(),
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Two-letter code → full state name, all 50 states plus DC.
const STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
];

const TX_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Houston", lat: 29.7604, lng: -95.3698 },
    CuratedCity { name: "San Antonio", lat: 29.4241, lng: -98.4936 },
    CuratedCity { name: "Dallas", lat: 32.7767, lng: -96.7970 },
    CuratedCity { name: "Austin", lat: 30.2672, lng: -97.7431 },
    CuratedCity { name: "Fort Worth", lat: 32.7555, lng: -97.3308 },
    CuratedCity { name: "El Paso", lat: 31.7619, lng: -106.4850 },
    CuratedCity { name: "Arlington", lat: 32.7357, lng: -97.1081 },
    CuratedCity { name: "Corpus Christi", lat: 27.8006, lng: -97.3964 },
    CuratedCity { name: "Plano", lat: 33.0198, lng: -96.6989 },
    CuratedCity { name: "Lubbock", lat: 33.5779, lng: -101.8552 },
];

const CA_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Los Angeles", lat: 34.0522, lng: -118.2437 },
    CuratedCity { name: "San Diego", lat: 32.7157, lng: -117.1611 },
    CuratedCity { name: "San Jose", lat: 37.3382, lng: -121.8863 },
    CuratedCity { name: "San Francisco", lat: 37.7749, lng: -122.4194 },
    CuratedCity { name: "Fresno", lat: 36.7378, lng: -119.7871 },
    CuratedCity { name: "Sacramento", lat: 38.5816, lng: -121.4944 },
    CuratedCity { name: "Oakland", lat: 37.8044, lng: -122.2712 },
];

const FL_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Miami", lat: 25.7617, lng: -80.1918 },
    CuratedCity { name: "Orlando", lat: 28.5383, lng: -81.3792 },
    CuratedCity { name: "Tampa", lat: 27.9506, lng: -82.4572 },
    CuratedCity { name: "Jacksonville", lat: 30.3322, lng: -81.6557 },
    CuratedCity { name: "Fort Lauderdale", lat: 26.1224, lng: -80.1373 },
];

const NY_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "New York City", lat: 40.7128, lng: -74.0060 },
    CuratedCity { name: "Buffalo", lat: 42.8864, lng: -78.8784 },
    CuratedCity { name: "Rochester", lat: 43.1566, lng: -77.6088 },
    CuratedCity { name: "Albany", lat: 42.6526, lng: -73.7562 },
];

const GA_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Atlanta", lat: 33.7490, lng: -84.3880 },
    CuratedCity { name: "Savannah", lat: 32.0809, lng: -81.0912 },
    CuratedCity { name: "Augusta", lat: 33.4735, lng: -82.0105 },
];

const NC_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Charlotte", lat: 35.2271, lng: -80.8431 },
    CuratedCity { name: "Raleigh", lat: 35.7796, lng: -78.6382 },
    CuratedCity { name: "Greensboro", lat: 36.0726, lng: -79.7920 },
];

const AZ_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Phoenix", lat: 33.4484, lng: -112.0740 },
    CuratedCity { name: "Tucson", lat: 32.2226, lng: -110.9747 },
    CuratedCity { name: "Mesa", lat: 33.4152, lng: -111.8315 },
];

const IL_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Chicago", lat: 41.8781, lng: -87.6298 },
    CuratedCity { name: "Aurora", lat: 41.7606, lng: -88.3201 },
    CuratedCity { name: "Rockford", lat: 42.2711, lng: -89.0940 },
];

const PA_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Philadelphia", lat: 39.9526, lng: -75.1652 },
    CuratedCity { name: "Pittsburgh", lat: 40.4406, lng: -79.9959 },
];

const OH_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Columbus", lat: 39.9612, lng: -82.9988 },
    CuratedCity { name: "Cleveland", lat: 41.4993, lng: -81.6944 },
    CuratedCity { name: "Cincinnati", lat: 39.1031, lng: -84.5120 },
];

const CO_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Denver", lat: 39.7392, lng: -104.9903 },
    CuratedCity { name: "Colorado Springs", lat: 38.8339, lng: -104.8214 },
];

const WA_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Seattle", lat: 47.6062, lng: -122.3321 },
    CuratedCity { name: "Spokane", lat: 47.6588, lng: -117.4260 },
];

const TN_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Nashville", lat: 36.1627, lng: -86.7816 },
    CuratedCity { name: "Memphis", lat: 35.1495, lng: -90.0490 },
];

const NV_CITIES: &[CuratedCity] = &[
    CuratedCity { name: "Las Vegas", lat: 36.1699, lng: -115.1398 },
    CuratedCity { name: "Reno", lat: 39.5296, lng: -119.8138 },
];

/// Single representative city for states without a curated multi-city list.
const FALLBACK_CITIES: &[(&str, CuratedCity)] = &[
    ("AL", CuratedCity { name: "Birmingham", lat: 33.5207, lng: -86.8025 }),
    ("AK", CuratedCity { name: "Anchorage", lat: 61.2181, lng: -149.9003 }),
    ("AR", CuratedCity { name: "Little Rock", lat: 34.7465, lng: -92.2896 }),
    ("CT", CuratedCity { name: "Hartford", lat: 41.7658, lng: -72.6734 }),
    ("DE", CuratedCity { name: "Wilmington", lat: 39.7391, lng: -75.5398 }),
    ("HI", CuratedCity { name: "Honolulu", lat: 21.3069, lng: -157.8583 }),
    ("ID", CuratedCity { name: "Boise", lat: 43.6150, lng: -116.2023 }),
    ("IN", CuratedCity { name: "Indianapolis", lat: 39.7684, lng: -86.1581 }),
    ("IA", CuratedCity { name: "Des Moines", lat: 41.5868, lng: -93.6250 }),
    ("KS", CuratedCity { name: "Wichita", lat: 37.6872, lng: -97.3301 }),
    ("KY", CuratedCity { name: "Louisville", lat: 38.2527, lng: -85.7585 }),
    ("LA", CuratedCity { name: "New Orleans", lat: 29.9511, lng: -90.0715 }),
    ("ME", CuratedCity { name: "Portland", lat: 43.6591, lng: -70.2568 }),
    ("MD", CuratedCity { name: "Baltimore", lat: 39.2904, lng: -76.6122 }),
    ("MA", CuratedCity { name: "Boston", lat: 42.3601, lng: -71.0589 }),
    ("MI", CuratedCity { name: "Detroit", lat: 42.3314, lng: -83.0458 }),
    ("MN", CuratedCity { name: "Minneapolis", lat: 44.9778, lng: -93.2650 }),
    ("MS", CuratedCity { name: "Jackson", lat: 32.2988, lng: -90.1848 }),
    ("MO", CuratedCity { name: "Kansas City", lat: 39.0997, lng: -94.5786 }),
    ("MT", CuratedCity { name: "Billings", lat: 45.7833, lng: -108.5007 }),
    ("NE", CuratedCity { name: "Omaha", lat: 41.2565, lng: -95.9345 }),
    ("NH", CuratedCity { name: "Manchester", lat: 42.9956, lng: -71.4548 }),
    ("NJ", CuratedCity { name: "Newark", lat: 40.7357, lng: -74.1724 }),
    ("NM", CuratedCity { name: "Albuquerque", lat: 35.0844, lng: -106.6504 }),
    ("ND", CuratedCity { name: "Fargo", lat: 46.8772, lng: -96.7898 }),
    ("OK", CuratedCity { name: "Oklahoma City", lat: 35.4676, lng: -97.5164 }),
    ("OR", CuratedCity { name: "Portland", lat: 45.5152, lng: -122.6784 }),
    ("RI", CuratedCity { name: "Providence", lat: 41.8240, lng: -71.4128 }),
    ("SC", CuratedCity { name: "Charleston", lat: 32.7765, lng: -79.9311 }),
    ("SD", CuratedCity { name: "Sioux Falls", lat: 43.5446, lng: -96.7311 }),
    ("UT", CuratedCity { name: "Salt Lake City", lat: 40.7608, lng: -111.8910 }),
    ("VT", CuratedCity { name: "Burlington", lat: 44.4759, lng: -73.2121 }),
    ("VA", CuratedCity { name: "Virginia Beach", lat: 36.8529, lng: -75.9780 }),
    ("WV", CuratedCity { name: "Charleston", lat: 38.3498, lng: -81.6326 }),
    ("WI", CuratedCity { name: "Milwaukee", lat: 43.0389, lng: -87.9065 }),
    ("WY", CuratedCity { name: "Cheyenne", lat: 41.1400, lng: -104.8202 }),
    ("DC", CuratedCity { name: "Washington", lat: 38.9072, lng: -77.0369 }),
];

/// Full state name for a two-letter code, case-insensitive.
#[must_use]
pub fn state_name(code: &str) -> Option<&'static str> {
    let upper = code.to_ascii_uppercase();
    STATES
        .iter()
        .find(|(c, _)| *c == upper)
        .map(|(_, name)| *name)
}

/// All supported `(code, name)` pairs, sorted by state name.
#[must_use]
pub fn all_states() -> Vec<(&'static str, &'static str)> {
    let mut states: Vec<_> = STATES.to_vec();
    states.sort_by_key(|(_, name)| *name);
    states
}

/// The curated multi-city list for a state, if one exists.
#[must_use]
pub fn curated_cities(code: &str) -> Option<&'static [CuratedCity]> {
    match code.to_ascii_uppercase().as_str() {
        "TX" => Some(TX_CITIES),
        "CA" => Some(CA_CITIES),
        "FL" => Some(FL_CITIES),
        "NY" => Some(NY_CITIES),
        "GA" => Some(GA_CITIES),
        "NC" => Some(NC_CITIES),
        "AZ" => Some(AZ_CITIES),
        "IL" => Some(IL_CITIES),
        "PA" => Some(PA_CITIES),
        "OH" => Some(OH_CITIES),
        "CO" => Some(CO_CITIES),
        "WA" => Some(WA_CITIES),
        "TN" => Some(TN_CITIES),
        "NV" => Some(NV_CITIES),
        _ => None,
    }
}

/// The search origins for a state: curated list first, then the single-city
/// fallback, then empty for unknown codes.
#[must_use]
pub fn cities_for_state(code: &str) -> Vec<Location> {
    if let Some(curated) = curated_cities(code) {
        return curated.iter().map(|c| c.to_location()).collect();
    }

    let upper = code.to_ascii_uppercase();
    FALLBACK_CITIES
        .iter()
        .find(|(c, _)| *c == upper)
        .map(|(_, city)| vec![city.to_location()])
        .unwrap_or_default()
}

/// Deployment override for the curated table, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionsFile {
    pub regions: Vec<RegionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionEntry {
    pub state: String,
    pub cities: Vec<Location>,
}

impl RegionsFile {
    /// The override city list for a state, if the file defines one.
    #[must_use]
    pub fn cities_for_state(&self, code: &str) -> Option<&[RegionEntryCity]> {
        let upper = code.to_ascii_uppercase();
        self.regions
            .iter()
            .find(|r| r.state.eq_ignore_ascii_case(&upper))
            .map(|r| r.cities.as_slice())
    }
}

/// Alias kept for readability at call sites; override entries reuse the
/// domain `Location` shape.
pub type RegionEntryCity = Location;

/// Loads and validates a regions override file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation (bad state codes, empty city lists, out-of-range coordinates).
pub fn load_regions(path: &Path) -> Result<RegionsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RegionsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let regions_file: RegionsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::RegionsFileParse)?;

    validate_regions(&regions_file)?;

    Ok(regions_file)
}

fn validate_regions(regions_file: &RegionsFile) -> Result<(), ConfigError> {
    let mut seen = std::collections::HashSet::new();

    for region in &regions_file.regions {
        let code = region.state.to_ascii_uppercase();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Validation(format!(
                "region code '{}' must be two letters",
                region.state
            )));
        }
        if !seen.insert(code.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate region entry for '{code}'"
            )));
        }
        if region.cities.is_empty() {
            return Err(ConfigError::Validation(format!(
                "region '{code}' has no cities"
            )));
        }
        for city in &region.cities {
            if city.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "region '{code}' has a city with an empty name"
                )));
            }
            if !(-90.0..=90.0).contains(&city.lat) || !(-180.0..=180.0).contains(&city.lng) {
                return Err(ConfigError::Validation(format!(
                    "city '{}' in region '{code}' has out-of-range coordinates",
                    city.name
                )));
            }
        }
    }

    Ok(())
}

/// Resolves the ordered location list for a job.
///
/// Explicit cities (City mode) win; otherwise the override file, then the
/// curated/fallback tables. An empty result means the job cannot run and
/// should stop with "No cities configured".
#[must_use]
pub fn resolve_locations(
    config: &SearchJobConfig,
    overrides: Option<&RegionsFile>,
) -> Vec<Location> {
    if config.geography_mode == GeographyMode::City {
        if let Some(cities) = &config.cities {
            if !cities.is_empty() {
                return cities.clone();
            }
        }
    }

    if let Some(file) = overrides {
        if let Some(cities) = file.cities_for_state(&config.state) {
            return cities.to_vec();
        }
    }

    cities_for_state(&config.state)
}
