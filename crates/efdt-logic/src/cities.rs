//! Reference city table.
//!
//! Static records looked up by exact name; never mutated.

use serde::Serialize;

use crate::error::AnalysisError;

/// A city that analyses can be run for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub population: u64,
}

const fn city(name: &'static str, latitude: f64, longitude: f64, population: u64) -> City {
    City {
        name,
        latitude,
        longitude,
        population,
    }
}

/// All supported cities.
pub const CITIES: &[City] = &[
    city("Mumbai", 19.076, 72.8777, 20_411_000),
    city("Delhi", 28.6139, 77.209, 30_291_000),
    city("Bangalore", 12.9716, 77.5946, 12_326_000),
    city("Hyderabad", 17.385, 78.4867, 10_004_000),
    city("Chennai", 13.0827, 80.2707, 10_971_000),
    city("Kolkata", 22.5726, 88.3639, 14_850_000),
    city("Pune", 18.5204, 73.8567, 6_430_000),
    city("Ahmedabad", 23.0225, 72.5714, 8_059_000),
    city("Jaipur", 26.9124, 75.7873, 3_046_000),
    city("Surat", 21.1702, 72.8311, 6_081_000),
    city("Lucknow", 26.8467, 80.9462, 3_382_000),
    city("Kanpur", 26.4499, 80.3319, 2_920_000),
    city("Nagpur", 21.1458, 79.0882, 2_497_000),
    city("Indore", 22.7196, 75.8577, 2_201_000),
    city("Thane", 19.2183, 72.9781, 1_841_000),
    city("Bhopal", 23.2599, 77.4126, 1_883_000),
    city("Visakhapatnam", 17.6868, 83.2185, 2_035_000),
    city("Patna", 25.5941, 85.1376, 2_049_000),
    city("Vadodara", 22.3072, 73.1812, 1_817_000),
    city("Ghaziabad", 28.6692, 77.4538, 1_729_000),
];

/// Look up a city by exact name.
pub fn city_by_name(name: &str) -> Result<&'static City, AnalysisError> {
    CITIES
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| AnalysisError::UnknownCity(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_size() {
        assert_eq!(CITIES.len(), 20);
    }

    #[test]
    fn test_names_unique() {
        let names: std::collections::HashSet<_> = CITIES.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), CITIES.len());
    }

    #[test]
    fn test_lookup_known() {
        let mumbai = city_by_name("Mumbai").unwrap();
        assert_eq!(mumbai.population, 20_411_000);
        assert!((mumbai.latitude - 19.076).abs() < 1e-9);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(matches!(
            city_by_name("mumbai"),
            Err(AnalysisError::UnknownCity(name)) if name == "mumbai"
        ));
        assert!(city_by_name("").is_err());
    }

    #[test]
    fn test_names_long_enough_for_site_ids() {
        assert!(CITIES.iter().all(|c| c.name.chars().count() >= 3));
    }
}
