//! The static, ordered list of countries the game draws targets from.
//!
//! The order of the records is part of the daily puzzle: the daily target is
//! picked by position, so a deployed catalog must never be reordered or
//! resized once a day has been played.

use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;

use crate::models::CountryRecord;

const BUILTIN_COUNTRIES: &str = include_str!("../../data/countries.json");

#[derive(Debug, Clone)]
pub struct CountryCatalog {
    countries: Vec<CountryRecord>,
    by_code: HashMap<String, usize>,
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

impl CountryCatalog {
    pub fn new(countries: Vec<CountryRecord>) -> Result<Self> {
        if countries.is_empty() {
            return Err(anyhow!("Country catalog is empty"));
        }

        let mut normalized = Vec::with_capacity(countries.len());
        let mut by_code = HashMap::with_capacity(countries.len());
        for (idx, mut country) in countries.into_iter().enumerate() {
            country.code = normalize_code(&country.code);
            if country.code.is_empty() {
                return Err(anyhow!("Country '{}' has an empty code", country.name));
            }
            if by_code.insert(country.code.clone(), idx).is_some() {
                return Err(anyhow!("Duplicate country code: {}", country.code));
            }
            normalized.push(country);
        }

        Ok(Self {
            countries: normalized,
            by_code,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let countries: Vec<CountryRecord> =
            serde_json::from_str(json).context("Parsing country catalog")?;
        Self::new(countries)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_COUNTRIES)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn all(&self) -> &[CountryRecord] {
        &self.countries
    }

    pub fn at(&self, index: usize) -> Option<&CountryRecord> {
        self.countries.get(index)
    }

    /// Case-insensitive lookup by ISO code.
    pub fn get(&self, code: &str) -> Option<&CountryRecord> {
        self.by_code
            .get(&normalize_code(code))
            .map(|&idx| &self.countries[idx])
    }

    /// Looks a country up by code first, then by its English name.
    pub fn resolve(&self, query: &str) -> Option<&CountryRecord> {
        self.get(query).or_else(|| {
            let query = query.trim().to_lowercase();
            self.countries
                .iter()
                .find(|c| c.name.to_lowercase() == query)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CountryCatalog {
        CountryCatalog::new(vec![
            CountryRecord::new("fr", "France", 46.2, 2.2),
            CountryRecord::new("US", "United States", 39.8, -98.6),
        ])
        .unwrap()
    }

    #[test]
    fn codes_are_normalized_and_looked_up_case_insensitively() {
        let catalog = sample();
        assert_eq!(catalog.at(0).unwrap().code, "FR");
        assert_eq!(catalog.get("fr").unwrap().name, "France");
        assert_eq!(catalog.get(" us ").unwrap().code, "US");
        assert!(catalog.get("DE").is_none());
    }

    #[test]
    fn resolve_falls_back_to_name() {
        let catalog = sample();
        assert_eq!(catalog.resolve("united states").unwrap().code, "US");
        assert!(catalog.resolve("Atlantis").is_none());
    }

    #[test]
    fn rejects_empty_and_duplicate_catalogs() {
        assert!(CountryCatalog::new(vec![]).is_err());
        let dup = CountryCatalog::new(vec![
            CountryRecord::new("FR", "France", 46.2, 2.2),
            CountryRecord::new("fr", "France again", 46.2, 2.2),
        ]);
        assert!(dup.is_err());
    }

    #[test]
    fn builtin_dataset_loads() {
        let catalog = CountryCatalog::builtin().unwrap();
        assert!(catalog.len() > 50);
        assert!(catalog.get("FR").is_some());
        assert!(catalog.get("US").is_some());
    }
}
