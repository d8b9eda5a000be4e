use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl CountryRecord {
    pub fn new(code: &str, name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for CountryRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}
