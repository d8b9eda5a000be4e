use serde::{Deserialize, Serialize};

/// One evaluated submission. Built once by the distance engine and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    pub country_code: String,
    pub distance_km: f64,
    /// Initial bearing from the guessed country toward the target, in [0, 360).
    pub bearing_degrees: f64,
    pub proximity_percent: u8,
}

