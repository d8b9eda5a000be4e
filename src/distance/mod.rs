//! Great-circle scoring of a guess against the target.

use serde::{Deserialize, Serialize};

use crate::config::DistanceUnit;
use crate::models::{CountryRecord, Guess};

pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Half the circumference of the sphere: the farthest two points can be apart.
pub const MAX_DISTANCE_KM: f64 = std::f64::consts::PI * EARTH_RADIUS_KM;
const KM_PER_MILE: f64 = 1.609344;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub distance_km: f64,
    pub bearing_degrees: f64,
    pub proximity_percent: u8,
}

pub fn evaluate(target: &CountryRecord, guessed: &CountryRecord) -> Evaluation {
    let distance_km = haversine_km(
        guessed.latitude,
        guessed.longitude,
        target.latitude,
        target.longitude,
    );
    let bearing_degrees = if distance_km == 0.0 {
        0.0
    } else {
        initial_bearing(
            guessed.latitude,
            guessed.longitude,
            target.latitude,
            target.longitude,
        )
    };

    Evaluation {
        distance_km,
        bearing_degrees,
        proximity_percent: proximity_percent(distance_km),
    }
}

/// Scores `guessed` and wraps the result as a [`Guess`].
pub fn score_guess(target: &CountryRecord, guessed: &CountryRecord) -> Guess {
    let eval = evaluate(target, guessed);
    Guess {
        country_code: guessed.code.clone(),
        distance_km: eval.distance_km,
        bearing_degrees: eval.bearing_degrees,
        proximity_percent: eval.proximity_percent,
    }
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodes.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Initial compass bearing from point 1 toward point 2, in [0, 360).
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let y = dlon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();
    let theta = y.atan2(x).to_degrees();
    if !theta.is_finite() {
        return 0.0;
    }
    let normalized = theta.rem_euclid(360.0);
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Squared falloff over the maximum distance, floored to a whole percent.
/// 100 only at distance zero, 0 at the antipode.
pub fn proximity_percent(distance_km: f64) -> u8 {
    if !distance_km.is_finite() || distance_km >= MAX_DISTANCE_KM {
        return 0;
    }
    let remaining = (MAX_DISTANCE_KM - distance_km.max(0.0)) / MAX_DISTANCE_KM;
    (remaining * remaining * 100.0).floor().clamp(0.0, 100.0) as u8
}

pub fn format_distance(distance_km: f64, unit: DistanceUnit) -> String {
    match unit {
        DistanceUnit::Km => format!("{}km", distance_km.round() as i64),
        DistanceUnit::Miles => format!("{}mi", (distance_km / KM_PER_MILE).round() as i64),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl Direction {
    const ORDER: [Direction; 16] = [
        Direction::N,
        Direction::NNE,
        Direction::NE,
        Direction::ENE,
        Direction::E,
        Direction::ESE,
        Direction::SE,
        Direction::SSE,
        Direction::S,
        Direction::SSW,
        Direction::SW,
        Direction::WSW,
        Direction::W,
        Direction::WNW,
        Direction::NW,
        Direction::NNW,
    ];

    pub fn from_bearing(bearing_degrees: f64) -> Self {
        let sector = ((bearing_degrees.rem_euclid(360.0) / 22.5).round() as usize) % 16;
        Self::ORDER[sector]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::N => "N",
            Direction::NNE => "NNE",
            Direction::NE => "NE",
            Direction::ENE => "ENE",
            Direction::E => "E",
            Direction::ESE => "ESE",
            Direction::SE => "SE",
            Direction::SSE => "SSE",
            Direction::S => "S",
            Direction::SSW => "SSW",
            Direction::SW => "SW",
            Direction::WSW => "WSW",
            Direction::W => "W",
            Direction::WNW => "WNW",
            Direction::NW => "NW",
            Direction::NNW => "NNW",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::N => "⬆️",
            Direction::NNE | Direction::NE | Direction::ENE => "↗️",
            Direction::E => "➡️",
            Direction::ESE | Direction::SE | Direction::SSE => "↘️",
            Direction::S => "⬇️",
            Direction::SSW | Direction::SW | Direction::WSW => "↙️",
            Direction::W => "⬅️",
            Direction::WNW | Direction::NW | Direction::NNW => "↖️",
        }
    }
}

/// Arrow shown next to a guess; a finish flag for the exact country.
pub fn direction_glyph(guess: &Guess) -> &'static str {
    if guess.distance_km == 0.0 {
        "🎉"
    } else {
        Direction::from_bearing(guess.bearing_degrees).arrow()
    }
}
