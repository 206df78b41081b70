//! Data-quality model
//!
//! Five independent quality dimensions, each rated 1 (worst) to 5 (best).
//! Every rating maps to a multiplicative imprecision coefficient; rating 5 is
//! always exactly 1.0 (no added imprecision).

use crate::error::Error;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Quality dimension of an emission source or emission factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityDimension {
    Reliability,
    TechnicalRepresentativeness,
    GeographicRepresentativeness,
    TemporalRepresentativeness,
    Completeness,
}

/// Lowest valid rating
pub const MIN_RATING: u8 = 1;
/// Highest valid rating
pub const MAX_RATING: u8 = 5;

const RELIABILITY: [f64; 5] = [1.5, 1.2, 1.1, 1.05, 1.0];
const TECHNICAL_REPRESENTATIVENESS: [f64; 5] = [2.0, 1.5, 1.2, 1.1, 1.0];
const GEOGRAPHIC_REPRESENTATIVENESS: [f64; 5] = [1.1, 1.05, 1.02, 1.01, 1.0];
const TEMPORAL_REPRESENTATIVENESS: [f64; 5] = [1.5, 1.2, 1.1, 1.03, 1.0];
const COMPLETENESS: [f64; 5] = [1.2, 1.1, 1.05, 1.02, 1.0];

impl QualityDimension {
    /// Coefficients indexed by rating - 1
    pub fn coefficients(&self) -> &'static [f64; 5] {
        match self {
            QualityDimension::Reliability => &RELIABILITY,
            QualityDimension::TechnicalRepresentativeness => &TECHNICAL_REPRESENTATIVENESS,
            QualityDimension::GeographicRepresentativeness => &GEOGRAPHIC_REPRESENTATIVENESS,
            QualityDimension::TemporalRepresentativeness => &TEMPORAL_REPRESENTATIVENESS,
            QualityDimension::Completeness => &COMPLETENESS,
        }
    }

    /// Imprecision coefficient for a raw rating
    ///
    /// Returns `None` for ratings that are absent, NaN, fractional or outside
    /// 1..=5. Such ratings contribute no imprecision rather than a penalty.
    pub fn coefficient(&self, rating: Option<f64>) -> Option<f64> {
        let index = valid_rating(rating?)? - MIN_RATING;
        Some(self.coefficients()[index as usize])
    }

    /// Snake-case identifier
    pub fn key(&self) -> &'static str {
        match self {
            QualityDimension::Reliability => "reliability",
            QualityDimension::TechnicalRepresentativeness => "technical_representativeness",
            QualityDimension::GeographicRepresentativeness => "geographic_representativeness",
            QualityDimension::TemporalRepresentativeness => "temporal_representativeness",
            QualityDimension::Completeness => "completeness",
        }
    }

    pub fn all_variants() -> &'static [QualityDimension] {
        &[
            QualityDimension::Reliability,
            QualityDimension::TechnicalRepresentativeness,
            QualityDimension::GeographicRepresentativeness,
            QualityDimension::TemporalRepresentativeness,
            QualityDimension::Completeness,
        ]
    }
}

impl std::fmt::Display for QualityDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for QualityDimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "technical_representativeness", "technicalRepresentativeness" and
        // "technical-representativeness" all name the same dimension
        let wanted: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_') && !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        QualityDimension::all_variants()
            .iter()
            .copied()
            .find(|d| d.key().replace('_', "") == wanted)
            .ok_or_else(|| Error::UnknownQualityDimension(s.to_string()))
    }
}

/// Integer rating in 1..=5, or `None` if `raw` is not one
pub fn valid_rating(raw: f64) -> Option<u8> {
    if raw.is_finite() && raw.fract() == 0.0 && (MIN_RATING as f64..=MAX_RATING as f64).contains(&raw) {
        Some(raw as u8)
    } else {
        None
    }
}

/// Raw quality ratings along the five dimensions
///
/// Ratings are kept as recorded (`f64`) so invalid values coming from the
/// persistence layer can be carried and then ignored during calculation.
/// A rating that is not a number at all is read as absent; a key that names
/// no quality dimension fails the decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityRatings {
    pub reliability: Option<f64>,
    pub technical_representativeness: Option<f64>,
    pub geographic_representativeness: Option<f64>,
    pub temporal_representativeness: Option<f64>,
    pub completeness: Option<f64>,
}

impl QualityRatings {
    /// Every dimension set to the same rating
    pub fn uniform(rating: u8) -> Self {
        let r = Some(rating as f64);
        Self {
            reliability: r,
            technical_representativeness: r,
            geographic_representativeness: r,
            temporal_representativeness: r,
            completeness: r,
        }
    }

    pub fn get(&self, dimension: QualityDimension) -> Option<f64> {
        match dimension {
            QualityDimension::Reliability => self.reliability,
            QualityDimension::TechnicalRepresentativeness => self.technical_representativeness,
            QualityDimension::GeographicRepresentativeness => self.geographic_representativeness,
            QualityDimension::TemporalRepresentativeness => self.temporal_representativeness,
            QualityDimension::Completeness => self.completeness,
        }
    }

    /// Builder-style setter
    pub fn with(mut self, dimension: QualityDimension, rating: f64) -> Self {
        let slot = match dimension {
            QualityDimension::Reliability => &mut self.reliability,
            QualityDimension::TechnicalRepresentativeness => &mut self.technical_representativeness,
            QualityDimension::GeographicRepresentativeness => &mut self.geographic_representativeness,
            QualityDimension::TemporalRepresentativeness => &mut self.temporal_representativeness,
            QualityDimension::Completeness => &mut self.completeness,
        };
        *slot = Some(rating);
        self
    }

    /// True when no dimension carries a valid rating
    pub fn is_empty(&self) -> bool {
        QualityDimension::all_variants()
            .iter()
            .all(|d| d.coefficient(self.get(*d)).is_none())
    }
}

impl<'de> Deserialize<'de> for QualityRatings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut ratings = QualityRatings::default();
        for (key, value) in raw {
            let dimension: QualityDimension = key.parse().map_err(de::Error::custom)?;
            if let Some(rating) = value.as_f64() {
                ratings = ratings.with(dimension, rating);
            }
        }
        Ok(ratings)
    }
}
