use super::domain::ValidationError;
use serde::{Deserialize, Serialize};

/// Weight neutral to complaint volume, applied to channels missing from config.
pub const NEUTRAL_COMPLAINT_WEIGHT: f64 = 1.0;

/// Severity multiplier configured for a complaint channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintWeight {
    pub channel: String,
    pub weight: f64,
}

impl ComplaintWeight {
    pub fn new(channel: impl Into<String>, weight: f64) -> Self {
        Self {
            channel: channel.into(),
            weight,
        }
    }
}

/// Resolves `channel` against `weights` ignoring case; the first match wins.
pub fn resolve_weight(channel: &str, weights: &[ComplaintWeight], default_weight: f64) -> f64 {
    let needle = channel.to_lowercase();
    weights
        .iter()
        .find(|entry| entry.channel.to_lowercase() == needle)
        .map(|entry| entry.weight)
        .unwrap_or(default_weight)
}

/// Weight configuration loaded once per evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WeightTableDocument")]
pub struct WeightTable {
    weights: Vec<ComplaintWeight>,
    default_weight: f64,
}

#[derive(Deserialize)]
struct WeightTableDocument {
    #[serde(default)]
    weights: Vec<ComplaintWeight>,
    #[serde(default = "neutral_weight")]
    default_weight: f64,
}

fn neutral_weight() -> f64 {
    NEUTRAL_COMPLAINT_WEIGHT
}

impl TryFrom<WeightTableDocument> for WeightTable {
    type Error = ValidationError;

    fn try_from(document: WeightTableDocument) -> Result<Self, Self::Error> {
        Self::new(document.weights, document.default_weight)
    }
}

impl WeightTable {
    pub fn new(
        weights: Vec<ComplaintWeight>,
        default_weight: f64,
    ) -> Result<Self, ValidationError> {
        check_weight("<default>", default_weight)?;
        for entry in &weights {
            check_weight(&entry.channel, entry.weight)?;
        }

        Ok(Self {
            weights,
            default_weight,
        })
    }

    pub fn with_neutral_default(weights: Vec<ComplaintWeight>) -> Result<Self, ValidationError> {
        Self::new(weights, NEUTRAL_COMPLAINT_WEIGHT)
    }

    pub fn resolve(&self, channel: &str) -> f64 {
        resolve_weight(channel, &self.weights, self.default_weight)
    }

    pub fn weights(&self) -> &[ComplaintWeight] {
        &self.weights
    }

    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }

    /// Same default weight, different channel entries.
    pub fn with_weights(&self, weights: Vec<ComplaintWeight>) -> Result<Self, ValidationError> {
        Self::new(weights, self.default_weight)
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            weights: Vec::new(),
            default_weight: NEUTRAL_COMPLAINT_WEIGHT,
        }
    }
}

fn check_weight(channel: &str, weight: f64) -> Result<(), ValidationError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidWeight {
            channel: channel.to_string(),
            weight,
        })
    }
}
