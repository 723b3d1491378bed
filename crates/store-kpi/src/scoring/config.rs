use super::domain::{KpiScore, ValidationError};
use super::rules::{safe_divide, DEFAULT_DAYS_PER_PERIOD};
use super::sanctions::SanctionPolicy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the three KPI scores fold into the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "snake_case",
    try_from = "OverallScorePolicyDocument"
)]
pub enum OverallScorePolicy {
    #[default]
    Average,
    /// Weighted mean, normalised by the weight sum so it stays on the 0–4 scale.
    Weighted {
        sales: f64,
        opex: f64,
        complaint_rate: f64,
    },
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum OverallScorePolicyDocument {
    Average,
    Weighted {
        sales: f64,
        opex: f64,
        complaint_rate: f64,
    },
}

impl TryFrom<OverallScorePolicyDocument> for OverallScorePolicy {
    type Error = ValidationError;

    fn try_from(document: OverallScorePolicyDocument) -> Result<Self, Self::Error> {
        match document {
            OverallScorePolicyDocument::Average => Ok(Self::Average),
            OverallScorePolicyDocument::Weighted {
                sales,
                opex,
                complaint_rate,
            } => Self::weighted(sales, opex, complaint_rate),
        }
    }
}

impl OverallScorePolicy {
    pub fn weighted(sales: f64, opex: f64, complaint_rate: f64) -> Result<Self, ValidationError> {
        let weights = [sales, opex, complaint_rate];
        let valid = weights
            .iter()
            .all(|weight| weight.is_finite() && *weight >= 0.0);
        if !valid || weights.iter().sum::<f64>() <= 0.0 {
            return Err(ValidationError::InvalidOverallWeights);
        }

        Ok(Self::Weighted {
            sales,
            opex,
            complaint_rate,
        })
    }

    pub fn combine(&self, sales: KpiScore, opex: KpiScore, complaint_rate: KpiScore) -> KpiScore {
        let weights = match *self {
            Self::Average => [1.0, 1.0, 1.0],
            Self::Weighted {
                sales,
                opex,
                complaint_rate,
            } => [sales, opex, complaint_rate],
        };
        let scores = [sales.value(), opex.value(), complaint_rate.value()];

        let weighted_sum: f64 = weights
            .iter()
            .zip(scores)
            .map(|(weight, score)| weight * score)
            .sum();

        match safe_divide(weighted_sum, weights.iter().sum()) {
            Some(score) => KpiScore::new(score),
            None => KpiScore::ZERO,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Average => "average".to_string(),
            Self::Weighted {
                sales,
                opex,
                complaint_rate,
            } => format!("weighted:{sales},{opex},{complaint_rate}"),
        }
    }
}

impl FromStr for OverallScorePolicy {
    type Err = ValidationError;

    /// Accepts `average` or `weighted:<sales>,<opex>,<complaint_rate>`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("average") {
            return Ok(Self::Average);
        }

        let weights = trimmed
            .strip_prefix("weighted:")
            .ok_or(ValidationError::InvalidOverallWeights)?;
        let parsed = weights
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ValidationError::InvalidOverallWeights)?;

        match parsed.as_slice() {
            [sales, opex, complaint_rate] => Self::weighted(*sales, *opex, *complaint_rate),
            _ => Err(ValidationError::InvalidOverallWeights),
        }
    }
}

/// Rubric configuration shared by every evaluation in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScoringConfigDocument")]
pub struct ScoringConfig {
    pub days_per_period: u32,
    pub overall_policy: OverallScorePolicy,
    pub sanction_policy: SanctionPolicy,
}

#[derive(Deserialize)]
struct ScoringConfigDocument {
    #[serde(default = "default_days_per_period")]
    days_per_period: u32,
    #[serde(default)]
    overall_policy: OverallScorePolicy,
    #[serde(default)]
    sanction_policy: SanctionPolicy,
}

fn default_days_per_period() -> u32 {
    DEFAULT_DAYS_PER_PERIOD
}

impl TryFrom<ScoringConfigDocument> for ScoringConfig {
    type Error = ValidationError;

    fn try_from(document: ScoringConfigDocument) -> Result<Self, Self::Error> {
        if document.days_per_period == 0 {
            return Err(ValidationError::InvalidDaysPerPeriod(0));
        }

        Ok(Self {
            days_per_period: document.days_per_period,
            overall_policy: document.overall_policy,
            sanction_policy: document.sanction_policy,
        })
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            days_per_period: DEFAULT_DAYS_PER_PERIOD,
            overall_policy: OverallScorePolicy::Average,
            sanction_policy: SanctionPolicy::default(),
        }
    }
}
