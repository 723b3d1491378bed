//! Store KPI scoring: complaint weighting, the three 0–4 KPI scorers, sanction
//! classification and per-store evaluation assembly.
//!
//! Everything below the engine is a pure function of its inputs. The engine
//! only bundles the run-wide weight table and rubric so callers can share one
//! instance across threads.

mod aggregate;
mod config;
pub mod domain;
pub mod import;
mod report;
pub mod router;
pub mod rules;
mod sanctions;
mod weights;

#[cfg(test)]
mod tests;

pub use aggregate::{channel_breakdown, weighted_complaints, ChannelContribution};
pub use config::{OverallScorePolicy, ScoringConfig};
pub use domain::{
    ActiveSanction, ComplaintChannel, KpiScore, MonthYear, RawComplaintRow, RawFinanceRow,
    SanctionTone, SanctionType, Store, StoreId, StoreTargets, ValidationError, ViolationRecord,
};
pub use import::ImportError;
pub use report::{
    assemble_evaluation, EvaluationInput, EvaluationOutcome, KpiMetric, KpiScorecard,
    MissingInput, ScoreComponent, StoreEvaluation,
};
pub use router::evaluation_router;
pub use rules::{complaint_rate_kpi, opex_kpi, sales_kpi};
pub use sanctions::{
    active_in_period, classify_violations, SanctionEntry, SanctionListing, SanctionPolicy,
    SanctionTier, DEFAULT_LOOKBACK_MONTHS,
};
pub use weights::{resolve_weight, ComplaintWeight, WeightTable, NEUTRAL_COMPLAINT_WEIGHT};

use tracing::{debug, warn};

/// Evaluation in a batch rejected by input validation.
#[derive(Debug, thiserror::Error)]
#[error("evaluation #{index} for store {store_id} ({period}) rejected: {source}")]
pub struct EvaluationError {
    pub index: usize,
    pub store_id: StoreId,
    pub period: MonthYear,
    #[source]
    pub source: ValidationError,
}

/// Stateless evaluator applying one weight table and rubric to many stores.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
    weights: WeightTable,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig, weights: WeightTable) -> Self {
        Self { config, weights }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn evaluate(&self, input: &EvaluationInput) -> Result<StoreEvaluation, ValidationError> {
        self.evaluate_with(input, &self.weights)
    }

    /// Evaluates against a caller-supplied weight table instead of the configured one.
    pub fn evaluate_with(
        &self,
        input: &EvaluationInput,
        weights: &WeightTable,
    ) -> Result<StoreEvaluation, ValidationError> {
        let evaluation = assemble_evaluation(input, weights, &self.config)?;

        match &evaluation.outcome {
            EvaluationOutcome::Scored(scorecard) => debug!(
                store = %input.store.id,
                period = %input.period,
                overall = scorecard.overall.value(),
                weighted_complaints = scorecard.weighted_complaints,
                "store evaluated"
            ),
            EvaluationOutcome::NoData { missing } => warn!(
                store = %input.store.id,
                period = %input.period,
                ?missing,
                "no data for period"
            ),
        }

        Ok(evaluation)
    }

    /// Evaluates every input in order; the first invalid input aborts the batch.
    pub fn evaluate_batch(
        &self,
        inputs: &[EvaluationInput],
        weights: Option<&WeightTable>,
    ) -> Result<Vec<StoreEvaluation>, EvaluationError> {
        let weights = weights.unwrap_or(&self.weights);
        inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                self.evaluate_with(input, weights)
                    .map_err(|source| EvaluationError {
                        index,
                        store_id: input.store.id.clone(),
                        period: input.period,
                        source,
                    })
            })
            .collect()
    }
}
