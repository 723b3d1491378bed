use super::aggregate::{channel_breakdown, weighted_complaints, ChannelContribution};
use super::config::ScoringConfig;
use super::domain::{
    ActiveSanction, KpiScore, MonthYear, RawComplaintRow, RawFinanceRow, Store, StoreTargets,
    ValidationError, ViolationRecord,
};
use super::rules::{
    complaint_percentage, complaint_rate_score, opex_kpi, opex_percentage, sales_kpi,
};
use super::sanctions::{active_in_period, classify_violations, SanctionListing};
use super::weights::WeightTable;
use serde::{Deserialize, Serialize};

/// Everything known about one store for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub store: Store,
    pub period: MonthYear,
    #[serde(default)]
    pub complaints: Option<RawComplaintRow>,
    #[serde(default)]
    pub finance: Option<RawFinanceRow>,
    #[serde(default)]
    pub targets: Option<StoreTargets>,
    #[serde(default)]
    pub violations: Vec<ViolationRecord>,
    #[serde(default)]
    pub recorded_sanctions: Vec<ActiveSanction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiMetric {
    Sales,
    Opex,
    ComplaintRate,
}

impl KpiMetric {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sales => "Sales Attainment",
            Self::Opex => "OPEX Attainment",
            Self::ComplaintRate => "Complaint Rate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingInput {
    ComplaintRow,
    FinanceRow,
    Targets,
}

impl MissingInput {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ComplaintRow => "complaint counts",
            Self::FinanceRow => "finance figures",
            Self::Targets => "store targets",
        }
    }
}

/// Discrete contribution to an evaluation, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub metric: KpiMetric,
    pub metric_label: &'static str,
    pub score: KpiScore,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiScorecard {
    pub sales: KpiScore,
    pub opex: KpiScore,
    pub complaint_rate: KpiScore,
    pub overall: KpiScore,
    pub overall_policy: String,
    pub weighted_complaints: f64,
    pub complaint_percentage: Option<f64>,
    pub opex_percentage: Option<f64>,
    pub channels: Vec<ChannelContribution>,
    pub components: Vec<ScoreComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    Scored(KpiScorecard),
    NoData { missing: Vec<MissingInput> },
}

impl EvaluationOutcome {
    pub fn scorecard(&self) -> Option<&KpiScorecard> {
        match self {
            Self::Scored(scorecard) => Some(scorecard),
            Self::NoData { .. } => None,
        }
    }
}

/// Evaluation record handed to the reporting layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreEvaluation {
    pub store: Store,
    pub period: MonthYear,
    pub outcome: EvaluationOutcome,
    pub sanctions: SanctionListing,
}

impl StoreEvaluation {
    pub fn summary(&self) -> String {
        match &self.outcome {
            EvaluationOutcome::Scored(scorecard) => format!(
                "{} {}: overall {} (sales {}, opex {}, complaints {}); {}",
                self.store.name,
                self.period,
                scorecard.overall,
                scorecard.sales,
                scorecard.opex,
                scorecard.complaint_rate,
                self.sanctions.summary()
            ),
            EvaluationOutcome::NoData { missing } => format!(
                "{} {}: no data for this period (missing {}); {}",
                self.store.name,
                self.period,
                missing
                    .iter()
                    .map(|input| input.label())
                    .collect::<Vec<_>>()
                    .join(", "),
                self.sanctions.summary()
            ),
        }
    }
}

/// Composes aggregation, scoring and sanction classification for one store/period.
pub fn assemble_evaluation(
    input: &EvaluationInput,
    weights: &WeightTable,
    config: &ScoringConfig,
) -> Result<StoreEvaluation, ValidationError> {
    if let Some(finance) = &input.finance {
        finance.validate()?;
    }
    if let Some(targets) = &input.targets {
        targets.validate()?;
    }

    let mut sanctions = active_in_period(&input.recorded_sanctions, input.period);
    sanctions.extend(classify_violations(
        &input.store.id,
        input.period,
        &input.violations,
        &config.sanction_policy,
    ));

    let outcome = match (&input.complaints, &input.finance, &input.targets) {
        (Some(complaints), Some(finance), Some(targets)) => EvaluationOutcome::Scored(
            score_period(complaints, finance, targets, weights, config),
        ),
        (complaints, finance, targets) => {
            let mut missing = Vec::new();
            if complaints.is_none() {
                missing.push(MissingInput::ComplaintRow);
            }
            if finance.is_none() {
                missing.push(MissingInput::FinanceRow);
            }
            if targets.is_none() {
                missing.push(MissingInput::Targets);
            }
            EvaluationOutcome::NoData { missing }
        }
    };

    Ok(StoreEvaluation {
        store: input.store.clone(),
        period: input.period,
        outcome,
        sanctions: SanctionListing::from_sanctions(sanctions),
    })
}

fn score_period(
    complaints: &RawComplaintRow,
    finance: &RawFinanceRow,
    targets: &StoreTargets,
    weights: &WeightTable,
    config: &ScoringConfig,
) -> KpiScorecard {
    let total_weighted = weighted_complaints(complaints, weights);
    let complaint_pct = complaint_percentage(
        total_weighted,
        targets.avg_customer_units_per_day,
        config.days_per_period,
    );
    let opex_pct = opex_percentage(finance.total_sales, finance.total_opex);

    let sales = sales_kpi(finance.total_sales, targets.sales_target);
    let opex = opex_kpi(
        finance.total_sales,
        finance.total_opex,
        targets.opex_target_percentage,
    );
    let complaint_rate = complaint_pct
        .map(complaint_rate_score)
        .unwrap_or(KpiScore::ZERO);

    let components = vec![
        component(
            KpiMetric::Sales,
            sales,
            if targets.sales_target > 0.0 {
                format!(
                    "sales {:.2} against target {:.2}",
                    finance.total_sales, targets.sales_target
                )
            } else {
                "no sales target configured".to_string()
            },
        ),
        component(
            KpiMetric::Opex,
            opex,
            match opex_pct {
                Some(actual) if targets.opex_target_percentage > 0.0 => format!(
                    "opex {:.2}% of sales against target {:.2}%",
                    actual, targets.opex_target_percentage
                ),
                Some(_) => "no opex target configured".to_string(),
                None => "no sales recorded".to_string(),
            },
        ),
        component(
            KpiMetric::ComplaintRate,
            complaint_rate,
            match complaint_pct {
                Some(pct) => format!(
                    "{:.2} weighted complaints, {:.3}% of monthly customer units",
                    total_weighted, pct
                ),
                None => "no customer unit baseline".to_string(),
            },
        ),
    ];

    KpiScorecard {
        sales,
        opex,
        complaint_rate,
        overall: config.overall_policy.combine(sales, opex, complaint_rate),
        overall_policy: config.overall_policy.label(),
        weighted_complaints: total_weighted,
        complaint_percentage: complaint_pct,
        opex_percentage: opex_pct,
        channels: channel_breakdown(complaints, weights),
        components,
    }
}

fn component(metric: KpiMetric, score: KpiScore, notes: String) -> ScoreComponent {
    ScoreComponent {
        metric,
        metric_label: metric.label(),
        score,
        notes,
    }
}
