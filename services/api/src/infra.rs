use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use store_kpi::config::ScoringSettings;
use store_kpi::error::AppError;
use store_kpi::scoring::import::{sanction_policy_from_path, weight_table_from_path};
use store_kpi::scoring::{SanctionPolicy, ScoringConfig, ScoringEngine, WeightTable};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Table paths given on the command line win over the environment.
#[derive(Debug, Default)]
pub(crate) struct TableOverrides {
    pub(crate) weights_csv: Option<PathBuf>,
    pub(crate) sanction_policy_csv: Option<PathBuf>,
}

pub(crate) fn load_weight_table(
    settings: &ScoringSettings,
    overrides: &TableOverrides,
) -> Result<WeightTable, AppError> {
    let path = overrides
        .weights_csv
        .as_ref()
        .or(settings.weights_csv.as_ref());

    match path {
        Some(path) => {
            let table = weight_table_from_path(path, settings.default_complaint_weight)?;
            info!(path = %path.display(), channels = table.weights().len(), "complaint weights loaded");
            Ok(table)
        }
        None => Ok(WeightTable::new(
            Vec::new(),
            settings.default_complaint_weight,
        )?),
    }
}

pub(crate) fn load_sanction_policy(
    settings: &ScoringSettings,
    overrides: &TableOverrides,
) -> Result<SanctionPolicy, AppError> {
    let path = overrides
        .sanction_policy_csv
        .as_ref()
        .or(settings.sanction_policy_csv.as_ref());

    match path {
        Some(path) => {
            let policy = sanction_policy_from_path(path, settings.sanction_lookback_months)?;
            info!(path = %path.display(), tiers = policy.tiers().len(), "sanction policy loaded");
            Ok(policy)
        }
        None => Ok(SanctionPolicy::escalation_ladder(
            settings.sanction_lookback_months,
        )),
    }
}

pub(crate) fn build_engine(
    settings: &ScoringSettings,
    overrides: &TableOverrides,
) -> Result<ScoringEngine, AppError> {
    let weights = load_weight_table(settings, overrides)?;
    let config = ScoringConfig {
        days_per_period: settings.days_per_period,
        overall_policy: settings.overall_policy,
        sanction_policy: load_sanction_policy(settings, overrides)?,
    };

    Ok(ScoringEngine::new(config, weights))
}
