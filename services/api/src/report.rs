use crate::infra::{build_engine, load_weight_table, TableOverrides};
use clap::Args;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use store_kpi::config::AppConfig;
use store_kpi::error::AppError;
use store_kpi::scoring::router::{EvaluationBatchRequest, EvaluationBatchResponse};
use store_kpi::scoring::{
    ComplaintChannel, EvaluationOutcome, KpiScorecard, SanctionListing, StoreEvaluation,
};
use store_kpi::telemetry;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON batch file shaped like the /api/v1/kpi/evaluations request body
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// CSV of `channel,weight` rows (overrides KPI_WEIGHTS_CSV)
    #[arg(long)]
    pub(crate) weights: Option<PathBuf>,
    /// CSV of `min_violations,sanction_type` rows (overrides KPI_SANCTION_POLICY_CSV)
    #[arg(long)]
    pub(crate) sanction_policy: Option<PathBuf>,
    /// Print the evaluation batch as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct WeightsShowArgs {
    /// CSV of `channel,weight` rows (overrides KPI_WEIGHTS_CSV)
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        input,
        weights,
        sanction_policy,
        json,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let overrides = TableOverrides {
        weights_csv: weights,
        sanction_policy_csv: sanction_policy,
    };
    let engine = build_engine(&config.scoring, &overrides)?;

    let reader = BufReader::new(File::open(&input)?);
    let request: EvaluationBatchRequest = serde_json::from_reader(reader)?;

    let override_table = match request.weights {
        Some(weights) => Some(engine.weights().with_weights(weights)?),
        None => None,
    };
    let evaluations = engine.evaluate_batch(&request.evaluations, override_table.as_ref())?;
    let response = EvaluationBatchResponse::new(evaluations);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_batch(&response, engine.config().overall_policy.label()));
    }

    Ok(())
}

pub(crate) fn run_weights_show(args: WeightsShowArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let overrides = TableOverrides {
        weights_csv: args.csv,
        sanction_policy_csv: None,
    };
    let table = load_weight_table(&config.scoring, &overrides)?;

    println!("Complaint channel weights");
    for channel in ComplaintChannel::ordered() {
        println!("- {}: {}", channel.label(), table.resolve(channel.key()));
    }
    println!("Default weight: {}", table.default_weight());

    let unknown: Vec<&str> = table
        .weights()
        .iter()
        .map(|weight| weight.channel.as_str())
        .filter(|channel| {
            !ComplaintChannel::ordered()
                .iter()
                .any(|known| known.key() == channel.to_lowercase())
        })
        .collect();
    if !unknown.is_empty() {
        println!("Unmatched table entries: {}", unknown.join(", "));
    }

    Ok(())
}

pub(crate) fn render_batch(response: &EvaluationBatchResponse, policy_label: String) -> String {
    let mut out = format!(
        "Store KPI evaluation: {} scored, {} without data (overall: {})\n",
        response.scored, response.no_data, policy_label
    );

    for evaluation in &response.evaluations {
        out.push('\n');
        out.push_str(&render_evaluation(evaluation));
    }

    out
}

pub(crate) fn render_evaluation(evaluation: &StoreEvaluation) -> String {
    let store = &evaluation.store;
    let mut out = format!("{} {} ({})\n", store.id, store.name, evaluation.period);

    let location: Vec<&str> = [&store.city, &store.regional, &store.area]
        .into_iter()
        .map(String::as_str)
        .filter(|part| !part.is_empty())
        .collect();
    if !location.is_empty() {
        out.push_str(&format!("Location: {}\n", location.join(" / ")));
    }

    match &evaluation.outcome {
        EvaluationOutcome::Scored(scorecard) => render_scorecard(&mut out, scorecard),
        EvaluationOutcome::NoData { missing } => {
            let missing: Vec<&str> = missing.iter().map(|input| input.label()).collect();
            out.push_str(&format!(
                "No data for this period (missing {})\n",
                missing.join(", ")
            ));
        }
    }

    render_sanctions(&mut out, &evaluation.sanctions);
    out
}

fn render_scorecard(out: &mut String, scorecard: &KpiScorecard) {
    for component in &scorecard.components {
        out.push_str(&format!(
            "- {}: {} ({})\n",
            component.metric_label, component.score, component.notes
        ));
    }
    out.push_str(&format!(
        "- Overall: {} ({})\n",
        scorecard.overall, scorecard.overall_policy
    ));

    out.push_str(&format!(
        "Weighted complaints: {:.2}\n",
        scorecard.weighted_complaints
    ));
    for channel in scorecard.channels.iter().filter(|channel| channel.count > 0) {
        out.push_str(&format!(
            "  {}: {} x {} = {:.2}\n",
            channel.channel_label, channel.count, channel.weight, channel.weighted
        ));
    }
}

fn render_sanctions(out: &mut String, listing: &SanctionListing) {
    if listing.is_clear() {
        out.push_str("Sanctions: none\n");
        return;
    }

    out.push_str("Sanctions\n");
    for entry in listing.entries() {
        let sanction = &entry.sanction;
        out.push_str(&format!(
            "- [{}] {} {}, {}: {}\n",
            entry.tone_label,
            sanction.sanction_type,
            sanction.employee_name,
            sanction.sanction_date,
            sanction.violation_details
        ));
    }
}
