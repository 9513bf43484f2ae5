use crate::loader::LoadReport;
use crate::solver::{solve, Baseline, Scenario, SolveOutcome};
use crate::stats::{aggregate, category_aggregates};
use crate::summarizer::{summarize, DEFAULT_TOP_N};
use crate::types::{
    Aggregate, CategoryAggregate, CategoryRow, ReviewRecord, ScoreField, TermFrequency, TermRow,
};
use crate::util::{format_int, format_opt};
use crate::window::{partition, WindowLength};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

/// Everything one forecast run needs besides the reviews themselves.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastConfig {
    pub reference_date: NaiveDate,
    pub window: WindowLength,
    pub target_avg: f64,
    pub scenario: Scenario,
    pub top_n: usize,
    /// Drop reviews whose overall score is off the 0-10 scale before
    /// partitioning.
    pub exclude_out_of_range: bool,
}

impl ForecastConfig {
    pub fn new(reference_date: NaiveDate, target_avg: f64, scenario: Scenario) -> Self {
        Self {
            reference_date,
            window: WindowLength::default(),
            target_avg,
            scenario,
            top_n: DEFAULT_TOP_N,
            exclude_out_of_range: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub load: LoadReport,
    pub reference_date: NaiveDate,
    pub cutoff_date: NaiveDate,
    pub window_months: u32,
    pub target_avg: f64,
    pub excluded_out_of_range: usize,
    pub retained: Aggregate,
    pub expiring: Aggregate,
    pub future_dated: usize,
    pub categories: Vec<CategoryAggregate>,
    pub baseline: Baseline,
    pub no_new_reviews_avg: Option<f64>,
    pub target_met_without_new: Option<bool>,
    pub scenario: Scenario,
    pub outcome: SolveOutcome,
    pub top_terms: Vec<TermFrequency>,
}

impl ForecastReport {
    pub fn category_rows(&self) -> Vec<CategoryRow> {
        self.categories
            .iter()
            .map(|c| CategoryRow {
                category: c.category.to_string(),
                reviews: format_int(c.aggregate.count),
                average: format_opt(c.aggregate.mean, 2),
            })
            .collect()
    }

    pub fn term_rows(&self) -> Vec<TermRow> {
        self.top_terms
            .iter()
            .enumerate()
            .map(|(idx, t)| TermRow {
                rank: idx + 1,
                term: t.term.clone(),
                mentions: t.count,
            })
            .collect()
    }
}

/// Run the whole pipeline: partition, aggregate, solve and summarise.
pub fn forecast(records: &[ReviewRecord], load: LoadReport, config: &ForecastConfig) -> ForecastReport {
    let in_scope: Vec<ReviewRecord>;
    let (records, excluded_out_of_range) = if config.exclude_out_of_range {
        in_scope = records
            .iter()
            .filter(|r| r.overall_in_bounds())
            .cloned()
            .collect();
        let excluded = records.len() - in_scope.len();
        (in_scope.as_slice(), excluded)
    } else {
        (records, 0)
    };

    let split = partition(records, config.reference_date, config.window);
    let retained = aggregate(split.retained.iter().copied(), ScoreField::Overall);
    let expiring = aggregate(split.expiring.iter().copied(), ScoreField::Overall);
    let categories = category_aggregates(&split.retained);

    let baseline = Baseline::from_aggregates(&retained, &expiring);
    let no_new_reviews_avg = baseline.no_new_reviews_avg();
    let outcome = solve(&baseline, config.target_avg, config.scenario);

    let comments: Vec<&str> = split
        .retained
        .iter()
        .filter_map(|r| r.comment.as_deref())
        .collect();
    let top_terms = summarize(&comments, config.top_n);

    info!(
        retained = retained.count,
        expiring = expiring.count,
        ?outcome,
        "forecast computed"
    );

    ForecastReport {
        load,
        reference_date: config.reference_date,
        cutoff_date: config.window.cutoff(config.reference_date),
        window_months: config.window.months,
        target_avg: config.target_avg,
        excluded_out_of_range,
        retained,
        expiring,
        future_dated: split.future.len(),
        categories,
        baseline,
        no_new_reviews_avg,
        target_met_without_new: no_new_reviews_avg.map(|avg| avg >= config.target_avg),
        scenario: config.scenario,
        outcome,
        top_terms,
    }
}

/// Summary numbers for the calculator mode, where the caller already knows
/// the window's average and count instead of supplying individual reviews.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ManualInputs {
    pub current_avg: f64,
    pub current_reviews: usize,
    pub target_avg: f64,
    pub dropped_reviews: usize,
    pub dropped_avg: f64,
    pub scenario: Scenario,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManualReport {
    pub inputs: ManualInputs,
    pub baseline: Baseline,
    /// Reviews in the window after the drop and the new arrivals; only
    /// known when the number of new reviews is fixed.
    pub new_rolling_total: Option<usize>,
    pub no_new_reviews_avg: Option<f64>,
    pub target_met_without_new: Option<bool>,
    pub outcome: SolveOutcome,
}

pub fn manual_forecast(inputs: ManualInputs) -> ManualReport {
    let retained = Aggregate::from_summary(inputs.current_reviews, inputs.current_avg);
    let expiring = Aggregate::from_summary(inputs.dropped_reviews, inputs.dropped_avg);
    let baseline = Baseline::from_aggregates(&retained, &expiring);
    let no_new_reviews_avg = baseline.no_new_reviews_avg();

    let new_rolling_total = match inputs.scenario {
        Scenario::RequiredAverage { new_review_count } => {
            Some(baseline.base_remaining + new_review_count)
        }
        Scenario::ReviewsNeeded { .. } => None,
    };

    ManualReport {
        inputs,
        baseline,
        new_rolling_total,
        no_new_reviews_avg,
        target_met_without_new: no_new_reviews_avg.map(|avg| avg >= inputs.target_avg),
        outcome: solve(&baseline, inputs.target_avg, inputs.scenario),
    }
}
