use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand};

use csat_forecast::output;
use csat_forecast::reports::{self, ForecastConfig, ForecastReport, ManualInputs, ManualReport};
use csat_forecast::solver::{Scenario, SolveOutcome};
use csat_forecast::types::{SkipReason, SCORE_MAX, SCORE_MIN};
use csat_forecast::util::{format_int, format_number, format_opt, parse_date_safe};
use csat_forecast::{loader, logging, WindowLength};

#[derive(Parser)]
#[command(name = "csat-forecast")]
#[command(about = "Forecast a rolling 6-month review average and what it takes to hit a target", long_about = None)]
struct Cli {
    /// Tracing filter, e.g. `info` or `csat_forecast=debug`
    #[arg(long, global = true, env = "CSAT_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Exactly one way of describing the new reviews.
#[derive(Args)]
#[command(group(
    ArgGroup::new("new_reviews_mode")
        .args(["expected_avg", "new_reviews"])
        .required(true)
        .multiple(false)
))]
struct ScenarioArgs {
    /// Assumed average of new reviews; solves for how many are needed
    #[arg(long, value_parser = parse_score_arg)]
    expected_avg: Option<f64>,
    /// Number of new reviews expected; solves for their required average
    #[arg(long)]
    new_reviews: Option<usize>,
}

impl ScenarioArgs {
    fn scenario(&self) -> Scenario {
        match (self.expected_avg, self.new_reviews) {
            (Some(expected_new_avg), _) => Scenario::ReviewsNeeded { expected_new_avg },
            (None, count) => Scenario::RequiredAverage {
                new_review_count: count.unwrap_or(0),
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast from an exported CSV of individual reviews
    Forecast {
        #[arg(long)]
        csv: PathBuf,
        /// Forecast date, day-first or ISO (defaults to today)
        #[arg(long, value_parser = parse_date_arg)]
        reference_date: Option<NaiveDate>,
        #[arg(long, default_value_t = 6)]
        window_months: u32,
        /// Target rolling average
        #[arg(long, value_parser = parse_score_arg)]
        target: f64,
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// How many frequent comment terms to show
        #[arg(long, default_value_t = 10)]
        top_n: usize,
        /// Leave out reviews whose overall score is off the 0-10 scale
        #[arg(long)]
        exclude_out_of_range: bool,
        /// Write the full result as JSON
        #[arg(long)]
        json_out: Option<PathBuf>,
        /// Write the per-category table as CSV
        #[arg(long)]
        categories_out: Option<PathBuf>,
    },
    /// Forecast from summary numbers instead of individual reviews
    Manual {
        #[arg(long, value_parser = parse_score_arg)]
        current_avg: f64,
        #[arg(long)]
        current_reviews: usize,
        #[arg(long, value_parser = parse_score_arg)]
        target: f64,
        /// Reviews dropping out of the window next month
        #[arg(long, default_value_t = 0)]
        dropped_reviews: usize,
        #[arg(long, value_parser = parse_score_arg, default_value_t = 0.0)]
        dropped_avg: f64,
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[arg(long)]
        json_out: Option<PathBuf>,
    },
}

fn parse_score_arg(s: &str) -> Result<f64, String> {
    let value: f64 = s.trim().parse().map_err(|_| format!("`{s}` is not a number"))?;
    if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
        return Err(format!("`{s}` is outside the {SCORE_MIN}-{SCORE_MAX} scale"));
    }
    Ok(value)
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date_safe(Some(s)).ok_or_else(|| format!("`{s}` is not a recognised date"))
}

fn describe_outcome(outcome: &SolveOutcome) -> String {
    match *outcome {
        SolveOutcome::ReviewsNeeded { count } => {
            format!("New reviews needed: {}", format_int(count))
        }
        SolveOutcome::RequiredAverage { average } => {
            format!("Your new reviews need to average: {}", format_number(average, 2))
        }
        SolveOutcome::ClampedToBound { average, unclamped } => format!(
            "Your new reviews would need to average {} (capped at {}); the target is out of reach with this many reviews",
            format_number(unclamped, 2),
            format_number(average, 1)
        ),
        SolveOutcome::AlreadyMet => "Target already met without new reviews.".to_string(),
        SolveOutcome::Infeasible => {
            "Target unreachable: new reviews must average above the target.".to_string()
        }
        SolveOutcome::Undefined => {
            "No new reviews contemplated; no required average to report.".to_string()
        }
    }
}

fn print_forecast(report: &ForecastReport, top_n: usize) {
    let load = &report.load;
    println!(
        "Processing reviews... ({} rows read, {} valid)",
        format_int(load.total_rows),
        format_int(load.valid_rows)
    );
    if load.skipped() > 0 {
        println!(
            "Note: {} rows skipped ({}: {}, {}: {}, malformed: {}).",
            format_int(load.skipped()),
            SkipReason::InvalidDate,
            format_int(load.invalid_date),
            SkipReason::InvalidScore,
            format_int(load.invalid_score),
            format_int(load.malformed_rows)
        );
    }
    if load.out_of_range_scores > 0 {
        println!(
            "Note: {} reviews have an overall score outside 0-10{}.",
            format_int(load.out_of_range_scores),
            if report.excluded_out_of_range > 0 {
                " and were excluded"
            } else {
                ""
            }
        );
    }
    println!();

    println!(
        "Window: {} months, ({} .. {}]",
        report.window_months, report.cutoff_date, report.reference_date
    );
    println!(
        "Retained: {} reviews, average {}",
        format_int(report.retained.count),
        format_opt(report.retained.mean, 2)
    );
    if report.expiring.is_empty() {
        println!("Expiring: none");
    } else {
        println!(
            "Expiring: {} reviews, average {}",
            format_int(report.expiring.count),
            format_opt(report.expiring.mean, 2)
        );
    }
    if report.future_dated > 0 {
        println!(
            "Ignored: {} reviews dated after the reference date",
            format_int(report.future_dated)
        );
    }
    println!(
        "Average with no new reviews: {}",
        format_opt(report.no_new_reviews_avg, 2)
    );
    println!("Target: {}", format_number(report.target_avg, 2));
    println!("{}\n", describe_outcome(&report.outcome));

    output::preview_table("Category averages (retained window)", &report.category_rows(), 7);
    output::preview_table("Most mentioned terms", &report.term_rows(), top_n);
}

fn print_manual(report: &ManualReport) {
    println!(
        "Average with no new reviews: {}",
        format_opt(report.no_new_reviews_avg, 2)
    );
    if let Some(total) = report.new_rolling_total {
        println!("New rolling total reviews: {}", format_int(total));
    }
    println!("{}", describe_outcome(&report.outcome));
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);

    match cli.command {
        Commands::Forecast {
            csv,
            reference_date,
            window_months,
            target,
            scenario,
            top_n,
            exclude_out_of_range,
            json_out,
            categories_out,
        } => {
            let (records, load) = loader::load_reviews(&csv)
                .with_context(|| format!("failed to load reviews from {}", csv.display()))?;

            let config = ForecastConfig {
                reference_date: reference_date.unwrap_or_else(|| Utc::now().date_naive()),
                window: WindowLength::months(window_months),
                target_avg: target,
                scenario: scenario.scenario(),
                top_n,
                exclude_out_of_range,
            };
            let report = reports::forecast(&records, load, &config);
            print_forecast(&report, top_n);

            if let Some(path) = json_out {
                output::write_json(&path, &report)?;
                println!("Full result written to {}.", path.display());
            }
            if let Some(path) = categories_out {
                output::write_csv(&path, &report.category_rows())?;
                println!("Category table written to {}.", path.display());
            }
        }
        Commands::Manual {
            current_avg,
            current_reviews,
            target,
            dropped_reviews,
            dropped_avg,
            scenario,
            json_out,
        } => {
            let report = reports::manual_forecast(ManualInputs {
                current_avg,
                current_reviews,
                target_avg: target,
                dropped_reviews,
                dropped_avg,
                scenario: scenario.scenario(),
            });
            print_manual(&report);

            if let Some(path) = json_out {
                output::write_json(&path, &report)?;
                println!("Full result written to {}.", path.display());
            }
        }
    }

    Ok(())
}
