//! Rolling six-month guest-satisfaction forecasting.
//!
//! Reviews are validated by [`loader`], split around a reference date by
//! [`window`], averaged by [`stats`] and fed to [`solver`], which answers
//! "what will the average be" and "what does it take to reach the target".
//! [`reports::forecast`] runs the whole chain.
pub mod error;
pub mod loader;
pub mod logging;
pub mod output;
pub mod reports;
pub mod solver;
pub mod stats;
pub mod summarizer;
pub mod types;
pub mod util;
pub mod window;

pub use error::ForecastError;
pub use loader::{ingest_rows, load_from_reader, load_reviews, parse_row, LoadReport};
pub use reports::{forecast, manual_forecast, ForecastConfig, ForecastReport, ManualInputs};
pub use solver::{Baseline, Scenario, SolveOutcome};
pub use types::{Aggregate, Category, ReviewRecord, ScoreField, SkipReason};
pub use window::{partition, Partition, WindowLength};
