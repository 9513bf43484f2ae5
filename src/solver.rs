//! Closed-form target solving for a rolling average.
//!
//! Reviews in the expiring set are removed from the retained totals, which
//! leaves a baseline of `base_remaining` reviews summing to
//! `after_drop_total`. From there we either project the average with no new
//! reviews, solve for how many new reviews at an assumed average reach the
//! target (count mode), or solve for the average a fixed number of new
//! reviews must hit (average mode).

use crate::types::{Aggregate, SCORE_MAX};
use serde::Serialize;

/// Guards `ceil` against float noise such as `17.000000000000004`.
const CEIL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    pub base_remaining: usize,
    pub after_drop_total: f64,
}

impl Baseline {
    pub fn from_aggregates(retained: &Aggregate, expiring: &Aggregate) -> Self {
        Self {
            base_remaining: retained.count.saturating_sub(expiring.count),
            after_drop_total: retained.total() - expiring.total(),
        }
    }

    /// Average once the expiring reviews drop off and nothing replaces them.
    /// Undefined when no reviews remain.
    pub fn no_new_reviews_avg(&self) -> Option<f64> {
        if self.base_remaining == 0 {
            return None;
        }
        Some(self.after_drop_total / self.base_remaining as f64)
    }
}

/// What the caller is solving for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Scenario {
    /// Assume new reviews average `expected_new_avg`; solve for how many.
    ReviewsNeeded { expected_new_avg: f64 },
    /// Assume exactly `new_review_count` new reviews; solve for their average.
    RequiredAverage { new_review_count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolveOutcome {
    ReviewsNeeded { count: u64 },
    RequiredAverage { average: f64 },
    /// The exact solve exceeded the scale; `average` is the scale maximum.
    ClampedToBound { average: f64, unclamped: f64 },
    AlreadyMet,
    Infeasible,
    Undefined,
}

pub fn solve(baseline: &Baseline, target_avg: f64, scenario: Scenario) -> SolveOutcome {
    match scenario {
        Scenario::ReviewsNeeded { expected_new_avg } => {
            reviews_needed(baseline, target_avg, expected_new_avg)
        }
        Scenario::RequiredAverage { new_review_count } => {
            required_average(baseline, target_avg, new_review_count)
        }
    }
}

fn inputs_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Number of new reviews averaging `expected_new_avg` needed to reach
/// `target_avg`.
///
/// Solved for the marginal review that first crosses the target, i.e.
/// `(target * (base + 1) - after_drop_total) / (expected - target)`, rounded
/// up. New reviews at or below the target can never raise the average to it.
pub fn reviews_needed(baseline: &Baseline, target_avg: f64, expected_new_avg: f64) -> SolveOutcome {
    if !inputs_finite(&[target_avg, expected_new_avg, baseline.after_drop_total]) {
        return SolveOutcome::Undefined;
    }
    if expected_new_avg <= target_avg {
        return SolveOutcome::Infeasible;
    }

    let needed_points =
        target_avg * (baseline.base_remaining as f64 + 1.0) - baseline.after_drop_total;
    if needed_points <= 0.0 {
        return SolveOutcome::AlreadyMet;
    }

    let count = (needed_points / (expected_new_avg - target_avg) - CEIL_EPSILON).ceil();
    SolveOutcome::ReviewsNeeded {
        count: count.max(0.0) as u64,
    }
}

/// Average that exactly `new_review_count` new reviews must reach for the
/// window to land on `target_avg`.
pub fn required_average(
    baseline: &Baseline,
    target_avg: f64,
    new_review_count: usize,
) -> SolveOutcome {
    if new_review_count == 0 || !inputs_finite(&[target_avg, baseline.after_drop_total]) {
        return SolveOutcome::Undefined;
    }

    let target_total = target_avg * (baseline.base_remaining + new_review_count) as f64;
    let required = (target_total - baseline.after_drop_total) / new_review_count as f64;

    if required < 0.0 {
        SolveOutcome::AlreadyMet
    } else if required > SCORE_MAX {
        SolveOutcome::ClampedToBound {
            average: SCORE_MAX,
            unclamped: required,
        }
    } else {
        SolveOutcome::RequiredAverage { average: required }
    }
}
