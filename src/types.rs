use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tabled::Tabled;
use thiserror::Error;

/// Upper bound of the review scale.
pub const SCORE_MAX: f64 = 10.0;
/// Lower bound of the review scale.
pub const SCORE_MIN: f64 = 0.0;

/// One exported row, keyed by column header.
pub type RawRow = HashMap<String, String>;

/// The fixed set of sub-category scores a review can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    ValueForMoney,
    Security,
    Location,
    Staff,
    Atmosphere,
    Cleanliness,
    Facilities,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::ValueForMoney,
        Category::Security,
        Category::Location,
        Category::Staff,
        Category::Atmosphere,
        Category::Cleanliness,
        Category::Facilities,
    ];

    /// Canonical column header for this category.
    pub fn column(self) -> &'static str {
        match self {
            Category::ValueForMoney => "Value-For-Money",
            Category::Security => "Security",
            Category::Location => "Location",
            Category::Staff => "Staff",
            Category::Atmosphere => "Atmosphere",
            Category::Cleanliness => "Cleanliness",
            Category::Facilities => "Facilities",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Which score an aggregate is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreField {
    Overall,
    Category(Category),
}

/// A validated review. `date` and `overall_score` are always present;
/// everything else is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub date: NaiveDate,
    pub overall_score: f64,
    pub category_scores: HashMap<Category, f64>,
    pub comment: Option<String>,
}

impl ReviewRecord {
    pub fn new(date: NaiveDate, overall_score: f64) -> Self {
        Self {
            date,
            overall_score,
            category_scores: HashMap::new(),
            comment: None,
        }
    }

    pub fn with_category(mut self, category: Category, score: f64) -> Self {
        self.category_scores.insert(category, score);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Overall scores outside the scale are kept, but flagged here.
    pub fn overall_in_bounds(&self) -> bool {
        (SCORE_MIN..=SCORE_MAX).contains(&self.overall_score)
    }

    pub fn value(&self, field: ScoreField) -> Option<f64> {
        match field {
            ScoreField::Overall => Some(self.overall_score),
            ScoreField::Category(c) => self.category_scores.get(&c).copied(),
        }
    }
}

/// Why a raw row did not become a `ReviewRecord`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    #[error("missing or unparseable date")]
    InvalidDate,
    #[error("missing or non-numeric overall score")]
    InvalidScore,
}

/// Count and mean over the usable values of one score field.
/// `mean` is `None` when `count` is zero; an empty set has no average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregate {
    pub count: usize,
    pub mean: Option<f64>,
}

impl Aggregate {
    pub const EMPTY: Aggregate = Aggregate {
        count: 0,
        mean: None,
    };

    /// Builds an aggregate from already-summarised numbers.
    pub fn from_summary(count: usize, mean: f64) -> Self {
        if count == 0 {
            Self::EMPTY
        } else {
            Self {
                count,
                mean: Some(mean),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Sum of the underlying scores, zero for an empty aggregate.
    pub fn total(&self) -> f64 {
        match self.mean {
            Some(mean) => mean * self.count as f64,
            None => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAggregate {
    pub category: Category,
    #[serde(flatten)]
    pub aggregate: Aggregate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermFrequency {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Reviews")]
    #[tabled(rename = "Reviews")]
    pub reviews: String,
    #[serde(rename = "Average")]
    #[tabled(rename = "Average")]
    pub average: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TermRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Term")]
    #[tabled(rename = "Term")]
    pub term: String,
    #[serde(rename = "Mentions")]
    #[tabled(rename = "Mentions")]
    pub mentions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_summary_has_no_mean() {
        let agg = Aggregate::from_summary(0, 7.5);
        assert_eq!(agg, Aggregate::EMPTY);
        assert!(agg.is_empty());
        assert!(agg.mean.is_none());
        assert_eq!(agg.total(), 0.0);
    }

    #[test]
    fn total_is_mean_times_count() {
        let agg = Aggregate::from_summary(4, 8.25);
        assert!((agg.total() - 33.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_scale_overall_is_flagged_not_rejected() {
        let review = ReviewRecord::new(date(2024, 3, 1), 11.0);
        assert!(!review.overall_in_bounds());
        assert_eq!(review.value(ScoreField::Overall), Some(11.0));
    }

    #[test]
    fn missing_category_reads_as_none() {
        let review =
            ReviewRecord::new(date(2024, 3, 1), 8.0).with_category(Category::Staff, 9.0);
        assert_eq!(
            review.value(ScoreField::Category(Category::Staff)),
            Some(9.0)
        );
        assert_eq!(review.value(ScoreField::Category(Category::Location)), None);
    }
}
