use crate::error::{ForecastError, Result};
use crate::types::{Category, RawRow, ReviewRecord, SkipReason, SCORE_MAX, SCORE_MIN};
use crate::util::{normalize_header, parse_date_safe, parse_score};
use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

const DATE_COLUMNS: [&str; 1] = ["date"];
const SCORE_COLUMNS: [&str; 2] = ["ratings", "rating"];
const COMMENT_COLUMNS: [&str; 2] = ["comment", "comments"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_date: usize,
    pub invalid_score: usize,
    /// Records the CSV reader could not turn into a row at all.
    pub malformed_rows: usize,
    /// Valid records whose overall score lies outside the 0-10 scale.
    pub out_of_range_scores: usize,
}

impl LoadReport {
    pub fn skipped(&self) -> usize {
        self.invalid_date + self.invalid_score + self.malformed_rows
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        match reason {
            SkipReason::InvalidDate => self.invalid_date,
            SkipReason::InvalidScore => self.invalid_score,
        }
    }

    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::InvalidDate => self.invalid_date += 1,
            SkipReason::InvalidScore => self.invalid_score += 1,
        }
    }
}

/// Header-insensitive view over a raw row.
struct Columns<'a> {
    by_key: HashMap<String, &'a str>,
}

impl<'a> Columns<'a> {
    /// Headers that normalize to the same key are resolved in sorted
    /// raw-header order, keeping the first non-empty value.
    fn new(row: &'a RawRow) -> Self {
        let mut entries: Vec<(&'a String, &'a String)> = row.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut by_key: HashMap<String, &'a str> = HashMap::new();
        for (k, v) in entries {
            let slot = by_key.entry(normalize_header(k)).or_insert(v.as_str());
            if slot.trim().is_empty() {
                *slot = v.as_str();
            }
        }
        Self { by_key }
    }

    fn get(&self, aliases: &[&str]) -> Option<&'a str> {
        aliases.iter().find_map(|a| self.by_key.get(*a).copied())
    }

    fn category(&self, category: Category) -> Option<&'a str> {
        self.by_key
            .get(&normalize_header(category.column()))
            .copied()
    }
}

/// Validate and coerce one raw row.
///
/// Only the date and the overall score can reject a row. Category values
/// that are missing, non-numeric or off the scale are dropped from that
/// category alone.
pub fn parse_row(row: &RawRow) -> std::result::Result<ReviewRecord, SkipReason> {
    let cols = Columns::new(row);

    let date = parse_date_safe(cols.get(&DATE_COLUMNS)).ok_or(SkipReason::InvalidDate)?;
    let overall_score = parse_score(cols.get(&SCORE_COLUMNS)).ok_or(SkipReason::InvalidScore)?;

    let category_scores = Category::ALL
        .iter()
        .filter_map(|&c| {
            parse_score(cols.category(c))
                .filter(|v| (SCORE_MIN..=SCORE_MAX).contains(v))
                .map(|v| (c, v))
        })
        .collect();

    let comment = cols
        .get(&COMMENT_COLUMNS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ReviewRecord {
        date,
        overall_score,
        category_scores,
        comment,
    })
}

/// Validate a batch of already-split rows. Bad rows are counted, never
/// fatal.
pub fn ingest_rows<I>(rows: I) -> (Vec<ReviewRecord>, LoadReport)
where
    I: IntoIterator<Item = RawRow>,
{
    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for (idx, row) in rows.into_iter().enumerate() {
        report.total_rows += 1;
        accept(&mut records, &mut report, idx + 1, parse_row(&row));
    }

    finish(records, report)
}

/// Load reviews from any CSV byte stream with a header row.
pub fn load_from_reader<R: Read>(reader: R) -> Result<(Vec<ReviewRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    read_all(&mut rdr)
}

pub fn load_reviews(path: &Path) -> Result<(Vec<ReviewRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|source| ForecastError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    read_all(&mut rdr)
}

fn read_all<R: Read>(rdr: &mut csv::Reader<R>) -> Result<(Vec<ReviewRecord>, LoadReport)> {
    rdr.headers().map_err(ForecastError::Headers)?;

    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(err) => {
                debug!(row = idx + 1, error = %err, "malformed CSV record");
                report.malformed_rows += 1;
                continue;
            }
        };
        accept(&mut records, &mut report, idx + 1, parse_row(&row));
    }

    Ok(finish(records, report))
}

fn accept(
    records: &mut Vec<ReviewRecord>,
    report: &mut LoadReport,
    row_no: usize,
    parsed: std::result::Result<ReviewRecord, SkipReason>,
) {
    match parsed {
        Ok(record) => {
            if !record.overall_in_bounds() {
                warn!(
                    row = row_no,
                    score = record.overall_score,
                    "overall score outside the 0-10 scale"
                );
                report.out_of_range_scores += 1;
            }
            report.valid_rows += 1;
            records.push(record);
        }
        Err(reason) => {
            debug!(row = row_no, %reason, "skipping review");
            report.record_skip(reason);
        }
    }
}

fn finish(records: Vec<ReviewRecord>, report: LoadReport) -> (Vec<ReviewRecord>, LoadReport) {
    info!(
        total = report.total_rows,
        valid = report.valid_rows,
        skipped = report.skipped(),
        "reviews loaded"
    );
    (records, report)
}
