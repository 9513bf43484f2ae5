//! Rolling-window partitioning of reviews around a reference date.

use crate::types::ReviewRecord;
use crate::util::months_before;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Length of the rolling window, in calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowLength {
    pub months: u32,
}

impl WindowLength {
    pub const fn months(months: u32) -> Self {
        Self { months }
    }

    /// First day *outside* the window: everything on or before it has aged
    /// out.
    pub fn cutoff(self, reference_date: NaiveDate) -> NaiveDate {
        months_before(reference_date, self.months)
    }
}

impl Default for WindowLength {
    fn default() -> Self {
        Self::months(6)
    }
}

/// Reviews split by where they fall relative to `(cutoff, reference_date]`.
#[derive(Debug, Clone, Default)]
pub struct Partition<'a> {
    pub retained: Vec<&'a ReviewRecord>,
    pub expiring: Vec<&'a ReviewRecord>,
    /// Posted after the reference date; counted in neither set.
    pub future: Vec<&'a ReviewRecord>,
}

impl Partition<'_> {
    pub fn len(&self) -> usize {
        self.retained.len() + self.expiring.len() + self.future.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `records` into retained, expiring and future-dated reviews.
///
/// * retained: `cutoff < date <= reference_date`
/// * expiring: `date <= cutoff`
/// * future:   `date > reference_date`
///
/// Input order is preserved within each set.
pub fn partition<'a>(
    records: &'a [ReviewRecord],
    reference_date: NaiveDate,
    window: WindowLength,
) -> Partition<'a> {
    let cutoff = window.cutoff(reference_date);
    let mut out = Partition::default();

    for record in records {
        if record.date > reference_date {
            out.future.push(record);
        } else if record.date > cutoff {
            out.retained.push(record);
        } else {
            out.expiring.push(record);
        }
    }

    debug!(
        %reference_date,
        %cutoff,
        retained = out.retained.len(),
        expiring = out.expiring.len(),
        future = out.future.len(),
        "partitioned reviews"
    );
    out
}
