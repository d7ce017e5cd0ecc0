//! Descriptive statistics over a day's readings.
//!
//! Everything here is a pure function of a bucket (a day's readings) and a
//! threshold pair. Empty buckets are a normal state: summaries come back as
//! `None` and percentages as zero.

use crate::error::{Error, Result};
use crate::index;
use crate::resample;
use crate::store;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Average, minimum and maximum of a bucket.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Summary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Difference `current - previous` for each summary field.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SummaryDelta {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Inclusive target range `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 70.0,
            high: 180.0,
        }
    }
}

impl Thresholds {
    /// # Errors
    /// * `Error::InvalidThresholds` if either bound is not finite or `low > high`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        let thresholds = Self { low, high };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low > self.high {
            return Err(Error::InvalidThresholds {
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Whole hours and minutes of a 24-hour day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DayDuration {
    pub hours: u32,
    pub minutes: u32,
}

impl std::fmt::Display for DayDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

/// Percentages of readings below, inside and above the target range.
///
/// The raw counts are kept so durations can be derived without going
/// through a rounded percentage.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RangeBreakdown {
    pub in_range_pct: f64,
    pub above_range_pct: f64,
    pub below_range_pct: f64,
    pub in_range_count: usize,
    pub above_range_count: usize,
    pub below_range_count: usize,
    pub total: usize,
}

impl RangeBreakdown {
    pub fn compute(bucket: &[index::Reading], thresholds: &Thresholds) -> Self {
        let in_range_count = count_where(bucket, |v| thresholds.contains(v));
        let above_range_count = count_where(bucket, |v| v > thresholds.high);
        let below_range_count = count_where(bucket, |v| v < thresholds.low);
        let total = bucket.len();
        Self {
            in_range_pct: pct_of(in_range_count, total),
            above_range_pct: pct_of(above_range_count, total),
            below_range_pct: pct_of(below_range_count, total),
            in_range_count,
            above_range_count,
            below_range_count,
            total,
        }
    }

    pub fn in_range_duration(&self) -> DayDuration {
        count_to_duration(self.in_range_count, self.total)
    }

    pub fn above_range_duration(&self) -> DayDuration {
        count_to_duration(self.above_range_count, self.total)
    }

    pub fn below_range_duration(&self) -> DayDuration {
        count_to_duration(self.below_range_count, self.total)
    }
}

pub fn summary(bucket: &[index::Reading]) -> Option<Summary> {
    let first = bucket.first()?;
    let mut min = first.value;
    let mut max = first.value;
    let mut sum = 0.0;
    for reading in bucket {
        min = min.min(reading.value);
        max = max.max(reading.value);
        sum += reading.value;
    }
    Some(Summary {
        avg: sum / bucket.len() as f64,
        min,
        max,
    })
}

pub fn delta(current: &Summary, previous: Option<&Summary>) -> Option<SummaryDelta> {
    previous.map(|prev| SummaryDelta {
        avg: current.avg - prev.avg,
        min: current.min - prev.min,
        max: current.max - prev.max,
    })
}

fn count_where(bucket: &[index::Reading], pred: impl Fn(f64) -> bool) -> usize {
    bucket.iter().filter(|r| pred(r.value)).count()
}

fn pct_of(hits: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    hits as f64 / total as f64 * 100.0
}

/// Share of readings with `low <= value <= high`, in percent.
pub fn time_in_range_pct(bucket: &[index::Reading], thresholds: &Thresholds) -> f64 {
    pct_of(count_where(bucket, |v| thresholds.contains(v)), bucket.len())
}

/// Share of readings strictly above `high`, in percent.
pub fn above_range_pct(bucket: &[index::Reading], thresholds: &Thresholds) -> f64 {
    pct_of(count_where(bucket, |v| v > thresholds.high), bucket.len())
}

/// Share of readings strictly below `low`, in percent.
pub fn below_range_pct(bucket: &[index::Reading], thresholds: &Thresholds) -> f64 {
    pct_of(count_where(bucket, |v| v < thresholds.low), bucket.len())
}

fn split_minutes(total_minutes: u32) -> DayDuration {
    DayDuration {
        hours: total_minutes / 60,
        minutes: total_minutes % 60,
    }
}

/// `hits / total` of a day in whole minutes, truncated in integer arithmetic.
pub fn count_to_duration(hits: usize, total: usize) -> DayDuration {
    if total == 0 {
        return split_minutes(0);
    }
    let minutes = hits.min(total) as u64 * MINUTES_PER_DAY as u64 / total as u64;
    split_minutes(minutes as u32)
}

/// Converts a percentage of a day into whole hours and minutes.
///
/// Minutes are truncated, never rounded. Out-of-range or NaN input is
/// clamped to `[0, 100]`.
pub fn pct_to_duration(pct: f64) -> DayDuration {
    let pct = if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 100.0) };
    // percentages derived from counts land a few ulps under the exact minute
    let total_minutes = (pct * MINUTES_PER_DAY / 100.0 + 1e-9).floor() as u32;
    split_minutes(total_minutes.min(MINUTES_PER_DAY as u32))
}

/// Mean value per time of day over `(selected_day - 7 days, selected_day]`.
pub fn weekly_average_curve(
    store: &store::TimeSeriesStore,
    selected_day: chrono::NaiveDate,
) -> Vec<resample::TimeOfDayPoint> {
    let start = selected_day
        .checked_sub_days(chrono::Days::new(6))
        .unwrap_or(chrono::NaiveDate::MIN);
    resample::time_of_day_average(store.days_between(start, selected_day))
}

/// Everything shown for the selected day.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DayStats {
    pub date: chrono::NaiveDate,
    pub readings: usize,
    pub current: Option<Summary>,
    /// Summary of the calendar day before `date`, not the previous cursor day.
    pub previous: Option<Summary>,
    pub delta: Option<SummaryDelta>,
    pub ranges: RangeBreakdown,
    pub thresholds: Thresholds,
}

impl DayStats {
    pub fn compute(
        store: &store::TimeSeriesStore,
        date: chrono::NaiveDate,
        thresholds: &Thresholds,
    ) -> Self {
        let bucket = store.bucket(date);
        let current = summary(bucket);
        let previous = date.pred_opt().and_then(|prev| summary(store.bucket(prev)));
        let delta = current.as_ref().and_then(|c| delta(c, previous.as_ref()));

        Self {
            date,
            readings: bucket.len(),
            current,
            previous,
            delta,
            ranges: RangeBreakdown::compute(bucket, thresholds),
            thresholds: *thresholds,
        }
    }
}
