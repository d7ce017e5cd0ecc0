use crate::error::{Error, Result};
use crate::index;
use crate::resample;

/// Sorted, immutable set of readings with a per-day index.
///
/// Built once per load; range filtering produces a new store rather than
/// mutating this one. A store may be empty only when it was produced by a
/// filter, [`TimeSeriesStore::build`] itself rejects empty input.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesStore {
    readings: Vec<index::Reading>,
    daily_index: Vec<index::DailyIndexEntry>,
}

impl TimeSeriesStore {
    /// Builds a store from readings in any order.
    ///
    /// Readings are stably sorted by timestamp, so readings sharing a
    /// timestamp keep their input order. Duplicates are never merged.
    ///
    /// # Errors
    /// * `Error::EmptyInput` if `readings` is empty.
    pub fn build(readings: Vec<index::Reading>) -> Result<Self> {
        if readings.is_empty() {
            return Err(Error::EmptyInput);
        }
        let store = Self::from_unsorted(readings);
        tracing::debug!(
            readings = store.len(),
            days = store.daily_index.len(),
            "built time series store"
        );
        Ok(store)
    }

    /// A store with no readings, the state reached by an over-narrow filter.
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_unsorted(mut readings: Vec<index::Reading>) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        Self::from_sorted(readings)
    }

    fn from_sorted(readings: Vec<index::Reading>) -> Self {
        let daily_index = index::build_daily_index(&readings);
        Self {
            readings,
            daily_index,
        }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// All readings, ascending by timestamp.
    pub fn sorted_ascending(&self) -> &[index::Reading] {
        &self.readings
    }

    pub fn daily_index(&self) -> &[index::DailyIndexEntry] {
        &self.daily_index
    }

    /// Distinct calendar days present, strictly ascending.
    pub fn unique_days(&self) -> Vec<chrono::NaiveDate> {
        self.daily_index.iter().map(|e| e.date).collect()
    }

    pub fn first_day(&self) -> Option<chrono::NaiveDate> {
        self.daily_index.first().map(|e| e.date)
    }

    pub fn last_day(&self) -> Option<chrono::NaiveDate> {
        self.daily_index.last().map(|e| e.date)
    }

    /// Readings falling on `day`, time-ascending. Empty if the day is absent.
    pub fn bucket(&self, day: chrono::NaiveDate) -> &[index::Reading] {
        match self.daily_index.binary_search_by_key(&day, |e| e.date) {
            Ok(pos) => {
                let entry = &self.daily_index[pos];
                &self.readings[entry.start_index..entry.end_index]
            }
            Err(_) => &[],
        }
    }

    /// Readings whose calendar day lies in `[start, end]`.
    ///
    /// Both ends are whole days: everything from `start 00:00` through the
    /// last instant of `end` is included.
    pub fn days_between(
        &self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> &[index::Reading] {
        if start > end {
            return &[];
        }
        let lo = self.readings.partition_point(|r| r.day() < start);
        let hi = self.readings.partition_point(|r| r.day() <= end);
        &self.readings[lo..hi]
    }

    /// Returns a new store restricted to `[start, end]`, inclusive through
    /// the end of the `end` day. `start > end` gives an empty store.
    pub fn filter_range(
        &self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> TimeSeriesStore {
        let filtered = Self::from_sorted(self.days_between(start, end).to_vec());
        tracing::debug!(
            %start,
            %end,
            kept = filtered.len(),
            total = self.len(),
            "filtered store by date range"
        );
        filtered
    }

    /// Backward-looking rolling mean of every reading over `window`.
    pub fn rolling_mean(&self, window: chrono::Duration) -> Vec<resample::RollingPoint> {
        resample::rolling_mean(&self.readings, window)
    }

    /// Smallest and largest value in the store.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.readings.iter().fold(None, |acc, r| match acc {
            None => Some((r.value, r.value)),
            Some((lo, hi)) => Some((lo.min(r.value), hi.max(r.value))),
        })
    }
}
