use crate::index;

/// A point of the rolling-average series.
///
/// Holds the timestamp of the reading the window ends on and the mean of
/// every reading inside that window.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RollingPoint {
    pub timestamp: chrono::NaiveDateTime,
    pub value: f64,
}

/// A point of the weekly time-of-day average curve.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TimeOfDayPoint {
    pub time: chrono::NaiveTime,
    pub value: f64,
}

/// Computes a backward-looking rolling mean over a fixed time window.
///
/// For each reading `r` (in order) the output value is the mean of every
/// reading with a timestamp in `[r.timestamp - window, r.timestamp]`, up to
/// and including `r` itself. Readings that share `r`'s timestamp but come
/// after it in the vector are not part of its window.
///
/// # Arguments
///
/// * `readings` - Readings sorted ascending by timestamp.
/// * `window` - Window length. A negative window is treated as zero.
///
/// # Returns
///
/// * `Vec<RollingPoint>` - One point per input reading.
pub fn rolling_mean(readings: &[index::Reading], window: chrono::Duration) -> Vec<RollingPoint> {
    let window = window.max(chrono::Duration::zero());
    let mut resampled = Vec::with_capacity(readings.len());
    let mut left = 0usize;

    for (i, reading) in readings.iter().enumerate() {
        let lower = reading
            .timestamp
            .checked_sub_signed(window)
            .unwrap_or(chrono::NaiveDateTime::MIN);
        while readings[left].timestamp < lower {
            left += 1;
        }
        let slice = &readings[left..=i];
        let sum: f64 = slice.iter().map(|r| r.value).sum();
        resampled.push(RollingPoint {
            timestamp: reading.timestamp,
            value: sum / slice.len() as f64,
        });
    }

    resampled
}

/// Averages readings per distinct time of day, discarding the date.
///
/// The caller is responsible for restricting `readings` to the days it
/// wants folded together. Output is sorted ascending by time of day.
pub fn time_of_day_average<'a, I>(readings: I) -> Vec<TimeOfDayPoint>
where
    I: IntoIterator<Item = &'a index::Reading>,
{
    let mut buckets: std::collections::BTreeMap<chrono::NaiveTime, (f64, usize)> =
        std::collections::BTreeMap::new();

    for reading in readings {
        let entry = buckets.entry(reading.timestamp.time()).or_insert((0.0, 0));
        entry.0 += reading.value;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(time, (sum, count))| TimeOfDayPoint {
            time,
            value: sum / count as f64,
        })
        .collect()
}
