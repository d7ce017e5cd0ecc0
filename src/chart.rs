//! Payloads handed to whatever draws the charts.

use crate::resample;
use crate::stats;
use crate::store;

/// Y-axis hint constants.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct YAxis {
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for YAxis {
    fn default() -> Self {
        Self {
            floor: 0.0,
            ceiling: 10.0,
        }
    }
}

impl YAxis {
    /// `[floor, max(observed_max, ceiling)]`
    pub fn range_for(&self, observed_max: Option<f64>) -> [f64; 2] {
        let top = observed_max.map_or(self.ceiling, |m| m.max(self.ceiling));
        [self.floor, top]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ChartPoint {
    pub timestamp: chrono::NaiveDateTime,
    pub value: f64,
    pub rolling_avg: f64,
}

/// The whole filtered range: raw line, rolling-average line and day separators.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FullRangeView {
    pub points: Vec<ChartPoint>,
    pub day_markers: Vec<chrono::NaiveDateTime>,
    pub y_range: [f64; 2],
}

impl FullRangeView {
    pub fn build(store: &store::TimeSeriesStore, window: chrono::Duration, y_axis: &YAxis) -> Self {
        let points = store
            .sorted_ascending()
            .iter()
            .zip(store.rolling_mean(window))
            .map(|(r, avg)| ChartPoint {
                timestamp: r.timestamp,
                value: r.value,
                rolling_avg: avg.value,
            })
            .collect();

        let day_markers = store
            .unique_days()
            .into_iter()
            .map(|d| d.and_time(chrono::NaiveTime::MIN))
            .collect();

        Self {
            points,
            day_markers,
            y_range: y_axis.range_for(store.value_bounds().map(|(_, hi)| hi)),
        }
    }
}

/// A single day with optional target band and weekly overlay.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DayView {
    pub date: chrono::NaiveDate,
    pub points: Vec<ChartPoint>,
    pub threshold_band: Option<[f64; 2]>,
    pub weekly_overlay: Option<Vec<resample::TimeOfDayPoint>>,
    pub y_range: [f64; 2],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DayViewOptions {
    pub threshold_band: bool,
    pub weekly_overlay: bool,
}

impl DayView {
    /// Builds the view for `date`. The rolling average is taken from the
    /// full store so the first points of the day still look back across
    /// midnight.
    pub fn build(
        store: &store::TimeSeriesStore,
        date: chrono::NaiveDate,
        window: chrono::Duration,
        thresholds: &stats::Thresholds,
        y_axis: &YAxis,
        options: DayViewOptions,
    ) -> Self {
        let entry = store
            .daily_index()
            .binary_search_by_key(&date, |e| e.date)
            .ok()
            .map(|pos| store.daily_index()[pos]);

        let points: Vec<ChartPoint> = match entry {
            Some(entry) => {
                let rolled = store.rolling_mean(window);
                store.sorted_ascending()[entry.start_index..entry.end_index]
                    .iter()
                    .zip(&rolled[entry.start_index..entry.end_index])
                    .map(|(r, avg)| ChartPoint {
                        timestamp: r.timestamp,
                        value: r.value,
                        rolling_avg: avg.value,
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        let observed_max = points.iter().map(|p| p.value).reduce(f64::max);

        Self {
            date,
            points,
            threshold_band: options
                .threshold_band
                .then_some([thresholds.low, thresholds.high]),
            weekly_overlay: options
                .weekly_overlay
                .then(|| stats::weekly_average_curve(store, date)),
            y_range: y_axis.range_for(observed_max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Reading;
    use crate::store::TimeSeriesStore;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32, value: f64) -> Reading {
        Reading::new(day(d).and_hms_opt(h, m, 0).unwrap(), value)
    }

    fn sample_store() -> TimeSeriesStore {
        TimeSeriesStore::build(vec![
            at(1, 23, 30, 6.0),
            at(2, 0, 0, 8.0),
            at(2, 0, 30, 13.0),
            at(3, 12, 0, 5.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_y_range_uses_ceiling_minimum() {
        let axis = YAxis { floor: 2.0, ceiling: 10.0 };
        assert_eq!(axis.range_for(Some(7.0)), [2.0, 10.0]);
        assert_eq!(axis.range_for(Some(14.5)), [2.0, 14.5]);
        assert_eq!(axis.range_for(None), [2.0, 10.0]);
    }

    #[test]
    fn test_full_range_view() {
        let view =
            FullRangeView::build(&sample_store(), chrono::Duration::hours(1), &YAxis::default());

        assert_eq!(view.points.len(), 4);
        assert_eq!(view.day_markers.len(), 3);
        assert_eq!(view.day_markers[1], day(2).and_hms_opt(0, 0, 0).unwrap());
        assert_relative_eq!(view.points[2].rolling_avg, 9.0);
        assert_eq!(view.y_range, [0.0, 13.0]);
    }

    #[test]
    fn test_day_view_rolls_across_midnight() {
        let store = sample_store();
        let thresholds = stats::Thresholds::new(4.0, 10.0).unwrap();
        let view = DayView::build(
            &store,
            day(2),
            chrono::Duration::hours(1),
            &thresholds,
            &YAxis::default(),
            DayViewOptions { threshold_band: true, weekly_overlay: true },
        );

        assert_eq!(view.points.len(), 2);
        assert_relative_eq!(view.points[0].rolling_avg, 7.0);
        assert_eq!(view.threshold_band, Some([4.0, 10.0]));
        assert_eq!(view.weekly_overlay.as_ref().map(Vec::len), Some(3));
        assert_eq!(view.y_range, [0.0, 13.0]);
    }

    #[test]
    fn test_day_view_for_missing_day() {
        let view = DayView::build(
            &sample_store(),
            day(20),
            chrono::Duration::hours(1),
            &stats::Thresholds::default(),
            &YAxis::default(),
            DayViewOptions::default(),
        );
        assert!(view.points.is_empty());
        assert!(view.threshold_band.is_none());
        assert!(view.weekly_overlay.is_none());
        assert_eq!(view.y_range, [0.0, 10.0]);
    }
}
