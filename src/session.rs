//! Per-user session state.
//!
//! A session owns everything one viewer has loaded: the full store, the
//! active date range, the store filtered to that range and the day cursor.
//! Interactions are applied one at a time through `&mut self`; sessions are
//! never shared, so no locking is involved.

use crate::chart;
use crate::config;
use crate::csv_processor;
use crate::cursor;
use crate::error::Result;
use crate::index;
use crate::stats;
use crate::store;

/// One user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Previous,
    Next,
    Select(chrono::NaiveDate),
    Range(chrono::NaiveDate, chrono::NaiveDate),
}

impl std::str::FromStr for Interaction {
    type Err = String;

    /// Parses `prev`, `next`, `day YYYY-MM-DD` or `range YYYY-MM-DD YYYY-MM-DD`
    /// (single-letter forms `p`, `n`, `d`, `r` are accepted too).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let date = |raw: &str| {
            chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| format!("invalid date '{}': {}", raw, e))
        };
        match parts.as_slice() {
            ["p" | "prev" | "previous"] => Ok(Interaction::Previous),
            ["n" | "next"] => Ok(Interaction::Next),
            ["d" | "day", d] => Ok(Interaction::Select(date(*d)?)),
            ["r" | "range", a, b] => Ok(Interaction::Range(date(*a)?, date(*b)?)),
            _ => Err(format!("unrecognised command '{}'", s.trim())),
        }
    }
}

/// Range and navigation to replay right after a load.
///
/// A missing range bound falls back to the data's first or last day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewPlan {
    pub start: Option<chrono::NaiveDate>,
    pub end: Option<chrono::NaiveDate>,
    pub steps: Vec<Interaction>,
}

/// Serialisable snapshot of a session, handed to the renderer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionReport {
    pub range: Option<(chrono::NaiveDate, chrono::NaiveDate)>,
    pub full_range: chart::FullRangeView,
    pub day: Option<chart::DayView>,
    pub stats: Option<stats::DayStats>,
}

#[derive(Debug, Clone)]
pub struct Session {
    config: config::DashboardConfig,
    source: Option<store::TimeSeriesStore>,
    range: Option<(chrono::NaiveDate, chrono::NaiveDate)>,
    view: store::TimeSeriesStore,
    cursor: cursor::DayCursor,
}

impl Session {
    /// A session with no data loaded yet.
    pub fn new(config: config::DashboardConfig) -> Self {
        Self {
            config,
            source: None,
            range: None,
            view: store::TimeSeriesStore::empty(),
            cursor: cursor::DayCursor::new(Vec::new(), cursor::CursorStart::default()),
        }
    }

    pub fn config(&self) -> &config::DashboardConfig {
        &self.config
    }

    pub fn has_data(&self) -> bool {
        self.source.is_some()
    }

    /// Replaces whatever was loaded with `readings`.
    ///
    /// The range resets to the data's first and last day and the cursor to
    /// its configured start. On error the session is left untouched.
    pub fn load_readings(&mut self, readings: Vec<index::Reading>) -> Result<()> {
        let source = store::TimeSeriesStore::build(readings)?;
        let range = source.first_day().zip(source.last_day());
        self.view = source.clone();
        self.cursor = cursor::DayCursor::new(self.view.unique_days(), self.config.initial_cursor);
        self.range = range;
        self.source = Some(source);
        tracing::info!(
            readings = self.view.len(),
            days = self.cursor.days().len(),
            "session loaded"
        );
        Ok(())
    }

    pub fn load_file<P: AsRef<std::path::Path>>(&mut self, path: P) -> Result<()> {
        let readings =
            csv_processor::load_readings(path, &self.config.columns, self.config.value_scale)?;
        self.load_readings(readings)
    }

    /// Full, unfiltered store, if anything is loaded.
    pub fn source(&self) -> Option<&store::TimeSeriesStore> {
        self.source.as_ref()
    }

    /// Store filtered to the active range.
    pub fn store(&self) -> &store::TimeSeriesStore {
        &self.view
    }

    pub fn range(&self) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
        self.range
    }

    pub fn cursor(&self) -> &cursor::DayCursor {
        &self.cursor
    }

    /// Rebuilds the filtered store for `[start, end]`.
    ///
    /// The selected day is kept when it is still inside the new range,
    /// otherwise the cursor goes back to its configured start. Ignored when
    /// nothing is loaded.
    pub fn set_range(&mut self, start: chrono::NaiveDate, end: chrono::NaiveDate) {
        let Some(source) = &self.source else {
            tracing::debug!("range change ignored, no data loaded");
            return;
        };
        let selected = self.cursor.current().ok();
        self.view = source.filter_range(start, end);
        self.cursor = cursor::DayCursor::new(self.view.unique_days(), self.config.initial_cursor);
        if let Some(day) = selected {
            self.cursor.select_by_date(day);
        }
        self.range = Some((start, end));
        if self.view.is_empty() {
            tracing::warn!(%start, %end, "range excludes all readings");
        }
    }

    /// Like [`Session::set_range`], with missing bounds taken from the data.
    pub fn set_partial_range(
        &mut self,
        start: Option<chrono::NaiveDate>,
        end: Option<chrono::NaiveDate>,
    ) {
        let Some((first, last)) = self
            .source
            .as_ref()
            .and_then(|s| s.first_day().zip(s.last_day()))
        else {
            return;
        };
        self.set_range(start.unwrap_or(first), end.unwrap_or(last));
    }

    pub fn select_day(&mut self, date: chrono::NaiveDate) -> bool {
        self.cursor.select_by_date(date)
    }

    pub fn previous_day(&mut self) {
        self.cursor.previous();
    }

    pub fn next_day(&mut self) {
        self.cursor.next();
    }

    pub fn current_day(&self) -> Result<chrono::NaiveDate> {
        self.cursor.current()
    }

    pub fn apply(&mut self, interaction: Interaction) {
        match interaction {
            Interaction::Previous => self.previous_day(),
            Interaction::Next => self.next_day(),
            Interaction::Select(date) => {
                self.select_day(date);
            }
            Interaction::Range(start, end) => self.set_range(start, end),
        }
    }

    pub fn apply_plan(&mut self, plan: &ViewPlan) {
        if plan.start.is_some() || plan.end.is_some() {
            self.set_partial_range(plan.start, plan.end);
        }
        for step in &plan.steps {
            self.apply(*step);
        }
    }

    /// Stats for the selected day, `None` when there is no day to select.
    pub fn day_stats(&self) -> Option<stats::DayStats> {
        let day = self.cursor.current().ok()?;
        Some(stats::DayStats::compute(&self.view, day, &self.config.thresholds))
    }

    pub fn full_range_view(&self) -> chart::FullRangeView {
        chart::FullRangeView::build(&self.view, self.config.rolling_window(), &self.config.y_axis)
    }

    pub fn day_view(&self, options: chart::DayViewOptions) -> Option<chart::DayView> {
        let day = self.cursor.current().ok()?;
        Some(chart::DayView::build(
            &self.view,
            day,
            self.config.rolling_window(),
            &self.config.thresholds,
            &self.config.y_axis,
            options,
        ))
    }

    pub fn report(&self, options: chart::DayViewOptions) -> SessionReport {
        SessionReport {
            range: self.range,
            full_range: self.full_range_view(),
            day: self.day_view(options),
            stats: self.day_stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    fn at(d: u32, h: u32, value: f64) -> index::Reading {
        index::Reading::new(day(d).and_hms_opt(h, 0, 0).unwrap(), value)
    }

    fn loaded(start: cursor::CursorStart) -> Session {
        let config = config::DashboardConfig {
            initial_cursor: start,
            ..Default::default()
        };
        let mut session = Session::new(config);
        session
            .load_readings(vec![at(1, 8, 90.0), at(3, 8, 150.0), at(4, 8, 200.0), at(5, 8, 60.0)])
            .unwrap();
        session
    }

    #[test]
    fn test_no_data_yet_state() {
        let mut session = Session::new(config::DashboardConfig::default());
        session.next_day();
        session.set_range(day(1), day(2));

        assert!(!session.has_data());
        assert!(session.day_stats().is_none());
        assert!(session.day_view(chart::DayViewOptions::default()).is_none());
        assert!(matches!(session.current_day(), Err(Error::EmptyState)));
        assert!(session.full_range_view().points.is_empty());
    }

    #[test]
    fn test_load_empty_keeps_previous_data() {
        let mut session = loaded(cursor::CursorStart::Last);
        assert!(matches!(session.load_readings(vec![]), Err(Error::EmptyInput)));
        assert_eq!(session.store().len(), 4);
    }

    #[test]
    fn test_load_sets_default_range_and_cursor() {
        let session = loaded(cursor::CursorStart::Last);
        assert_eq!(session.range(), Some((day(1), day(5))));
        assert_eq!(session.current_day().unwrap(), day(5));

        let session = loaded(cursor::CursorStart::First);
        assert_eq!(session.current_day().unwrap(), day(1));
    }

    #[test]
    fn test_set_range_keeps_selection_when_possible() {
        let mut session = loaded(cursor::CursorStart::Last);
        session.select_day(day(3));
        session.set_range(day(2), day(4));
        assert_eq!(session.current_day().unwrap(), day(3));

        session.set_range(day(4), day(5));
        assert_eq!(session.current_day().unwrap(), day(5));
    }

    #[test]
    fn test_range_outside_data_degrades_gracefully() {
        let mut session = loaded(cursor::CursorStart::Last);
        session.set_range(day(20), day(25));

        assert!(session.store().is_empty());
        assert!(session.day_stats().is_none());
        let report = session.report(chart::DayViewOptions::default());
        assert!(report.day.is_none());
        assert_eq!(report.full_range.y_range, [0.0, 10.0]);

        session.set_range(day(1), day(5));
        assert_eq!(session.store().len(), 4);
    }

    #[test]
    fn test_interactions() {
        let mut session = loaded(cursor::CursorStart::First);
        session.apply("n".parse().unwrap());
        assert_eq!(session.current_day().unwrap(), day(3));
        session.apply("day 2024-08-02".parse().unwrap());
        assert_eq!(session.current_day().unwrap(), day(3));
        session.apply(Interaction::Select(day(5)));
        session.apply(Interaction::Previous);
        assert_eq!(session.current_day().unwrap(), day(4));

        let stats = session.day_stats().unwrap();
        assert_eq!(stats.delta.map(|d| d.avg), Some(50.0));
        assert_eq!(stats.ranges.above_range_pct, 100.0);
    }

    #[test]
    fn test_apply_plan_with_open_start() {
        let mut session = loaded(cursor::CursorStart::Last);
        session.apply_plan(&ViewPlan {
            start: None,
            end: Some(day(4)),
            steps: vec![Interaction::Previous, Interaction::Previous, Interaction::Next],
        });

        assert_eq!(session.range(), Some((day(1), day(4))));
        assert_eq!(session.store().len(), 3);
        assert_eq!(session.current_day().unwrap(), day(3));
    }

    #[test]
    fn test_interaction_parsing() {
        assert_eq!("prev".parse::<Interaction>(), Ok(Interaction::Previous));
        assert_eq!(
            "r 2024-08-01 2024-08-03".parse::<Interaction>(),
            Ok(Interaction::Range(day(1), day(3)))
        );
        assert!("d 2024-13-01".parse::<Interaction>().is_err());
        assert!("jump".parse::<Interaction>().is_err());
    }
}
