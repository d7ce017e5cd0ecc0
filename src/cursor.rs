//! Selected-day cursor over a store's distinct days.

use crate::error::{Error, Result};

/// Where a fresh cursor starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorStart {
    First,
    #[default]
    Last,
}

impl std::str::FromStr for CursorStart {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first" => Ok(CursorStart::First),
            "last" => Ok(CursorStart::Last),
            other => Err(format!("unknown cursor position '{}', expected first or last", other)),
        }
    }
}

/// Index into an ascending list of days.
///
/// The cursor holds no global state: its position is either seeded from a
/// [`CursorStart`] or restored from an index the hosting session kept.
/// With no days the cursor is disabled and every move is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCursor {
    days: Vec<chrono::NaiveDate>,
    index: Option<usize>,
}

fn normalise(mut days: Vec<chrono::NaiveDate>) -> Vec<chrono::NaiveDate> {
    days.sort_unstable();
    days.dedup();
    days
}

impl DayCursor {
    /// Days are sorted and deduplicated first, so any list of dates works.
    pub fn new(days: Vec<chrono::NaiveDate>, start: CursorStart) -> Self {
        let days = normalise(days);
        let index = match (days.is_empty(), start) {
            (true, _) => None,
            (false, CursorStart::First) => Some(0),
            (false, CursorStart::Last) => Some(days.len() - 1),
        };
        Self { days, index }
    }

    /// Rebuilds a cursor at a previously held index, clamped into range.
    ///
    /// The index refers to the sorted, deduplicated days.
    pub fn restore(days: Vec<chrono::NaiveDate>, index: usize) -> Self {
        let days = normalise(days);
        let index = if days.is_empty() {
            None
        } else {
            Some(index.min(days.len() - 1))
        };
        Self { days, index }
    }

    pub fn days(&self) -> &[chrono::NaiveDate] {
        &self.days
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.index == Some(0)
    }

    pub fn is_last(&self) -> bool {
        matches!(self.index, Some(i) if i + 1 == self.days.len())
    }

    /// Moves to `date` if it is one of the days exactly; otherwise leaves
    /// the cursor where it is. Returns whether the cursor moved to `date`.
    pub fn select_by_date(&mut self, date: chrono::NaiveDate) -> bool {
        match self.days.binary_search(&date) {
            Ok(pos) => {
                self.index = Some(pos);
                true
            }
            Err(_) => {
                tracing::debug!(%date, "no exact day match, cursor unchanged");
                false
            }
        }
    }

    pub fn previous(&mut self) {
        if let Some(i) = self.index {
            self.index = Some(i.saturating_sub(1));
        }
    }

    pub fn next(&mut self) {
        if let Some(i) = self.index {
            self.index = Some((i + 1).min(self.days.len() - 1));
        }
    }

    /// Currently selected day.
    ///
    /// # Errors
    /// * `Error::EmptyState` when there are no days.
    pub fn current(&self) -> Result<chrono::NaiveDate> {
        self.index.map(|i| self.days[i]).ok_or(Error::EmptyState)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap() + chrono::Days::new(u64::from(d) - 1)
    }

    fn days(n: u32) -> Vec<NaiveDate> {
        (1..=n).map(day).collect()
    }

    #[test]
    fn test_initial_position() {
        assert_eq!(DayCursor::new(days(4), CursorStart::First).index(), Some(0));
        assert_eq!(DayCursor::new(days(4), CursorStart::Last).index(), Some(3));
    }

    #[test]
    fn test_unsorted_days_are_normalised() {
        let mut cursor = DayCursor::new(vec![day(3), day(1), day(3), day(2)], CursorStart::First);
        assert_eq!(cursor.days(), &[day(1), day(2), day(3)]);
        assert!(cursor.select_by_date(day(2)));
        assert_eq!(cursor.index(), Some(1));

        let cursor = DayCursor::restore(vec![day(5), day(4)], 1);
        assert_eq!(cursor.current().unwrap(), day(5));
    }

    #[test]
    fn test_empty_cursor_is_disabled() {
        let mut cursor = DayCursor::new(vec![], CursorStart::Last);
        cursor.next();
        cursor.previous();
        assert!(!cursor.select_by_date(day(1)));
        assert_eq!(cursor.index(), None);
        assert!(matches!(cursor.current(), Err(Error::EmptyState)));
    }

    #[test]
    fn test_navigation_clamps_at_bounds() {
        let mut cursor = DayCursor::new(days(3), CursorStart::First);
        cursor.previous();
        assert_eq!(cursor.index(), Some(0));
        cursor.next();
        cursor.next();
        cursor.next();
        assert_eq!(cursor.index(), Some(2));
        assert!(cursor.is_last());
        assert_eq!(cursor.current().unwrap(), day(3));
    }

    #[test]
    fn test_select_absent_day_leaves_cursor() {
        let mut cursor = DayCursor::new(vec![day(1), day(3)], CursorStart::First);
        assert!(!cursor.select_by_date(day(2)));
        assert_eq!(cursor.index(), Some(0));
        assert!(cursor.select_by_date(day(3)));
        assert_eq!(cursor.index(), Some(1));
    }

    #[test]
    fn test_restore_clamps_index() {
        let cursor = DayCursor::restore(days(3), 10);
        assert_eq!(cursor.index(), Some(2));
        assert_eq!(DayCursor::restore(vec![], 1).index(), None);
    }

    #[test]
    fn test_cursor_start_from_str() {
        assert_eq!("first".parse::<CursorStart>(), Ok(CursorStart::First));
        assert!("middle".parse::<CursorStart>().is_err());
    }

    proptest! {
        #[test]
        fn prop_previous_then_next_returns_from_interior(len in 3usize..40, pick in 0usize..1000) {
            let idx = 1 + pick % (len - 2);
            let mut cursor = DayCursor::restore(days(len as u32), idx);
            cursor.previous();
            cursor.next();
            prop_assert_eq!(cursor.index(), Some(idx));
        }

        #[test]
        fn prop_bounds_are_idempotent(len in 1usize..40) {
            let mut cursor = DayCursor::new(days(len as u32), CursorStart::First);
            cursor.previous();
            cursor.previous();
            prop_assert_eq!(cursor.index(), Some(0));

            let mut cursor = DayCursor::new(days(len as u32), CursorStart::Last);
            cursor.next();
            cursor.next();
            prop_assert_eq!(cursor.index(), Some(len - 1));
        }
    }
}
