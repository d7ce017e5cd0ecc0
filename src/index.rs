/// A single glucose measurement.
///
/// Timestamps are wall-clock times without a zone; the day a reading belongs
/// to is simply the calendar date of its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Reading {
    pub timestamp: chrono::NaiveDateTime,
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: chrono::NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Calendar day this reading falls on.
    pub fn day(&self) -> chrono::NaiveDate {
        self.timestamp.date()
    }
}

/// Daily index for day-based navigation.
///
/// `start_index..end_index` is the half-open range of the day's readings
/// inside the store's sorted vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DailyIndexEntry {
    pub date: chrono::NaiveDate,
    pub start_index: usize,
    pub end_index: usize,
}

impl DailyIndexEntry {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

/// Builds the daily index over readings already sorted by timestamp.
///
/// Walks the vector once and closes the current day whenever the calendar
/// date changes, so every entry is non-empty and entries are strictly
/// ascending by date.
pub fn build_daily_index(readings: &[Reading]) -> Vec<DailyIndexEntry> {
    let mut daily_index = Vec::new();
    let mut current_day = None::<chrono::NaiveDate>;
    let mut day_start_index = 0usize;

    for (i, reading) in readings.iter().enumerate() {
        let date = reading.day();
        match current_day {
            Some(d) if d == date => {}
            Some(d) => {
                daily_index.push(DailyIndexEntry {
                    date: d,
                    start_index: day_start_index,
                    end_index: i,
                });
                day_start_index = i;
                current_day = Some(date);
            }
            None => {
                current_day = Some(date);
                day_start_index = i;
            }
        }
    }

    // last day
    if let Some(day) = current_day {
        daily_index.push(DailyIndexEntry {
            date: day,
            start_index: day_start_index,
            end_index: readings.len(),
        });
    }

    daily_index
}
