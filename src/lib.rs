//! Day navigation and summary statistics for timestamped blood-glucose
//! readings.
//!
//! Readings are loaded from CSV through an explicit column mapping into a
//! [`TimeSeriesStore`], a [`DayCursor`] tracks the selected calendar day and
//! the [`stats`] functions compute per-day summaries, day-over-day deltas
//! and time-in-range breakdowns. A [`Session`] ties these together the way a
//! hosting UI would, one interaction at a time.

pub mod chart;
pub mod config;
pub mod csv_processor;
pub mod cursor;
pub mod error;
pub mod file_processing;
pub mod index;
pub mod progress;
pub mod resample;
pub mod session;
pub mod stats;
pub mod store;
pub mod utils;

pub use chart::{DayView, DayViewOptions, FullRangeView, YAxis};
pub use config::DashboardConfig;
pub use csv_processor::{ColumnMapping, ColumnRef};
pub use cursor::{CursorStart, DayCursor};
pub use error::{Error, Result};
pub use index::Reading;
pub use session::{Interaction, Session, SessionReport, ViewPlan};
pub use stats::{DayStats, RangeBreakdown, Summary, SummaryDelta, Thresholds};
pub use store::TimeSeriesStore;
