use crate::chart;
use crate::csv_processor;
use crate::cursor;
use crate::stats;

/// Dashboard settings.
///
/// Every field has a default so a TOML file only needs the keys it
/// changes, e.g.
///
/// ```toml
/// rolling_window_minutes = 30
/// initial_cursor = "first"
///
/// [thresholds]
/// low = 3.9
/// high = 10.0
///
/// [columns]
/// timestamp = "Device Timestamp"
/// value = 2
/// ```
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub thresholds: stats::Thresholds,
    pub rolling_window_minutes: u32,
    pub initial_cursor: cursor::CursorStart,
    pub y_axis: chart::YAxis,
    /// Multiplier applied to every value at load time.
    pub value_scale: f64,
    pub columns: csv_processor::ColumnMapping,
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            thresholds: stats::Thresholds::default(),
            rolling_window_minutes: 60,
            initial_cursor: cursor::CursorStart::default(),
            y_axis: chart::YAxis::default(),
            value_scale: 1.0,
            columns: csv_processor::ColumnMapping::default(),
            preview_rows: 5,
        }
    }
}

impl DashboardConfig {
    /// Reads a TOML config file and validates it.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("Failed to read config {}: {}", path.as_ref().display(), e)
        })?;
        let config = Self::from_toml(&text)?;
        tracing::info!(path = %path.as_ref().display(), "loaded configuration");
        anyhow::Ok(config)
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        anyhow::Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.thresholds.validate()?;
        if self.rolling_window_minutes == 0 {
            return Err(anyhow::anyhow!("rolling_window_minutes must be positive"));
        }
        if !self.value_scale.is_finite() || self.value_scale == 0.0 {
            return Err(anyhow::anyhow!("value_scale must be a finite, non-zero number"));
        }
        if !self.y_axis.floor.is_finite()
            || !self.y_axis.ceiling.is_finite()
            || self.y_axis.floor > self.y_axis.ceiling
        {
            return Err(anyhow::anyhow!(
                "y_axis bounds must be finite with floor ({}) not above ceiling ({})",
                self.y_axis.floor,
                self.y_axis.ceiling
            ));
        }
        anyhow::Ok(())
    }

    pub fn rolling_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.rolling_window_minutes))
    }
}
