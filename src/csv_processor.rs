use crate::error::{Error, Result};
use crate::index;

/// Timestamp layouts accepted besides RFC 3339, tried in order.
///
/// `%.f` also matches when no fractional part is present.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

/// Reference to an input column, by zero-based position or by header name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Position(usize),
    Name(String),
}

impl ColumnRef {
    /// Resolves the reference against the header row.
    ///
    /// # Errors
    /// * `Error::MissingColumn` if the name is absent or the position is
    ///   past the last column.
    fn resolve(&self, headers: &csv::StringRecord) -> Result<usize> {
        match self {
            ColumnRef::Position(i) if *i < headers.len() => Ok(*i),
            ColumnRef::Position(i) => Err(Error::MissingColumn(format!(
                "position {} (file has {} columns)",
                i,
                headers.len()
            ))),
            ColumnRef::Name(name) => headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::MissingColumn(name.clone())),
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnRef::Position(i) => write!(f, "#{}", i),
            ColumnRef::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Which columns hold the timestamp and the glucose value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub timestamp: ColumnRef,
    pub value: ColumnRef,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            timestamp: ColumnRef::Position(0),
            value: ColumnRef::Position(1),
        }
    }
}

/// Parses a spreadsheet-style timestamp.
///
/// RFC 3339 input keeps its wall-clock time and drops the offset. A bare
/// date maps to midnight.
pub fn parse_timestamp(raw: &str) -> Option<chrono::NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

/// Reads readings from CSV data through an explicit column mapping.
///
/// This function:
/// 1. Resolves the mapping against the header row once.
/// 2. Parses every record's timestamp and value columns.
/// 3. Skips records whose fields are all blank.
/// 4. Multiplies each value by `value_scale`.
///
/// Readings are returned in file order; sorting is the store's job.
///
/// # Errors
/// * `Error::MissingColumn` if the mapping does not match the header.
/// * `Error::Parse` on the first record with an unparseable timestamp or
///   a non-numeric value. `row` counts data rows from 1.
/// * `Error::Csv` on malformed CSV.
pub fn read_readings<R: std::io::Read>(
    input: R,
    mapping: &ColumnMapping,
    value_scale: f64,
) -> Result<Vec<index::Reading>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let ts_col = mapping.timestamp.resolve(&headers)?;
    let value_col = mapping.value.resolve(&headers)?;
    let ts_name = headers.get(ts_col).unwrap_or_default().to_string();
    let value_name = headers.get(value_col).unwrap_or_default().to_string();

    let mut readings = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 1;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let raw_ts = record.get(ts_col).unwrap_or_default();
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| Error::Parse {
            row,
            column: ts_name.clone(),
            value: raw_ts.to_string(),
            reason: "not a recognised date/time".to_string(),
        })?;

        let raw_value = record.get(value_col).unwrap_or_default();
        let value = match raw_value.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            Ok(_) => {
                return Err(Error::Parse {
                    row,
                    column: value_name.clone(),
                    value: raw_value.to_string(),
                    reason: "not a finite number".to_string(),
                });
            }
            Err(e) => {
                return Err(Error::Parse {
                    row,
                    column: value_name.clone(),
                    value: raw_value.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        readings.push(index::Reading::new(timestamp, value * value_scale));
    }

    tracing::debug!(
        rows = readings.len(),
        timestamp_column = %ts_name,
        value_column = %value_name,
        "parsed readings"
    );
    Ok(readings)
}

/// Opens `path` and reads its readings, see [`read_readings`].
pub fn load_readings<P: AsRef<std::path::Path>>(
    path: P,
    mapping: &ColumnMapping,
    value_scale: f64,
) -> Result<Vec<index::Reading>> {
    let input_file = std::fs::File::open(path.as_ref())?;
    let readings = read_readings(std::io::BufReader::new(input_file), mapping, value_scale)?;
    tracing::info!(
        path = %path.as_ref().display(),
        readings = readings.len(),
        "loaded readings"
    );
    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = ts(2024, 3, 9, 14, 5, 0);
        assert_eq!(parse_timestamp("2024-03-09 14:05:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-09T14:05:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-09 14:05"), Some(expected));
        assert_eq!(parse_timestamp("09/03/2024 14:05"), Some(expected));
        assert_eq!(parse_timestamp("09.03.2024 14:05:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-09T14:05:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp(" 2024-03-09 "), Some(ts(2024, 3, 9, 0, 0, 0)));
        assert!(parse_timestamp("2024-03-09 14:05:00.250").is_some());
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_read_positional_columns() {
        let data = "Time,Glucose,Note\n2024-03-09 08:00,5.4,\n2024-03-09 08:05,5.9,meal\n";
        let readings = read_readings(data.as_bytes(), &ColumnMapping::default(), 1.0).unwrap();

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].timestamp, ts(2024, 3, 9, 8, 0, 0));
        assert_eq!(readings[1].value, 5.9);
    }

    #[test]
    fn test_read_named_columns_and_scale() {
        let data = "Device,Reading,Stamp\nx,5.5,2024-03-09 08:00\n";
        let mapping = ColumnMapping {
            timestamp: ColumnRef::Name("Stamp".into()),
            value: ColumnRef::Name("Reading".into()),
        };
        let readings = read_readings(data.as_bytes(), &mapping, 10.0).unwrap();

        assert_eq!(readings[0].value, 55.0);
        assert_eq!(readings[0].timestamp, ts(2024, 3, 9, 8, 0, 0));
    }

    #[test]
    fn test_missing_column() {
        let data = "Time,Glucose\n2024-03-09 08:00,5.4\n";
        let mapping = ColumnMapping {
            timestamp: ColumnRef::Name("When".into()),
            value: ColumnRef::Position(1),
        };
        assert!(matches!(
            read_readings(data.as_bytes(), &mapping, 1.0),
            Err(Error::MissingColumn(_))
        ));

        let mapping = ColumnMapping {
            timestamp: ColumnRef::Position(0),
            value: ColumnRef::Position(5),
        };
        assert!(matches!(
            read_readings(data.as_bytes(), &mapping, 1.0),
            Err(Error::MissingColumn(_))
        ));
    }

    #[test]
    fn test_bad_timestamp_reports_row() {
        let data = "Time,Glucose\n2024-03-09 08:00,5.4\nnot a date,5.0\n";
        match read_readings(data.as_bytes(), &ColumnMapping::default(), 1.0) {
            Err(Error::Parse { row, column, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "Time");
                assert_eq!(value, "not a date");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_value() {
        let data = "Time,Glucose\n2024-03-09 08:00,high\n";
        assert!(matches!(
            read_readings(data.as_bytes(), &ColumnMapping::default(), 1.0),
            Err(Error::Parse { row: 1, .. })
        ));
        let data = "Time,Glucose\n2024-03-09 08:00,NaN\n";
        assert!(matches!(
            read_readings(data.as_bytes(), &ColumnMapping::default(), 1.0),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let data = "Time,Glucose\n2024-03-09 08:00,5.4\n,\n2024-03-09 08:10,6.1\n";
        let readings = read_readings(data.as_bytes(), &ColumnMapping::default(), 1.0).unwrap();
        assert_eq!(readings.len(), 2);
    }

    #[test]
    fn test_header_only_gives_no_readings() {
        let readings =
            read_readings("Time,Glucose\n".as_bytes(), &ColumnMapping::default(), 1.0).unwrap();
        assert!(readings.is_empty());
    }
}
