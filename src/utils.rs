use crate::chart;
use crate::index;
use crate::stats;

use std::io::Write;

/// Configures a custom Rayon thread pool with specified size.
///
/// Used by batch mode so the number of files converted in parallel can be
/// capped independently of the global Rayon pool.
///
/// # Arguments
/// * `num_threads` - Desired number of threads for the pool.
///
/// # Returns
/// * `Result<ThreadPool>` - Created thread pool or an error if creation fails.
pub fn configure_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(ts: &chrono::NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Formats a day the way the chart axis labels it, e.g. `Sat 09 Mar 2024`.
pub fn format_day(day: &chrono::NaiveDate) -> String {
    day.format("%a %d %b %Y").to_string()
}

fn format_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.1}", v))
}

fn format_signed(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:+.1}", v))
}

/// Prints the first `count` readings.
///
/// # Example Output
/// ```text
///  - ts: 2024-03-09 08:00:00, value: 5.40
///  - ts: 2024-03-09 08:05:00, value: 5.90
/// ```
pub fn print_readings(items: &[index::Reading], count: usize) {
    for item in items.iter().take(count) {
        println!(" - ts: {}, value: {:.2}", format_timestamp(&item.timestamp), item.value);
    }
}

/// Prints a one-paragraph overview of the full-range view.
pub fn print_full_range(
    view: &chart::FullRangeView,
    range: Option<(chrono::NaiveDate, chrono::NaiveDate)>,
) {
    match range {
        Some((start, end)) => println!("📅 Range: {} → {}", start, end),
        None => println!("📅 Range: -"),
    }
    println!(
        "📈 {} readings over {} day(s), y-axis [{:.1}, {:.1}]",
        view.points.len(),
        view.day_markers.len(),
        view.y_range[0],
        view.y_range[1],
    );
}

/// Prints the selected day's summary, deltas and time-in-range breakdown.
///
/// # Example Output
/// ```text
/// 🗓  Sat 09 Mar 2024 (288 readings)
///    avg 6.8 (+0.4)  min 3.9 (-0.2)  max 11.2 (+1.0)
///    in range  71.2% 17h 5m
///    above     20.1% 4h 49m
///    below      8.7% 2h 5m
/// ```
pub fn print_day_stats(day_stats: &stats::DayStats) {
    println!("🗓  {} ({} readings)", format_day(&day_stats.date), day_stats.readings);
    let current = day_stats.current;
    let delta = day_stats.delta;
    println!(
        "   avg {} ({})  min {} ({})  max {} ({})",
        format_opt(current.map(|s| s.avg)),
        format_signed(delta.map(|d| d.avg)),
        format_opt(current.map(|s| s.min)),
        format_signed(delta.map(|d| d.min)),
        format_opt(current.map(|s| s.max)),
        format_signed(delta.map(|d| d.max)),
    );
    if current.is_none() {
        println!("   no data for this day");
        return;
    }
    let ranges = &day_stats.ranges;
    println!(
        "   in range {:>5.1}% {}   [{}, {}]",
        ranges.in_range_pct,
        ranges.in_range_duration(),
        day_stats.thresholds.low,
        day_stats.thresholds.high,
    );
    println!("   above    {:>5.1}% {}", ranges.above_range_pct, ranges.above_range_duration());
    println!("   below    {:>5.1}% {}", ranges.below_range_pct, ranges.below_range_duration());
}

/// Writes `value` as pretty-printed JSON.
pub fn write_json<T: serde::Serialize, P: AsRef<std::path::Path>>(
    path: P,
    value: &T,
) -> anyhow::Result<()> {
    let file = std::fs::File::create(path.as_ref())
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", path.as_ref().display(), e))?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    tracing::debug!(path = %path.as_ref().display(), "wrote chart payload");
    anyhow::Ok(())
}
