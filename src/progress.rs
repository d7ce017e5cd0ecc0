use crate::chart;
use crate::config;
use crate::file_processing;
use crate::session;
use crate::stats;
use crate::utils;

use rayon::prelude::*;

/// Overview of one processed file.
#[derive(Debug, Clone)]
pub struct FileSummary {
    pub readings: usize,
    pub days: usize,
    pub selected_day: Option<chrono::NaiveDate>,
    pub overall: Option<stats::Summary>,
    pub ranges: stats::RangeBreakdown,
}

/// Outcome of one file in a batch; a failed file does not stop the others.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: std::path::PathBuf,
    pub result: anyhow::Result<FileSummary>,
}

/// Loads one file into its own session, replays `plan` and optionally
/// writes the JSON payload next to the other outputs.
fn process_file(
    path: &std::path::Path,
    output_dir: Option<&std::path::Path>,
    config: &config::DashboardConfig,
    plan: &session::ViewPlan,
    options: chart::DayViewOptions,
) -> anyhow::Result<FileSummary> {
    let mut session = session::Session::new(config.clone());
    session
        .load_file(path)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
    session.apply_plan(plan);

    if let Some(dir) = output_dir {
        let payload = file_processing::payload_path(path, dir);
        utils::write_json(&payload, &session.report(options))?;
    }

    let store = session.store();
    let all = store.sorted_ascending();
    anyhow::Ok(FileSummary {
        readings: store.len(),
        days: store.daily_index().len(),
        selected_day: session.current_day().ok(),
        overall: stats::summary(all),
        ranges: stats::RangeBreakdown::compute(all, &config.thresholds),
    })
}

/// Processes every CSV/TXT file in `input_dir` in parallel.
///
/// Each file gets an isolated [`session::Session`]; nothing is shared
/// between files except the read-only configuration. Progress is shown
/// with an indicatif bar and a summary line is printed per file once all
/// files are done.
///
/// # Returns
/// * `anyhow::Result<Vec<FileOutcome>>` - One outcome per file, sorted by path.
pub fn process_files<P: AsRef<std::path::Path>>(
    input_dir: P,
    output_dir: Option<&std::path::Path>,
    config: &config::DashboardConfig,
    plan: &session::ViewPlan,
    options: chart::DayViewOptions,
) -> anyhow::Result<Vec<FileOutcome>> {
    let paths = file_processing::collect_input_files(input_dir.as_ref())?;
    if paths.is_empty() {
        return Err(anyhow::anyhow!(
            "No .csv or .txt files found in {}",
            input_dir.as_ref().display()
        ));
    }
    if let Some(dir) = output_dir {
        file_processing::ensure_dir_exist(dir)?;
    }

    let pb = indicatif::ProgressBar::new(paths.len() as u64);
    pb.set_style(
        indicatif::ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("##-"),
    );

    let outcomes: Vec<FileOutcome> = paths
        .par_iter()
        .map(|path| {
            let result = process_file(path, output_dir, config, plan, options);
            if let Err(e) = &result {
                tracing::warn!(path = %path.display(), error = %e, "file failed");
            }
            pb.inc(1);
            FileOutcome {
                path: path.clone(),
                result,
            }
        })
        .collect();
    pb.finish_with_message("done");

    for outcome in &outcomes {
        print_outcome(outcome);
    }
    anyhow::Ok(outcomes)
}

fn print_outcome(outcome: &FileOutcome) {
    let name = outcome.path.display();
    match &outcome.result {
        Ok(summary) => {
            let overall = summary
                .overall
                .map(|s| format!("avg {:.1}, min {:.1}, max {:.1}", s.avg, s.min, s.max))
                .unwrap_or_else(|| "no data".to_string());
            println!(
                "✅ {}: {} readings, {} day(s), {}, in range {:.1}%",
                name, summary.readings, summary.days, overall, summary.ranges.in_range_pct
            );
        }
        Err(e) => println!("⚠️ {}: {}", name, e),
    }
}
