mod cli;

use glucose_dashboard::{file_processing, progress, utils};
use glucose_dashboard::{DashboardConfig, DayViewOptions, Interaction, Session};

use std::io::BufRead;

/// Main entry point of the application.
///
/// This function orchestrates the entire workflow:
/// 1. Parses command-line arguments and sets up logging.
/// 2. Loads the configuration and applies command-line overrides.
/// 3. Validates input/output paths.
/// 4. Either reports on a single file (optionally interactively) or
///    processes a whole directory in parallel.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or an error if any step fails.
fn main() -> anyhow::Result<()> {
    let total_start = std::time::Instant::now();
    let args = cli::Args::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate()?;

    file_processing::check_path(&args.input)?;
    args.check_mode()?;
    let options = DayViewOptions {
        threshold_band: true,
        weekly_overlay: args.weekly,
    };
    let plan = args.view_plan();

    if args.input.is_dir() {
        let effective_threads = match args.threads {
            Some(n) => {
                let max_threads = num_cpus::get();
                if n > max_threads {
                    println!(
                        "⚠️ Warning: Limiting thread count to {} (max available)",
                        max_threads
                    );
                    max_threads
                } else {
                    n
                }
            }
            None => rayon::current_num_threads(),
        };
        println!("🚀 Using {} thread(s)", effective_threads);

        let output = args.output.as_deref();
        let local_pool = utils::configure_thread_pool(effective_threads)?;
        let outcomes = local_pool
            .install(|| progress::process_files(&args.input, output, &config, &plan, options))?;
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        println!(
            "✅ Processed {} file(s), {} failed, in {:.3} seconds",
            outcomes.len(),
            failed,
            total_start.elapsed().as_secs_f64()
        );
        return anyhow::Ok(());
    }

    if let Some(output) = &args.output {
        file_processing::ensure_parent_dir_exist(output)?;
    }

    let mut session = Session::new(config);
    session.load_file(&args.input)?;
    println!("📄 Data Preview");
    utils::print_readings(
        session.store().sorted_ascending(),
        session.config().preview_rows,
    );
    session.apply_plan(&plan);
    print_session(&session);

    if args.interactive {
        run_interactive(&mut session)?;
    }

    if let Some(output) = &args.output {
        utils::write_json(output, &session.report(options))?;
        println!("💾 Chart payload written to {}", output.display());
    }

    tracing::debug!(elapsed = ?total_start.elapsed(), "finished");
    anyhow::Ok(())
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_session(session: &Session) {
    utils::print_full_range(&session.full_range_view(), session.range());
    match session.day_stats() {
        Some(day_stats) => utils::print_day_stats(&day_stats),
        None => println!("ℹ️ No readings in the selected range"),
    }
}

/// Reads one interaction per line from stdin until `q` or end of input.
fn run_interactive(session: &mut Session) -> anyhow::Result<()> {
    println!("Commands: p | n | d YYYY-MM-DD | r START END | q");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "q" || line == "quit" {
            break;
        }
        match line.parse::<Interaction>() {
            Ok(interaction) => {
                if let Interaction::Select(date) = interaction {
                    if !session.select_day(date) {
                        println!("ℹ️ {} has no readings, selection unchanged", date);
                    }
                } else {
                    session.apply(interaction);
                }
                print_session(session);
            }
            Err(e) => println!("⚠️ {}", e),
        }
    }
    anyhow::Ok(())
}
