/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub input: std::path::PathBuf,
    pub output: Option<std::path::PathBuf>,
    pub config: Option<std::path::PathBuf>,
    pub start: Option<chrono::NaiveDate>,
    pub end: Option<chrono::NaiveDate>,
    pub day: Option<chrono::NaiveDate>,
    pub nav: Vec<glucose_dashboard::Interaction>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub window: Option<u32>,
    pub cursor: Option<glucose_dashboard::CursorStart>,
    pub scale: Option<f64>,
    pub weekly: bool,
    pub interactive: bool,
    pub threads: Option<usize>,
    pub verbose: bool,
}

/// Command-line arguments parser using Clap.
impl Args {
    /// Parses command-line arguments using `clap`.
    ///
    /// # Returns
    /// * `Args` - Struct containing parsed arguments.
    ///
    /// # Errors
    /// * Exits with a usage message if required arguments are missing or invalid.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        Args {
            input: matches
                .get_one::<std::path::PathBuf>("input")
                .cloned()
                .unwrap_or_default(),
            output: matches.get_one::<std::path::PathBuf>("output").cloned(),
            config: matches.get_one::<std::path::PathBuf>("config").cloned(),
            start: matches.get_one::<chrono::NaiveDate>("start").copied(),
            end: matches.get_one::<chrono::NaiveDate>("end").copied(),
            day: matches.get_one::<chrono::NaiveDate>("day").copied(),
            nav: matches
                .get_many::<glucose_dashboard::Interaction>("nav")
                .map(|steps| steps.copied().collect())
                .unwrap_or_default(),
            low: matches.get_one::<f64>("low").copied(),
            high: matches.get_one::<f64>("high").copied(),
            window: matches.get_one::<u32>("window").copied(),
            cursor: matches.get_one::<glucose_dashboard::CursorStart>("cursor").copied(),
            scale: matches.get_one::<f64>("scale").copied(),
            weekly: matches.get_flag("weekly"),
            interactive: matches.get_flag("interactive"),
            threads: matches.get_one::<usize>("threads").copied(),
            verbose: matches.get_flag("verbose"),
        }
    }

    /// Range and navigation requested on the command line.
    pub fn view_plan(&self) -> glucose_dashboard::ViewPlan {
        let mut steps = Vec::new();
        if let Some(day) = self.day {
            steps.push(glucose_dashboard::Interaction::Select(day));
        }
        steps.extend(self.nav.iter().copied());
        glucose_dashboard::ViewPlan {
            start: self.start,
            end: self.end,
            steps,
        }
    }

    /// Rejects flag combinations that only make sense for one input kind.
    ///
    /// # Errors
    /// * `--interactive` together with a directory input.
    pub fn check_mode(&self) -> anyhow::Result<()> {
        if self.interactive && self.input.is_dir() {
            return Err(anyhow::anyhow!(
                "--interactive needs a single input file, {} is a directory",
                self.input.display()
            ));
        }
        anyhow::Ok(())
    }

    /// Applies command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut glucose_dashboard::DashboardConfig) {
        if let Some(low) = self.low {
            config.thresholds.low = low;
        }
        if let Some(high) = self.high {
            config.thresholds.high = high;
        }
        if let Some(window) = self.window {
            config.rolling_window_minutes = window;
        }
        if let Some(cursor) = self.cursor {
            config.initial_cursor = cursor;
        }
        if let Some(scale) = self.scale {
            config.value_scale = scale;
        }
    }
}

fn command() -> clap::Command {
    clap::Command::new("glucose-dashboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Day-by-day blood glucose summaries from CSV exports")
        .arg(
            clap::Arg::new("input")
                .short('i')
                .long("input")
                .help("CSV/TXT file, or a directory of them for batch mode")
                .required(true)
                .num_args(1)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("Write the chart payload as JSON (a directory in batch mode)")
                .num_args(1)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML configuration file")
                .num_args(1)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::Arg::new("start")
                .long("start")
                .help("First day of the range, YYYY-MM-DD (default: first day in the data)")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_date)),
        )
        .arg(
            clap::Arg::new("end")
                .long("end")
                .help(
                    "Last day of the range, inclusive, YYYY-MM-DD (default: last day in the data)",
                )
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_date)),
        )
        .arg(
            clap::Arg::new("day")
                .short('d')
                .long("day")
                .help("Day to select, YYYY-MM-DD; ignored if absent from the data")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_date)),
        )
        .arg(
            clap::Arg::new("nav")
                .long("nav")
                .help("Comma-separated navigation steps applied after --day, e.g. prev,prev,next")
                .num_args(1)
                .action(clap::ArgAction::Append)
                .value_delimiter(',')
                .value_parser(clap::builder::ValueParser::new(parse_step)),
        )
        .arg(
            clap::Arg::new("low")
                .long("low")
                .help("Lower bound of the target range")
                .num_args(1)
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            clap::Arg::new("high")
                .long("high")
                .help("Upper bound of the target range")
                .num_args(1)
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            clap::Arg::new("window")
                .short('w')
                .long("window")
                .help("Rolling-average window in minutes")
                .num_args(1)
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            clap::Arg::new("cursor")
                .long("cursor")
                .help("Initially selected day")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_cursor)),
        )
        .arg(
            clap::Arg::new("scale")
                .long("scale")
                .help("Multiply every value by this factor when loading")
                .num_args(1)
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            clap::Arg::new("weekly")
                .long("weekly")
                .help("Include the 7-day time-of-day average overlay in the day view")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("interactive")
                .long("interactive")
                .help("Navigate days from stdin: p, n, d YYYY-MM-DD, r START END, q")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("threads"),
        )
        .arg(
            clap::Arg::new("threads")
                .short('t')
                .long("threads")
                .help("Number of threads for batch mode (default: all available)")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Debug logging")
                .action(clap::ArgAction::SetTrue),
        )
}

/// Validates that the number of threads is a positive integer.
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}

fn parse_date(s: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Not a valid date: {}", e))
}

fn parse_step(s: &str) -> Result<glucose_dashboard::Interaction, String> {
    match s.trim().parse::<glucose_dashboard::Interaction>()? {
        step @ (glucose_dashboard::Interaction::Previous
        | glucose_dashboard::Interaction::Next) => Ok(step),
        _ => Err(format!("Only prev/next steps are allowed, got '{}'", s)),
    }
}

fn parse_cursor(s: &str) -> Result<glucose_dashboard::CursorStart, String> {
    s.parse()
}
