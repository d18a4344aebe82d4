use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, Command, FromArgMatches as _};
use log::info;

use crate::error::GridSpreadError;
use crate::log::{apply_log_directives, parse_log_level};
use crate::parameters::Parameters;
use crate::report::{CsvReport, NullSink, TickCounts};
use crate::simulation::Simulation;

/// Name of the per-tick counts report written to the output directory.
pub const COUNTS_REPORT: &str = "counts.csv";
/// Name of the final state snapshot written to the output directory.
pub const FINAL_STATE: &str = "final_state.json";

/// Default cli arguments for the runner
#[derive(Args, Debug, Default)]
pub struct BaseArgs {
    /// Random seed; drawn from the operating system when absent
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Optional path for a JSON parameters file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Optional directory for the counts report and the final state snapshot
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Replace existing output files
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Stop after this many ticks even if some people are still susceptible
    #[arg(short = 't', long, default_value_t = 1000)]
    pub max_ticks: usize,

    /// Log level, e.g. `info` or `warn,ixa_grid_spread::simulation=trace`
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub overrides: ParameterOverrides,
}

/// Command line values that take precedence over the parameters file
#[derive(Args, Debug, Default)]
pub struct ParameterOverrides {
    /// Number of people
    #[arg(long)]
    pub population_size: Option<usize>,

    /// Number of people infected at the start
    #[arg(long)]
    pub initial_infected: Option<usize>,

    /// Number of people with a comorbidity
    #[arg(long)]
    pub comorbid_count: Option<usize>,

    /// Probability that a person moves each tick
    #[arg(long)]
    pub moving_probability: Option<f64>,

    /// Grid width
    #[arg(long)]
    pub width: Option<usize>,

    /// Grid height
    #[arg(long)]
    pub height: Option<usize>,
}

impl ParameterOverrides {
    fn apply(&self, parameters: &mut Parameters) {
        if let Some(value) = self.population_size {
            parameters.population_size = value;
        }
        if let Some(value) = self.initial_infected {
            parameters.initial_infected = value;
        }
        if let Some(value) = self.comorbid_count {
            parameters.comorbid_count = value;
        }
        if let Some(value) = self.moving_probability {
            parameters.moving_probability = value;
        }
        if let Some(value) = self.width {
            parameters.width = value;
        }
        if let Some(value) = self.height {
            parameters.height = value;
        }
    }
}

/// What a completed run looked like.
#[derive(Debug)]
pub struct RunSummary {
    pub seed: Option<u64>,
    pub ticks: usize,
    pub finished: bool,
    pub counts: TickCounts,
    pub elapsed: Duration,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(seed) = self.seed {
            writeln!(f, "seed: {seed}")?;
        }
        writeln!(f, "ticks: {}", self.ticks)?;
        writeln!(f, "finished: {}", self.finished)?;
        writeln!(f, "interaction_infections: {}", self.counts.interaction_infections)?;
        writeln!(f, "location_infections: {}", self.counts.location_infections)?;
        write!(
            f,
            "infected: {}/{}",
            self.counts.infected,
            self.counts.infected + self.counts.susceptible
        )
    }
}

fn create_cli() -> Command {
    let cli = Command::new("grid_spread")
        .about("Simulates SI disease spread on a toroidal grid with environmental contamination");
    BaseArgs::augment_args(cli)
}

// Refuses to start a run that would clobber earlier output, before anything is written.
fn check_output_paths(output_dir: &Path, force_overwrite: bool) -> Result<(), GridSpreadError> {
    if force_overwrite {
        return Ok(());
    }
    for name in [COUNTS_REPORT, FINAL_STATE] {
        let path = output_dir.join(name);
        if path.exists() {
            return Err(GridSpreadError::ReportError(format!(
                "{} already exists; pass --force-overwrite to replace it",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Parses the command line and runs a simulation.
///
/// # Errors
/// Returns an error if argument parsing, parameter validation or writing output fails
pub fn run_with_args() -> Result<RunSummary, Box<dyn std::error::Error>> {
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    Ok(run_with_args_internal(&args)?)
}

/// Runs a simulation as described by `args`.
///
/// # Errors
/// Returns a `GridSpreadError` if the parameters are invalid or output cannot be written
pub fn run_with_args_internal(args: &BaseArgs) -> Result<RunSummary, GridSpreadError> {
    if let Some(log_level) = &args.log_level {
        apply_log_directives(&parse_log_level(log_level)?);
    }

    let mut parameters = match &args.config {
        Some(path) => {
            info!("loading parameters from {}", path.display());
            Parameters::from_json_file(path)?
        }
        None => Parameters::default(),
    };
    args.overrides.apply(&mut parameters);
    if let Some(seed) = args.random_seed {
        parameters.seed = Some(seed);
    }

    if let Some(output_dir) = &args.output_dir {
        check_output_paths(output_dir, args.force_overwrite)?;
    }

    let start = Instant::now();
    let mut simulation = Simulation::new(&parameters)?;
    info!(
        "running up to {} ticks with seed {:?}",
        args.max_ticks,
        simulation.seed()
    );

    let ticks = match &args.output_dir {
        Some(output_dir) => {
            let mut report =
                CsvReport::create(&output_dir.join(COUNTS_REPORT), args.force_overwrite)?;
            let ticks = simulation.run(args.max_ticks, &mut report);
            report.finish()?;

            simulation.snapshot().write_json(&output_dir.join(FINAL_STATE))?;
            ticks
        }
        None => simulation.run(args.max_ticks, &mut NullSink),
    };

    let elapsed = start.elapsed();
    info!(
        "ran {} ticks in {}",
        ticks,
        humantime::format_duration(Duration::from_millis(
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        ))
    );

    Ok(RunSummary {
        seed: simulation.seed(),
        ticks,
        finished: !simulation.is_running(),
        counts: simulation.counts(),
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::{tempdir, NamedTempFile};

    use super::*;
    use crate::snapshot::SimulationSnapshot;

    fn seeded_args(seed: u64) -> BaseArgs {
        BaseArgs {
            random_seed: Some(seed),
            max_ticks: 1000,
            ..BaseArgs::default()
        }
    }

    #[test]
    fn test_run_with_random_seed() {
        let first = run_with_args_internal(&seeded_args(42)).unwrap();
        let second = run_with_args_internal(&seeded_args(42)).unwrap();
        assert_eq!(first.seed, Some(42));
        assert_eq!(first.ticks, second.ticks);
        assert_eq!(first.counts, second.counts);
    }

    #[test]
    fn test_run_with_overrides() {
        let mut args = seeded_args(1);
        args.overrides.population_size = Some(12);
        args.overrides.initial_infected = Some(12);
        args.overrides.comorbid_count = Some(0);
        let summary = run_with_args_internal(&args).unwrap();
        // Everyone starts infected, so no tick runs
        assert_eq!(summary.ticks, 0);
        assert!(summary.finished);
        assert_eq!(summary.counts.infected, 12);
    }

    #[test]
    fn test_run_with_invalid_override() {
        let mut args = seeded_args(1);
        args.overrides.moving_probability = Some(2.0);
        assert!(matches!(
            run_with_args_internal(&args),
            Err(GridSpreadError::ParameterError(_))
        ));
    }

    #[test]
    fn test_run_with_config_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{ "population_size": 20, "initial_infected": 2, "comorbid_count": 3, "width": 4, "height": 4 }}"#
        )
        .unwrap();
        let mut args = seeded_args(8);
        args.config = Some(file.path().to_path_buf());
        args.overrides.height = Some(5);
        args.max_ticks = 3;
        let summary = run_with_args_internal(&args).unwrap();
        assert_eq!(summary.counts.infected + summary.counts.susceptible, 20);
        assert!(summary.ticks <= 3);
    }

    #[test]
    fn test_run_with_output_dir() {
        let temp_dir = tempdir().unwrap();
        let mut args = seeded_args(5);
        args.output_dir = Some(temp_dir.path().to_path_buf());
        let summary = run_with_args_internal(&args).unwrap();

        let mut reader = csv::Reader::from_path(temp_dir.path().join(COUNTS_REPORT)).unwrap();
        let rows: Vec<TickCounts> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(rows.len(), summary.ticks);
        assert_eq!(rows.last(), Some(&summary.counts));

        let snapshot = SimulationSnapshot::read_json(&temp_dir.path().join(FINAL_STATE)).unwrap();
        assert_eq!(snapshot.tick, summary.ticks);
        assert_eq!(snapshot.seed, Some(5));

        // A second run refuses to clobber the first one's output
        assert!(matches!(
            run_with_args_internal(&args),
            Err(GridSpreadError::ReportError(_))
        ));
        args.force_overwrite = true;
        assert!(run_with_args_internal(&args).is_ok());
    }

    #[test]
    fn existing_snapshot_blocks_the_run_before_any_output() {
        let temp_dir = tempdir().unwrap();
        std::fs::write(temp_dir.path().join(FINAL_STATE), "{}").unwrap();
        let mut args = seeded_args(5);
        args.max_ticks = 10;
        args.output_dir = Some(temp_dir.path().to_path_buf());

        assert!(matches!(
            run_with_args_internal(&args),
            Err(GridSpreadError::ReportError(_))
        ));
        assert!(!temp_dir.path().join(COUNTS_REPORT).exists());
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join(FINAL_STATE)).unwrap(),
            "{}"
        );
    }

    #[test]
    fn summary_lists_counts() {
        let summary = RunSummary {
            seed: Some(3),
            ticks: 4,
            finished: true,
            counts: TickCounts {
                tick: 4,
                interaction_infections: 5,
                location_infections: 6,
                infected: 20,
                susceptible: 0,
            },
            elapsed: Duration::from_millis(2),
        };
        assert_eq!(
            summary.to_string(),
            "seed: 3\nticks: 4\nfinished: true\ninteraction_infections: 5\n\
             location_infections: 6\ninfected: 20/20"
        );
    }
}
