//! Command line entry point.
//!
//! ```bash
//! bunkeropt run --case case_1
//! bunkeropt run --mode all
//! bunkeropt run --case case_2 --mode yearly_simulation --shuttle 5000 --pump 1000
//! bunkeropt breakeven --case-a case_1 --case-b case_3 --axis distance
//! bunkeropt stochastic --case case_1
//! ```

use anyhow::{Context, Result};
use bunkeropt::runner::{self, ExecutionOverrides};
use bunkeropt::studies::{self, BreakEvenAxis};
use bunkeropt_analysis::sensitivity::DEFAULT_PARAMETERS;
use bunkeropt_analysis::{CandidateChoice, StochasticConfig};
use bunkeropt_core::RunMode;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Shuttle fleet planning for ammonia bunkering
#[derive(Parser, Debug)]
#[command(name = "bunkeropt")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory holding base.toml and the case files
    #[arg(long, global = true, default_value = "config")]
    config_dir: PathBuf,

    /// Output directory, overrides execution.output_dir
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Log debug events
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan one case, or every configured case with `--mode all`
    Run {
        #[arg(short, long, default_value = "case_1")]
        case: String,

        /// single, all, multiple, single_scenario, annual_simulation or yearly_simulation
        #[arg(short, long)]
        mode: Option<RunMode>,

        /// Shuttle size for the simulation modes (m³)
        #[arg(long)]
        shuttle: Option<f64>,

        /// Pump rate for the simulation modes (m³/h)
        #[arg(long)]
        pump: Option<f64>,

        /// Year for annual_simulation
        #[arg(long)]
        year: Option<i32>,
    },
    /// Tornado, single-parameter, two-way and pump-rate sensitivity
    Sensitivity {
        #[arg(short, long, default_value = "case_1")]
        case: String,

        /// Dotted parameter paths, comma separated
        #[arg(long, value_delimiter = ',')]
        parameters: Vec<String>,

        /// Freeze this shuttle size instead of re-optimising
        #[arg(long, requires = "pump")]
        shuttle: Option<f64>,

        #[arg(long, requires = "shuttle")]
        pump: Option<f64>,
    },
    /// Break-even between two cases
    Breakeven {
        #[arg(long, default_value = "case_1")]
        case_a: String,

        #[arg(long, default_value = "case_2")]
        case_b: String,

        #[arg(long, value_enum, default_value_t = BreakEvenAxis::Distance)]
        axis: BreakEvenAxis,
    },
    /// Optimal configuration of each case under alternative demand growth
    DemandScenarios {
        #[arg(long, value_delimiter = ',', default_values_t = ["case_1".to_string(), "case_2".to_string(), "case_3".to_string()])]
        cases: Vec<String>,
    },
    /// Monte-Carlo optimisation over vessel-size distributions
    Stochastic {
        #[arg(short, long, default_value = "case_1")]
        case: String,

        /// Defaults to stochastic.toml in the config directory
        #[arg(long)]
        stochastic_config: Option<PathBuf>,
    },
    /// Re-check the best candidates of a sweep
    Verify {
        #[arg(short, long, default_value = "case_1")]
        case: String,

        #[arg(long, default_value_t = runner::VERIFIED_CANDIDATES)]
        top: usize,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to install the log subscriber");
    }

    let result = execute(args);
    match &result {
        Err(e) if runner::is_infeasible(e) => warn!("{e:#}"),
        Err(e) => error!("{e:#}"),
        Ok(_) => {}
    }
    ExitCode::from(runner::exit_code(&result))
}

/// Run the selected command, returning whether every run was feasible.
fn execute(args: Args) -> Result<bool> {
    let config_dir = args.config_dir.as_path();
    let base_overrides = ExecutionOverrides {
        output_dir: args.output.clone(),
        ..Default::default()
    };

    match args.command {
        Command::Run {
            case,
            mode,
            shuttle,
            pump,
            year,
        } => {
            let overrides = ExecutionOverrides {
                run_mode: mode,
                shuttle_size: shuttle,
                pump_size: pump,
                year,
                ..base_overrides
            };
            let outcomes = runner::run(config_dir, &case, &overrides)?;
            for outcome in &outcomes {
                info!(
                    case = %outcome.case_id,
                    mode = %outcome.mode,
                    feasible = outcome.feasible,
                    files = outcome.files.len(),
                    "Finished"
                );
            }
            Ok(outcomes.iter().all(|o| o.feasible))
        }
        Command::Sensitivity {
            case,
            parameters,
            shuttle,
            pump,
        } => {
            let params = runner::load_case(config_dir, &case, &base_overrides)?;
            let parameters = if parameters.is_empty() {
                DEFAULT_PARAMETERS.iter().map(|p| p.to_string()).collect()
            } else {
                parameters
            };
            let choice = match (shuttle, pump) {
                (Some(shuttle), Some(pump)) => CandidateChoice::fixed(shuttle, pump),
                _ => CandidateChoice::Optimal,
            };
            let files = studies::sensitivity(&params, choice, &parameters)?;
            info!(case = %params.case_id, files = files.len(), "Sensitivity written");
            Ok(true)
        }
        Command::Breakeven { case_a, case_b, axis } => {
            let a = runner::load_case(config_dir, &case_a, &base_overrides)?;
            let b = runner::load_case(config_dir, &case_b, &base_overrides)?;
            let result = studies::breakeven(&a, &b, axis, &output_dir(&a))?;
            Ok(result.points.iter().any(|p| p.npc_a.is_finite() || p.npc_b.is_finite()))
        }
        Command::DemandScenarios { cases } => {
            let params = cases
                .iter()
                .map(|case| runner::load_case(config_dir, case, &base_overrides))
                .collect::<Result<Vec<_>>>()?;
            let Some(first) = params.first() else {
                anyhow::bail!("No cases given");
            };
            let path = studies::demand_scenarios(&params, &output_dir(first))?;
            info!(path = %path.display(), "Demand scenarios written");
            Ok(true)
        }
        Command::Stochastic {
            case,
            stochastic_config,
        } => {
            let params = runner::load_case(config_dir, &case, &base_overrides)?;
            let path = stochastic_config.unwrap_or_else(|| config_dir.join("stochastic.toml"));
            let config = StochasticConfig::load(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            studies::stochastic(&params, &config)?;
            Ok(true)
        }
        Command::Verify { case, top } => {
            let params = runner::load_case(config_dir, &case, &base_overrides)?;
            studies::verify(&params, top)
        }
    }
}

fn output_dir(params: &bunkeropt_core::Parameters) -> PathBuf {
    Path::new(&params.execution.output_dir).to_path_buf()
}
