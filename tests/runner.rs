//! Run-mode dispatch against case files in a scratch directory.

use bunkeropt::runner::{exit_code, is_infeasible, load_case, run, run_case, ExecutionOverrides};
use bunkeropt::studies;
use bunkeropt_core::{BunkerError, RunMode};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const BASE: &str = r#"
[operations]
travel_time_hours = 2.0

[shuttle]
available_sizes = [2500.0, 5000.0]

[pumps]
available_flow_rates = [1000.0]

[execution]
cases = ["case_1", "case_2"]
"#;

const CASE_1: &str = r#"
case_name = "Port storage"
"#;

const CASE_2: &str = r#"
case_name = "Remote supply"

[operations]
has_storage_at_busan = false
travel_time_hours = 1.67

[shuttle]
available_sizes = [5000.0, 10000.0]

[tank_storage]
enabled = false
"#;

/// Config directory and an output directory inside one scratch folder.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config");
    fs::create_dir_all(&config).unwrap();
    fs::write(config.join("base.toml"), BASE).unwrap();
    fs::write(config.join("case_1.toml"), CASE_1).unwrap();
    fs::write(config.join("case_2_ulsan.toml"), CASE_2).unwrap();
    dir
}

fn overrides(dir: &Path, mode: RunMode) -> ExecutionOverrides {
    ExecutionOverrides {
        run_mode: Some(mode),
        output_dir: Some(dir.join("results")),
        ..Default::default()
    }
}

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).unwrap().lines().count()
}

mod run_modes {
    use super::*;

    /// A sweep writes scenarios, yearly rows and verification records.
    #[test]
    fn test_single_writes_tables() {
        let dir = workspace();
        let outcomes = run(&dir.path().join("config"), "case_1", &overrides(dir.path(), RunMode::Single)).unwrap();

        assert_eq!(outcomes.len(), 1);
        let outcome = &outcomes[0];
        assert!(outcome.feasible);
        assert_eq!(outcome.case_id, "case_1");
        let names: Vec<_> = outcome
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["scenarios.csv", "yearly.csv", "verification.csv"]);
        assert!(outcome.files.iter().all(|p| p.starts_with(dir.path().join("results/case_1"))));

        let scenarios = fs::read_to_string(&outcome.files[0]).unwrap();
        assert!(scenarios.starts_with("Case,Shuttle_Size_cbm,Pump_Size_m3ph,"));
        assert_eq!(scenarios.lines().count(), 3);
        // 21 years per feasible candidate
        assert_eq!(line_count(&outcome.files[1]), 1 + 2 * 21);
    }

    /// Every configured case runs and results keep case order.
    #[test]
    fn test_all_keeps_case_order() {
        let dir = workspace();
        let outcomes = run(&dir.path().join("config"), "case_1", &overrides(dir.path(), RunMode::All)).unwrap();
        let ids: Vec<&str> = outcomes.iter().map(|o| o.case_id.as_str()).collect();
        assert_eq!(ids, ["case_1", "case_2"]);
        assert!(outcomes.iter().all(|o| o.mode == RunMode::All));
        assert!(outcomes[1].files.iter().all(|p| p.starts_with(dir.path().join("results/case_2"))));
    }

    /// The fixed-candidate modes refuse to guess a candidate.
    #[test]
    fn test_simulation_needs_candidate() {
        let dir = workspace();
        let err = run(
            &dir.path().join("config"),
            "case_1",
            &overrides(dir.path(), RunMode::SingleScenario),
        )
        .unwrap_err();
        assert!(err.to_string().contains("execution.shuttle_size"));
    }

    /// Yearly simulation writes one row per planning year.
    #[test]
    fn test_yearly_simulation() {
        let dir = workspace();
        let overrides = ExecutionOverrides {
            shuttle_size: Some(5000.0),
            pump_size: Some(1000.0),
            ..overrides(dir.path(), RunMode::YearlySimulation)
        };
        let outcomes = run(&dir.path().join("config"), "case_1", &overrides).unwrap();
        let files = &outcomes[0].files;
        assert_eq!(line_count(&files[0]), 22);
        assert_eq!(line_count(&files[1]), 2);
    }

    /// Annual simulation reports the requested year only.
    #[test]
    fn test_annual_simulation_year() {
        let dir = workspace();
        let overrides = ExecutionOverrides {
            shuttle_size: Some(5000.0),
            pump_size: Some(1000.0),
            year: Some(2040),
            ..overrides(dir.path(), RunMode::AnnualSimulation)
        };
        let outcomes = run(&dir.path().join("config"), "case_1", &overrides).unwrap();
        let text = fs::read_to_string(&outcomes[0].files[0]).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().contains(",2040,"));
    }

    /// A year outside the window is a driver error.
    #[test]
    fn test_annual_simulation_rejects_year() {
        let dir = workspace();
        let overrides = ExecutionOverrides {
            shuttle_size: Some(5000.0),
            pump_size: Some(1000.0),
            year: Some(2060),
            ..overrides(dir.path(), RunMode::AnnualSimulation)
        };
        assert!(run(&dir.path().join("config"), "case_1", &overrides).is_err());
    }

    /// Verification outcomes land in the records file, one row per check.
    #[test]
    fn test_single_writes_verification_records() {
        let dir = workspace();
        let outcomes = run(&dir.path().join("config"), "case_1", &overrides(dir.path(), RunMode::Single)).unwrap();
        let text = fs::read_to_string(&outcomes[0].files[2]).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.contains("Check"));
        let rows = text.lines().skip(1).filter(|l| l.starts_with("case_1,")).count();
        assert_eq!(rows, text.lines().count() - 1);
        assert!(rows > 0);
    }

    /// An empty feasible set is reported, not raised.
    #[test]
    fn test_infeasible_case_is_flagged() {
        let dir = workspace();
        let mut params = load_case(&dir.path().join("config"), "case_1", &overrides(dir.path(), RunMode::Single)).unwrap();
        params.constraints.max_call_duration_hours = 0.5;
        let outcome = run_case(&params).unwrap();
        assert!(!outcome.feasible);
        assert!(outcome.files.is_empty());
    }
}

mod execution_overrides {
    use super::*;

    /// Command line values win over the configuration file.
    #[test]
    fn test_overrides_replace_execution() {
        let dir = workspace();
        let overrides = ExecutionOverrides {
            cases: Some(vec!["case_2".to_string()]),
            shuttle_size: Some(10_000.0),
            ..overrides(dir.path(), RunMode::SingleScenario)
        };
        let params = load_case(&dir.path().join("config"), "case_2", &overrides).unwrap();
        assert_eq!(params.case_id, "case_2");
        assert_eq!(params.execution.run_mode, RunMode::SingleScenario);
        assert_eq!(params.execution.cases, ["case_2"]);
        assert_eq!(params.execution.shuttle_size, Some(10_000.0));
        assert_eq!(params.execution.pump_size, None);
    }
}

mod studies_output {
    use super::*;

    /// Verification of a feasible case passes and writes its records.
    #[test]
    fn test_verify_writes_records() {
        let dir = workspace();
        let params = load_case(&dir.path().join("config"), "case_1", &overrides(dir.path(), RunMode::Single)).unwrap();
        assert!(studies::verify(&params, 2).unwrap());
        let path = dir.path().join("results/case_1/verification.csv");
        let text = fs::read_to_string(path).unwrap();
        assert!(text.lines().count() > 2);
        assert!(!text.contains(",false,"));
    }
}

mod exit_codes {
    use super::*;

    /// Infeasibility maps to 1 whether it is reported or raised.
    #[test]
    fn test_infeasible_exits_with_one() {
        assert_eq!(exit_code(&Ok(true)), 0);
        assert_eq!(exit_code(&Ok(false)), 1);
        let err = anyhow::Error::from(BunkerError::NoFeasibleSolution("case_1".to_string()));
        assert!(is_infeasible(&err));
        assert_eq!(exit_code(&Err(err.context("Stochastic study"))), 1);
        assert_eq!(exit_code(&Err(anyhow::anyhow!("Missing base.toml"))), 2);
    }

    /// A study with an infeasible baseline raises `NoFeasibleSolution`.
    #[test]
    fn test_infeasible_studies_are_classified() {
        let dir = workspace();
        let mut params = load_case(&dir.path().join("config"), "case_1", &overrides(dir.path(), RunMode::Single)).unwrap();
        params.constraints.max_call_duration_hours = 0.5;

        let err = studies::verify(&params, 2).unwrap_err();
        assert!(is_infeasible(&err));
        let err = studies::sensitivity(
            &params,
            bunkeropt_analysis::CandidateChoice::Optimal,
            &["economy.fuel_price".to_string()],
        )
        .unwrap_err();
        assert!(is_infeasible(&err));
    }
}
