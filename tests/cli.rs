//! Exit codes of the `bunkeropt` binary.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Pumping a 2500 m³ shuttle takes longer than any call may last.
const INFEASIBLE_BASE: &str = r#"
[operations]
travel_time_hours = 2.0

[shuttle]
available_sizes = [2500.0, 5000.0]

[pumps]
available_flow_rates = [1000.0]

[constraints]
max_call_duration_hours = 0.5
"#;

const STOCHASTIC: &str = r#"
[sampling]
n_monte_carlo = 2
calls_per_scenario = 10
"#;

fn workspace(base: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config");
    fs::create_dir_all(&config).unwrap();
    fs::write(config.join("base.toml"), base).unwrap();
    fs::write(config.join("case_1.toml"), "case_name = \"Port storage\"\n").unwrap();
    fs::write(config.join("stochastic.toml"), STOCHASTIC).unwrap();
    dir
}

fn bunkeropt(dir: &Path, args: &[&str]) -> Option<i32> {
    let output = Command::new(env!("CARGO_BIN_EXE_bunkeropt"))
        .arg("--config-dir")
        .arg(dir.join("config"))
        .arg("--output")
        .arg(dir.join("results"))
        .arg("--quiet")
        .args(args)
        .output()
        .unwrap();
    output.status.code()
}

mod exit_codes {
    use super::*;

    /// A sweep without feasible candidates exits with 1.
    #[test]
    fn test_infeasible_run() {
        let dir = workspace(INFEASIBLE_BASE);
        assert_eq!(bunkeropt(dir.path(), &["run", "--case", "case_1"]), Some(1));
    }

    /// An infeasible sensitivity baseline is not a driver fault.
    #[test]
    fn test_infeasible_sensitivity() {
        let dir = workspace(INFEASIBLE_BASE);
        let code = bunkeropt(
            dir.path(),
            &["sensitivity", "--case", "case_1", "--parameters", "economy.fuel_price"],
        );
        assert_eq!(code, Some(1));
    }

    /// No candidate feasible in any Monte-Carlo scenario exits with 1.
    #[test]
    fn test_infeasible_stochastic() {
        let dir = workspace(INFEASIBLE_BASE);
        assert_eq!(bunkeropt(dir.path(), &["stochastic", "--case", "case_1"]), Some(1));
    }

    /// Nothing to verify exits with 1.
    #[test]
    fn test_infeasible_verify() {
        let dir = workspace(INFEASIBLE_BASE);
        assert_eq!(bunkeropt(dir.path(), &["verify", "--case", "case_1"]), Some(1));
    }

    /// A missing case file is a driver fault.
    #[test]
    fn test_missing_case() {
        let dir = workspace(INFEASIBLE_BASE);
        assert_eq!(bunkeropt(dir.path(), &["run", "--case", "case_9"]), Some(2));
    }
}
