//! What a runner should do with a parameter bundle.

use crate::errors::BunkerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Run modes understood by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Full sweep of one case.
    Single,
    /// Full sweep repeated over every configured case.
    #[serde(alias = "multiple")]
    All,
    /// Cycle time and discounted costs of one fixed candidate.
    SingleScenario,
    /// One year of operational accounting for a fixed candidate.
    AnnualSimulation,
    /// Full-horizon operational accounting for a fixed candidate.
    YearlySimulation,
}

impl RunMode {
    /// Whether the mode needs a fixed (shuttle, pump) pair.
    pub fn needs_candidate(&self) -> bool {
        matches!(
            self,
            RunMode::SingleScenario | RunMode::AnnualSimulation | RunMode::YearlySimulation
        )
    }
}

impl FromStr for RunMode {
    type Err = BunkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(RunMode::Single),
            "all" | "multiple" => Ok(RunMode::All),
            "single_scenario" => Ok(RunMode::SingleScenario),
            "annual_simulation" => Ok(RunMode::AnnualSimulation),
            "yearly_simulation" => Ok(RunMode::YearlySimulation),
            other => Err(BunkerError::Error(format!(
                "Unknown run mode '{other}'. Expected one of: single, all, multiple, \
                 single_scenario, annual_simulation, yearly_simulation"
            ))),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            RunMode::Single => "single",
            RunMode::All => "all",
            RunMode::SingleScenario => "single_scenario",
            RunMode::AnnualSimulation => "annual_simulation",
            RunMode::YearlySimulation => "yearly_simulation",
        };
        f.write_str(tag)
    }
}

/// Runner settings carried alongside the model parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExecutionParameters {
    /// Default: `single`
    pub run_mode: RunMode,

    /// Cases processed by `all`/`multiple`.
    ///
    /// Default: `["case_1", "case_2", "case_3"]`
    pub cases: Vec<String>,

    /// Fixed shuttle size for the simulation modes (m³).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuttle_size: Option<f64>,

    /// Fixed pump rate for the simulation modes (m³/h).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pump_size: Option<f64>,

    /// Year simulated by `annual_simulation`; the last planning year when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Default: `results`
    pub output_dir: String,
}

impl Default for ExecutionParameters {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Single,
            cases: vec![
                "case_1".to_string(),
                "case_2".to_string(),
                "case_3".to_string(),
            ],
            shuttle_size: None,
            pump_size: None,
            year: None,
            output_dir: "results".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_tag() {
        assert_eq!("single".parse::<RunMode>().unwrap(), RunMode::Single);
        assert_eq!("all".parse::<RunMode>().unwrap(), RunMode::All);
        assert_eq!("multiple".parse::<RunMode>().unwrap(), RunMode::All);
        assert_eq!(
            "yearly_simulation".parse::<RunMode>().unwrap(),
            RunMode::YearlySimulation
        );
        assert!("everything".parse::<RunMode>().is_err());
    }

    #[test]
    fn multiple_is_accepted_in_config() {
        let exec: ExecutionParameters = toml::from_str("run_mode = \"multiple\"").unwrap();
        assert_eq!(exec.run_mode, RunMode::All);
        assert_eq!(exec.cases.len(), 3);
    }
}
