//! Scenario-based stochastic optimisation over call-volume uncertainty.
//!
//! Every (shuttle, pump) candidate is solved once per Monte-Carlo scenario
//! with that scenario's mean call volume. The candidate with the lowest
//! expected NPC is the stochastic optimum. Against it the optimizer reports
//! the value of the stochastic solution (VSS) and the expected value of
//! perfect information (EVPI).
//!
//! A scenario sub-problem that has no feasible plan is dropped from the
//! empirical distribution of its candidate.

use crate::evaluate::{evaluate, npc_or_infinity, CandidateChoice};
use crate::stats::{confidence_interval_95, mean, std_dev, Summary};
use crate::vessels::{MonteCarloScenario, StochasticConfig, VesselSampler};
use bunkeropt_core::errors::{BunkerError, BunkerResult};
use bunkeropt_core::table::{Cell, Table};
use bunkeropt_core::Parameters;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Scenario NPCs of one candidate, aligned with the scenario set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateOutcome {
    pub shuttle_size: f64,
    pub pump_size: f64,
    /// `None` where the sub-problem was infeasible.
    pub npcs: Vec<Option<f64>>,
}

impl CandidateOutcome {
    pub fn feasible_npcs(&self) -> Vec<f64> {
        self.npcs.iter().flatten().copied().collect()
    }

    pub fn n_feasible(&self) -> usize {
        self.npcs.iter().filter(|n| n.is_some()).count()
    }

    /// Mean over feasible scenarios; `+∞` if there are none.
    pub fn expected_npc(&self) -> f64 {
        let feasible = self.feasible_npcs();
        if feasible.is_empty() {
            f64::INFINITY
        } else {
            mean(&feasible)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StochasticResult {
    pub case_id: String,
    pub optimal_shuttle_size: f64,
    pub optimal_pump_size: f64,
    pub expected_npc: f64,
    pub npc_std: f64,
    /// NPC of the optimum per scenario.
    pub npc_by_scenario: Vec<Option<f64>>,
    pub confidence_interval_95: (f64, f64),
    pub n_feasible: usize,
    pub deterministic_npc: f64,
    pub wait_and_see_npc: f64,
    pub vss: f64,
    pub vss_percent: f64,
    pub evpi: f64,
    pub evpi_percent: f64,
    /// Distribution of the optimum's NPC over feasible scenarios.
    pub statistics: Summary,
    /// Coefficient of variation of that distribution.
    pub cv: f64,
    /// Every candidate in catalogue order.
    pub candidates: Vec<CandidateOutcome>,
}

/// One-row export of a [`StochasticResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StochasticSummary {
    #[serde(rename = "Case")]
    pub case_id: String,
    #[serde(rename = "Optimal_Shuttle_Size_m3")]
    pub optimal_shuttle_size: f64,
    #[serde(rename = "Optimal_Pump_Size_m3ph")]
    pub optimal_pump_size: f64,
    #[serde(rename = "Expected_NPC_USDm")]
    pub expected_npc: f64,
    #[serde(rename = "NPC_Std_USDm")]
    pub npc_std: f64,
    #[serde(rename = "CI_95_Lower_USDm")]
    pub ci_lower: f64,
    #[serde(rename = "CI_95_Upper_USDm")]
    pub ci_upper: f64,
    #[serde(rename = "NPC_P5_USDm")]
    pub p5: f64,
    #[serde(rename = "NPC_P50_USDm")]
    pub p50: f64,
    #[serde(rename = "NPC_P95_USDm")]
    pub p95: f64,
    #[serde(rename = "VSS_USDm")]
    pub vss: f64,
    #[serde(rename = "VSS_Percent")]
    pub vss_percent: f64,
    #[serde(rename = "EVPI_USDm")]
    pub evpi: f64,
    #[serde(rename = "EVPI_Percent")]
    pub evpi_percent: f64,
    #[serde(rename = "Deterministic_NPC_USDm")]
    pub deterministic_npc: f64,
    #[serde(rename = "Wait_And_See_NPC_USDm")]
    pub wait_and_see_npc: f64,
    #[serde(rename = "Feasible_Scenarios")]
    pub n_feasible: usize,
}

impl StochasticResult {
    pub fn summary(&self) -> StochasticSummary {
        StochasticSummary {
            case_id: self.case_id.clone(),
            optimal_shuttle_size: self.optimal_shuttle_size,
            optimal_pump_size: self.optimal_pump_size,
            expected_npc: self.expected_npc,
            npc_std: self.npc_std,
            ci_lower: self.confidence_interval_95.0,
            ci_upper: self.confidence_interval_95.1,
            p5: self.statistics.p5,
            p50: self.statistics.p50,
            p95: self.statistics.p95,
            vss: self.vss,
            vss_percent: self.vss_percent,
            evpi: self.evpi,
            evpi_percent: self.evpi_percent,
            deterministic_npc: self.deterministic_npc,
            wait_and_see_npc: self.wait_and_see_npc,
            n_feasible: self.n_feasible,
        }
    }

    /// Candidates by ascending expected NPC; infeasible ones last.
    pub fn ranking_table(&self) -> BunkerResult<Table> {
        let mut ranked: Vec<&CandidateOutcome> = self.candidates.iter().collect();
        ranked.sort_by(|a, b| a.expected_npc().total_cmp(&b.expected_npc()));

        let mut table = Table::new([
            "Shuttle_Size_cbm",
            "Pump_Size_m3ph",
            "Expected_NPC_USDm",
            "NPC_Std_USDm",
            "Feasible_Scenarios",
        ]);
        for outcome in ranked {
            let feasible = outcome.feasible_npcs();
            let std = (!feasible.is_empty()).then(|| std_dev(&feasible));
            table.push_row(vec![
                outcome.shuttle_size.into(),
                outcome.pump_size.into(),
                outcome.expected_npc().into(),
                std.into(),
                feasible.len().into(),
            ])?;
        }
        Ok(table)
    }
}

/// NPC statistics of a fixed candidate under one distribution scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionComparison {
    #[serde(rename = "Distribution_Scenario")]
    pub distribution: String,
    #[serde(rename = "Weighted_Avg_Volume_m3")]
    pub weighted_avg_volume: f64,
    #[serde(rename = "Mean_NPC_USDm")]
    pub mean_npc: f64,
    #[serde(rename = "Std_NPC_USDm")]
    pub std_npc: f64,
    #[serde(rename = "Min_NPC_USDm")]
    pub min_npc: f64,
    #[serde(rename = "Max_NPC_USDm")]
    pub max_npc: f64,
    #[serde(rename = "N_Feasible")]
    pub n_feasible: usize,
}

/// Copy of `params` with the scenario's mean call volume.
///
/// An empty scenario leaves the configured volume unchanged.
pub fn scenario_parameters(params: &Parameters, scenario: &MonteCarloScenario) -> Parameters {
    let mut adjusted = params.clone();
    if scenario.call_count() > 0 {
        adjusted.bunkering.bunker_volume_per_call = scenario.mean_volume();
    }
    adjusted
}

/// Two-stage optimizer over a fixed Monte-Carlo scenario set.
pub struct StochasticOptimizer<'a> {
    params: &'a Parameters,
    config: &'a StochasticConfig,
    scenarios: Vec<MonteCarloScenario>,
}

impl<'a> StochasticOptimizer<'a> {
    /// Draw `sampling.n_monte_carlo` scenarios mixed by probability.
    pub fn new(params: &'a Parameters, config: &'a StochasticConfig) -> BunkerResult<Self> {
        config.validate()?;
        let scenarios = VesselSampler::new(config).monte_carlo(None, None, None)?;
        Ok(Self::with_scenarios(params, config, scenarios))
    }

    /// Draw every scenario from one named distribution.
    pub fn for_distribution(
        params: &'a Parameters,
        config: &'a StochasticConfig,
        distribution: &str,
    ) -> BunkerResult<Self> {
        config.validate()?;
        let scenarios = VesselSampler::new(config).monte_carlo(None, Some(distribution), None)?;
        Ok(Self::with_scenarios(params, config, scenarios))
    }

    pub fn with_scenarios(
        params: &'a Parameters,
        config: &'a StochasticConfig,
        scenarios: Vec<MonteCarloScenario>,
    ) -> Self {
        Self {
            params,
            config,
            scenarios,
        }
    }

    pub fn scenarios(&self) -> &[MonteCarloScenario] {
        &self.scenarios
    }

    /// Solve over the full shuttle and pump catalogues.
    pub fn solve(&self) -> BunkerResult<StochasticResult> {
        self.solve_with(
            &self.params.shuttle.available_sizes,
            &self.params.pumps.available_flow_rates,
        )
    }

    /// Solve over the given catalogues, visited size-major.
    pub fn solve_with(&self, shuttle_sizes: &[f64], pump_sizes: &[f64]) -> BunkerResult<StochasticResult> {
        let candidates: Vec<(f64, f64)> = shuttle_sizes
            .iter()
            .flat_map(|s| pump_sizes.iter().map(move |p| (*s, *p)))
            .collect();
        info!(
            case = %self.params.case_id,
            candidates = candidates.len(),
            scenarios = self.scenarios.len(),
            "Starting stochastic optimisation"
        );

        let outcomes = self.outcomes(&candidates)?;
        for outcome in &outcomes {
            let dropped = self.scenarios.len() - outcome.n_feasible();
            if dropped == self.scenarios.len() {
                debug!(shuttle = outcome.shuttle_size, pump = outcome.pump_size, "Candidate infeasible in every scenario");
            } else if dropped > 0 {
                warn!(
                    shuttle = outcome.shuttle_size,
                    pump = outcome.pump_size,
                    dropped,
                    "Dropped infeasible scenario sub-problems"
                );
            }
        }

        let best = outcomes
            .iter()
            .filter(|o| o.n_feasible() > 0)
            .fold(None::<&CandidateOutcome>, |best, o| match best {
                Some(b) if b.expected_npc() <= o.expected_npc() => Some(b),
                _ => Some(o),
            })
            .ok_or_else(|| BunkerError::NoFeasibleSolution(self.params.case_id.clone()))?;

        let feasible = best.feasible_npcs();
        let statistics = Summary::from_values(&feasible);
        let expected_npc = statistics.mean;

        let deterministic_npc = npc_or_infinity(
            evaluate(
                self.params,
                CandidateChoice::fixed(best.shuttle_size, best.pump_size),
            )?
            .as_ref(),
        );
        let wait_and_see_npc = wait_and_see(&outcomes, self.scenarios.len());

        let vss = deterministic_npc - expected_npc;
        let vss_percent = if deterministic_npc.is_finite() && deterministic_npc > 0.0 {
            vss / deterministic_npc * 100.0
        } else {
            0.0
        };
        let evpi = expected_npc - wait_and_see_npc;
        let evpi_percent = if expected_npc > 0.0 {
            evpi / expected_npc * 100.0
        } else {
            0.0
        };

        info!(
            shuttle = best.shuttle_size,
            pump = best.pump_size,
            expected_npc,
            vss,
            evpi,
            "Stochastic optimum found"
        );

        Ok(StochasticResult {
            case_id: self.params.case_id.clone(),
            optimal_shuttle_size: best.shuttle_size,
            optimal_pump_size: best.pump_size,
            expected_npc,
            npc_std: statistics.std,
            npc_by_scenario: best.npcs.clone(),
            confidence_interval_95: confidence_interval_95(&feasible),
            n_feasible: feasible.len(),
            deterministic_npc,
            wait_and_see_npc,
            vss,
            vss_percent,
            evpi,
            evpi_percent,
            cv: if statistics.mean > 0.0 {
                statistics.std / statistics.mean
            } else {
                0.0
            },
            statistics,
            candidates: outcomes,
        })
    }

    /// Candidate × scenario NPCs, solved in parallel and returned in order.
    fn outcomes(&self, candidates: &[(f64, f64)]) -> BunkerResult<Vec<CandidateOutcome>> {
        let scenario_params: Vec<Parameters> = self
            .scenarios
            .iter()
            .map(|s| scenario_parameters(self.params, s))
            .collect();

        candidates
            .par_iter()
            .map(|&(shuttle_size, pump_size)| -> BunkerResult<CandidateOutcome> {
                let npcs = scenario_params
                    .par_iter()
                    .map(|params| -> BunkerResult<Option<f64>> {
                        let row = evaluate(params, CandidateChoice::fixed(shuttle_size, pump_size))?;
                        Ok(row.map(|r| r.npc_total))
                    })
                    .collect::<BunkerResult<Vec<_>>>()?;
                Ok(CandidateOutcome {
                    shuttle_size,
                    pump_size,
                    npcs,
                })
            })
            .collect()
    }

    /// `Scenario_ID, Distribution_Scenario, Total_Demand_m3, Call_Count, NPC_USDm`
    pub fn detail_table(&self, result: &StochasticResult) -> BunkerResult<Table> {
        let mut table = Table::new([
            "Scenario_ID",
            "Distribution_Scenario",
            "Total_Demand_m3",
            "Call_Count",
            "NPC_USDm",
        ]);
        for (scenario, npc) in self.scenarios.iter().zip(&result.npc_by_scenario) {
            table.push_row(vec![
                scenario.scenario_id.into(),
                scenario.distribution_scenario.as_str().into(),
                scenario.total_demand.into(),
                scenario.call_count().into(),
                Cell::from(*npc),
            ])?;
        }
        Ok(table)
    }

    /// NPC statistics of one candidate under each distribution scenario.
    ///
    /// Distributions without a single feasible scenario are left out.
    pub fn compare_distribution_scenarios(
        &self,
        shuttle_size: f64,
        pump_size: f64,
    ) -> BunkerResult<Vec<DistributionComparison>> {
        let mut sampler = VesselSampler::new(self.config);
        let mut comparisons = Vec::new();
        for name in self.config.distribution_scenarios.keys() {
            let scenarios = sampler.monte_carlo(Some(self.scenarios.len()), Some(name), None)?;
            let npcs: Vec<f64> = scenarios
                .par_iter()
                .map(|s| -> BunkerResult<Option<f64>> {
                    let params = scenario_parameters(self.params, s);
                    let row = evaluate(&params, CandidateChoice::fixed(shuttle_size, pump_size))?;
                    Ok(row.map(|r| r.npc_total))
                })
                .collect::<BunkerResult<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect();
            if npcs.is_empty() {
                warn!(distribution = %name, "No feasible scenario for distribution");
                continue;
            }
            let summary = Summary::from_values(&npcs);
            comparisons.push(DistributionComparison {
                distribution: name.clone(),
                weighted_avg_volume: self.config.weighted_mean_volume(name)?,
                mean_npc: summary.mean,
                std_npc: summary.std,
                min_npc: summary.min,
                max_npc: summary.max,
                n_feasible: summary.count,
            });
        }
        Ok(comparisons)
    }
}

/// Mean over scenarios of the cheapest candidate's NPC.
///
/// Scenarios where no candidate is feasible are skipped.
fn wait_and_see(outcomes: &[CandidateOutcome], n_scenarios: usize) -> f64 {
    let best: Vec<f64> = (0..n_scenarios)
        .filter_map(|s| {
            outcomes
                .iter()
                .filter_map(|o| o.npcs.get(s).copied().flatten())
                .min_by(f64::total_cmp)
        })
        .collect();
    if best.is_empty() {
        f64::INFINITY
    } else {
        mean(&best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(shuttle_size: f64, npcs: &[Option<f64>]) -> CandidateOutcome {
        CandidateOutcome {
            shuttle_size,
            pump_size: 1000.0,
            npcs: npcs.to_vec(),
        }
    }

    #[test]
    fn expected_npc_ignores_dropped_scenarios() {
        let o = outcome(5000.0, &[Some(10.0), None, Some(20.0)]);
        assert_eq!(o.n_feasible(), 2);
        assert_eq!(o.expected_npc(), 15.0);
        assert_eq!(outcome(5000.0, &[None]).expected_npc(), f64::INFINITY);
    }

    #[test]
    fn wait_and_see_takes_per_scenario_minimum() {
        let outcomes = [
            outcome(2500.0, &[Some(10.0), Some(30.0), None]),
            outcome(5000.0, &[Some(12.0), Some(20.0), None]),
        ];
        assert_eq!(wait_and_see(&outcomes, 3), 15.0);
        assert_eq!(wait_and_see(&[outcome(1.0, &[None])], 1), f64::INFINITY);
    }

    #[test]
    fn scenario_parameters_use_mean_call_volume() {
        let config = StochasticConfig::default();
        let scenario = VesselSampler::new(&config)
            .monte_carlo(Some(1), Some("balanced"), Some(20))
            .unwrap()
            .remove(0);
        let params = scenario_parameters(&Parameters::default(), &scenario);
        assert_eq!(params.bunkering.bunker_volume_per_call, scenario.mean_volume());
    }
}
