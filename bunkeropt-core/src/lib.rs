//! Fleet planning core for ammonia bunkering supply chains
//!
//! Given a parameter bundle, the core chooses the shuttle size, pump rate and
//! year-by-year fleet expansion that minimise the discounted cost of serving
//! a growing bunkering demand.
//!
//! # Module Organisation
//!
//! - `parameters`: configuration bundle, case loading and validation
//! - `demand`, `interpolate`: demand projection and the shuttle MCR curve
//! - `cycle_time`, `costs`, `fleet`: per-candidate timing, unit costs and fleet sizing
//! - `candidate`: per-candidate model data and the shared cost accounting
//! - `milp`, `sweep`: the mixed-integer fleet plan and the catalogue sweep
//! - `simulate`, `verify`: solver-free replay and consistency checks
//! - `results`, `table`: output rows
//!
//! # Topologies
//!
//! `operations.has_storage_at_busan` selects between port storage (C1) and
//! remote supply (C2/C3); see [`parameters::Topology`].

pub mod candidate;
pub mod costs;
pub mod cycle_time;
pub mod demand;
pub mod errors;
pub mod fleet;
pub mod interpolate;
pub mod milp;
pub mod parameters;
pub mod results;
pub mod simulate;
pub mod sweep;
pub mod table;
pub mod verify;

pub use candidate::{CandidateModel, FleetPlan, Infeasible};
pub use errors::{BunkerError, BunkerResult};
pub use milp::MilpEngine;
pub use parameters::{Parameters, RunMode, Topology};
pub use results::{CandidateSolution, ScenarioRow, YearlyRow};
pub use sweep::{run_sweep, solve_candidate, SweepResult};
