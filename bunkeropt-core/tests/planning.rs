//! End-to-end planning tests.
//!
//! These tests exercise the full chain from parameters to result rows:
//! - reference values of the cycle-time and cost models
//! - invariants every feasible MILP plan satisfies
//! - agreement between the MILP and the solver-free replay
//! - case loading from layered TOML files

use approx::assert_relative_eq;
use bunkeropt_core::costs::annuity_factor;
use bunkeropt_core::cycle_time::CycleTime;
use bunkeropt_core::parameters::{Parameters, Topology};
use bunkeropt_core::simulate::simulate_yearly;
use bunkeropt_core::verify::{check_demand_satisfaction, verify_solution, verify_top_candidates};
use bunkeropt_core::{run_sweep, solve_candidate, MilpEngine};

/// Base case with a reduced catalogue.
fn port_storage() -> Parameters {
    let mut params = Parameters::default();
    params.operations.travel_time_hours = 2.0;
    params.shuttle.available_sizes = vec![2500.0, 5000.0];
    params.pumps.available_flow_rates = vec![1000.0, 2000.0];
    params
}

fn remote_supply() -> Parameters {
    let mut params = Parameters::default();
    params.case_id = "case_2".to_string();
    params.operations.has_storage_at_busan = false;
    params.operations.travel_time_hours = 1.67;
    params.tank_storage.enabled = false;
    params.shuttle.available_sizes = vec![5000.0, 10_000.0, 25_000.0];
    params.pumps.available_flow_rates = vec![1000.0, 2000.0];
    params
}

mod reference_values {
    use super::*;

    /// Annuity factor at 7 % over 21 years.
    #[test]
    fn test_annuity_factor() {
        assert!((annuity_factor(0.07, 21) - 10.836).abs() <= 0.001);
    }

    /// Port storage, 5 000 m3 shuttle with a 1 000 m3/h pump.
    #[test]
    fn test_port_storage_cycle_time() {
        let ct = CycleTime::calculate(&port_storage(), 5000.0, 1000.0);
        assert_relative_eq!(ct.shore_loading, 5000.0 / 1500.0, max_relative = 1e-12);
        assert_relative_eq!(ct.cycle, 21.33, max_relative = 0.01);
    }

    /// Remote supply, 25 000 m3 shuttle serving five vessels per trip.
    #[test]
    fn test_remote_supply_cycle_time() {
        let params = remote_supply();
        assert_eq!(params.topology(), Topology::RemoteSupply);
        let ct = CycleTime::calculate(&params, 25_000.0, 1000.0);
        assert_eq!(ct.vessels_per_trip, 5);
        assert_eq!(ct.pumping_total, 25.0);
        assert_relative_eq!(ct.cycle, ct.shore_loading + 55.34, max_relative = 1e-12);
    }
}

mod milp_invariants {
    use super::*;

    /// Every year of every feasible candidate meets demand and working hours.
    #[test]
    fn test_yearly_constraints_hold() {
        let params = port_storage();
        let sweep = run_sweep(&params).unwrap();
        assert!(!sweep.is_empty());

        for row in &sweep.yearly {
            assert!(row.supply_m3 >= row.demand_m3 * (1.0 - 1e-9));
            assert!(row.hours_used <= f64::from(row.total_shuttles) * 8000.0 + 1e-6);
            if row.demand_m3 > 0.0 {
                assert!(row.utilization > 0.0 && row.utilization <= 1.0 + 1e-9);
            }
        }
    }

    /// Cumulative fleets equal the running sum of additions.
    #[test]
    fn test_fleet_accumulation() {
        let solution = solve_candidate(&port_storage(), 5000.0, 1000.0).unwrap();
        let (mut shuttles, mut tanks) = (0, 0);
        for row in &solution.yearly {
            shuttles += row.new_shuttles;
            tanks += row.new_tanks;
            assert_eq!(row.total_shuttles, shuttles);
            assert_eq!(row.total_tanks, tanks);
        }
        assert!(tanks > 0);
    }

    /// NPC equals its components and the sum of yearly costs.
    #[test]
    fn test_npc_decomposition() {
        let sweep = run_sweep(&port_storage()).unwrap();
        let best = sweep.optimal().unwrap();
        assert_relative_eq!(best.component_sum(), best.npc_total, max_relative = 0.005);

        let yearly_sum: f64 = sweep
            .yearly_for(best.shuttle_size, best.pump_size)
            .iter()
            .map(|r| r.total_year_cost)
            .sum();
        assert_relative_eq!(yearly_sum, best.npc_total, max_relative = 1e-4);
    }

    /// Candidates whose call exceeds the limit never appear.
    #[test]
    fn test_call_duration_gate() {
        let mut params = port_storage();
        params.constraints.max_call_duration_hours = 22.0;
        let sweep = run_sweep(&params).unwrap();
        assert!(sweep.scenarios.iter().all(|r| r.call_duration <= 22.0));
        // 2 500 m3 shuttles need two trips of over 12 h
        assert!(sweep.scenarios.iter().all(|r| r.shuttle_size == 5000.0));
        assert_eq!(sweep.evaluated, 4);
        assert_eq!(sweep.skipped, 2);
    }

    /// No storage, no terminal costs.
    #[test]
    fn test_disabled_tank_has_no_terminal_cost() {
        let sweep = run_sweep(&remote_supply()).unwrap();
        assert!(!sweep.is_empty());
        for row in &sweep.scenarios {
            assert_eq!(row.npc_terminal_capex, 0.0);
            assert_eq!(row.npc_terminal_fopex, 0.0);
            assert_eq!(row.npc_terminal_vopex, 0.0);
        }
        assert!(sweep.yearly.iter().all(|r| r.total_tanks == 0));
    }

    /// Repeated sweeps give identical tables in identical order.
    #[test]
    fn test_sweep_is_deterministic() {
        let first = run_sweep(&port_storage()).unwrap();
        let second = run_sweep(&port_storage()).unwrap();
        assert_eq!(first, second);
    }

    /// A single-entry catalogue produces exactly that candidate.
    #[test]
    fn test_with_candidate_restricts_sweep() {
        let params = port_storage().with_candidate(5000.0, 2000.0);
        let sweep = run_sweep(&params).unwrap();
        assert_eq!(sweep.scenarios.len(), 1);
        assert!(sweep.scenarios[0].is_candidate(5000.0, 2000.0));
    }
}

mod replay_agreement {
    use super::*;

    /// The replay reproduces the MILP plan and cost of the winner.
    #[test]
    fn test_replay_matches_milp_winner() {
        let params = port_storage();
        let sweep = run_sweep(&params).unwrap();
        let best = sweep.optimal().unwrap();
        let replay = simulate_yearly(&params, best.shuttle_size, best.pump_size).unwrap();

        assert_relative_eq!(
            replay.scenario.lco_usd_per_ton,
            best.lco_usd_per_ton,
            max_relative = 0.02
        );
        assert_relative_eq!(replay.scenario.npc_total, best.npc_total, max_relative = 1e-6);
        let milp_fleet: Vec<u32> = sweep
            .yearly_for(best.shuttle_size, best.pump_size)
            .iter()
            .map(|r| r.total_shuttles)
            .collect();
        let replay_fleet: Vec<u32> = replay.yearly.iter().map(|r| r.total_shuttles).collect();
        assert_eq!(milp_fleet, replay_fleet);
    }

    /// Remote supply agrees as well, trips included.
    #[test]
    fn test_replay_matches_remote_supply() {
        let params = remote_supply();
        let engine = MilpEngine::new(&params).unwrap();
        let milp = engine.solve(10_000.0, 2000.0).unwrap();
        let replay = simulate_yearly(&params, 10_000.0, 2000.0).unwrap();
        for (a, b) in milp.yearly.iter().zip(&replay.yearly) {
            assert_eq!(a.total_shuttles, b.total_shuttles);
            assert_relative_eq!(a.annual_calls, b.annual_calls, max_relative = 1e-6);
        }
    }
}

mod verification {
    use super::*;

    /// The cheapest candidates pass every check.
    #[test]
    fn test_top_candidates_pass() {
        let params = port_storage();
        let sweep = run_sweep(&params).unwrap();
        let reports = verify_top_candidates(&params, &sweep, 2).unwrap();
        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert!(report.passed(), "{:?}", report.failures().collect::<Vec<_>>());
        }
    }

    /// A shortage injected into one year is reported with that year.
    #[test]
    fn test_injected_shortage_is_flagged() {
        let params = port_storage();
        let mut solution = solve_candidate(&params, 5000.0, 1000.0).unwrap();
        solution.yearly[3].supply_m3 = solution.yearly[3].demand_m3 - 1000.0;

        let report = verify_solution(&params, &solution).unwrap();
        let check = report.get("Demand Satisfaction").unwrap();
        assert!(!check.passed);
        assert!(check.message.contains("2033"));
        assert_eq!(
            check_demand_satisfaction(&solution.yearly).message,
            "Shortage in years: [2033]"
        );
        // other checks are unaffected
        assert!(report.get("NPC Breakdown").unwrap().passed);
    }
}

mod case_loading {
    use super::*;
    use std::fs;

    /// Case files layer over the base file and aliases resolve.
    #[test]
    fn test_layered_case_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("base.toml"),
            r#"
            [economy]
            fuel_price = 650.0

            [operations]
            travel_time_hours = 1.0
            setup_time_hours = 2.0
            "#,
        )
        .unwrap();
        fs::write(
            dir.path().join("case_2_ulsan.toml"),
            r#"
            case_name = "Ulsan direct supply"

            [operations]
            has_storage_at_busan = false
            travel_time_hours = 3.93

            [tank_storage]
            enabled = false
            "#,
        )
        .unwrap();

        let params = Parameters::load_case(dir.path(), "case_2").unwrap();
        assert_eq!(params.case_id, "case_2");
        assert_eq!(params.topology(), Topology::RemoteSupply);
        assert_eq!(params.operations.travel_time_hours, 3.93);
        assert_eq!(params.operations.setup_time_hours, 2.0);
        assert_eq!(params.economy.fuel_price, 650.0);
        assert!(!params.tank_storage.enabled);
    }

    /// Invalid values are reported before any solve.
    #[test]
    fn test_invalid_case_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.toml"), "[economy]\ndiscount_rate = 2.0\n").unwrap();
        fs::write(dir.path().join("case_1.toml"), "").unwrap();
        let err = Parameters::load_case(dir.path(), "case_1").unwrap_err();
        assert!(err.to_string().contains("discount_rate"));
    }

    /// A missing case file is an I/O error naming the path.
    #[test]
    fn test_missing_case_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.toml"), "").unwrap();
        let err = Parameters::load_case(dir.path(), "case_3").unwrap_err();
        assert!(err.to_string().contains("case_3_yeosu.toml"));
    }

    /// Bundles survive a TOML round trip.
    #[test]
    fn test_toml_round_trip() {
        let params = remote_supply();
        let text = toml::to_string(&params).unwrap();
        let back = Parameters::from_toml_str(&text).unwrap();
        assert_eq!(back, params);
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("has_storage_at_busan"));
    }
}
