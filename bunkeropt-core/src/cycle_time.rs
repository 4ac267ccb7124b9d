//! Per-trip timing of a shuttle for a (shuttle size, pump rate) candidate.
//!
//! With `T` the one-way travel time, `σ` the setup time at each endpoint,
//! `V` the call volume, `S` the shuttle size and `P` the pump rate:
//!
//! - **Port storage (C1)**: a call needs `⌈V/S⌉` trips and one cycle is
//!   `shore + T + σ + 2·S/P + σ + T`. The `2·S/P` term covers pumping the
//!   shuttle's own volume in and out.
//! - **Remote supply (C2/C3)**: one trip serves `max(1, ⌊S/V⌋)` vessels,
//!   each taking `movement + σ + V/P + σ`, and one cycle is
//!   `shore + T + entry + vessels · per_vessel + exit + T`.
//!
//! The call duration is `trips_per_call · cycle` in both topologies.

use crate::parameters::{Parameters, Topology};
use serde::Serialize;

/// Full time decomposition of one shuttle cycle (all durations in hours).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleTime {
    pub topology: Topology,
    pub shuttle_size: f64,
    pub pump_size: f64,
    pub shore_loading: f64,
    pub travel_outbound: f64,
    pub travel_return: f64,
    pub setup_inbound: f64,
    pub setup_outbound: f64,
    /// Port entry and exit, remote supply only.
    pub port_entry: f64,
    pub port_exit: f64,
    /// Berth movement per served vessel, remote supply only.
    pub vessel_movement: f64,
    /// `V/P`, the time to pump one call.
    pub pumping_per_vessel: f64,
    /// Pumping time accumulated over one cycle.
    pub pumping_total: f64,
    /// Time spent at the destination per call (C1) or per served vessel (C2/C3).
    pub destination_time: f64,
    pub vessels_per_trip: u32,
    /// Kept fractional: `1/vessels_per_trip` for remote supply.
    pub trips_per_call: f64,
    /// Cycle without shore loading.
    pub basic_cycle: f64,
    pub cycle: f64,
    pub call_duration: f64,
}

impl CycleTime {
    /// Decompose the cycle of a shuttle of `shuttle_size` m³ with a `pump_size` m³/h pump.
    pub fn calculate(params: &Parameters, shuttle_size: f64, pump_size: f64) -> Self {
        let ops = &params.operations;
        let volume = params.bunkering.bunker_volume_per_call;
        let travel = ops.travel_time_hours;
        let setup = ops.setup_time_hours;
        let shore_loading = params.shore_supply.loading_time(shuttle_size);
        let pumping_per_vessel = volume / pump_size;

        let topology = params.topology();
        let (vessels_per_trip, trips_per_call, pumping_total, destination_time, basic_cycle) =
            match topology {
                Topology::PortStorage => {
                    let trips = (volume / shuttle_size).ceil();
                    let pumping = 2.0 * shuttle_size / pump_size;
                    let destination = setup + pumping_per_vessel + setup;
                    let basic = travel + setup + pumping + setup + travel;
                    (1, trips, pumping, destination, basic)
                }
                Topology::RemoteSupply => {
                    let vessels = vessels_per_trip(shuttle_size, volume);
                    let per_vessel = ops.vessel_movement_hours + setup + pumping_per_vessel + setup;
                    let basic = travel
                        + ops.port_entry_hours
                        + f64::from(vessels) * per_vessel
                        + ops.port_exit_hours
                        + travel;
                    (
                        vessels,
                        1.0 / f64::from(vessels),
                        f64::from(vessels) * pumping_per_vessel,
                        per_vessel,
                        basic,
                    )
                }
            };

        let remote = topology == Topology::RemoteSupply;
        let cycle = shore_loading + basic_cycle;
        Self {
            topology,
            shuttle_size,
            pump_size,
            shore_loading,
            travel_outbound: travel,
            travel_return: travel,
            setup_inbound: setup,
            setup_outbound: setup,
            port_entry: if remote { ops.port_entry_hours } else { 0.0 },
            port_exit: if remote { ops.port_exit_hours } else { 0.0 },
            vessel_movement: if remote { ops.vessel_movement_hours } else { 0.0 },
            pumping_per_vessel,
            pumping_total,
            destination_time,
            vessels_per_trip,
            trips_per_call,
            basic_cycle,
            cycle,
            call_duration: trips_per_call * cycle,
        }
    }

    /// Whether a call can be completed within `max_call_duration_hours`.
    pub fn within_call_limit(&self, max_call_duration_hours: f64) -> bool {
        self.call_duration <= max_call_duration_hours
    }

    /// Cycles one shuttle can complete in `max_annual_hours`.
    pub fn annual_cycles(&self, max_annual_hours: f64) -> f64 {
        max_annual_hours / self.cycle
    }

    /// Calls (C1) or trips (C2/C3) one shuttle can serve in `max_annual_hours`.
    pub fn max_annual_activity(&self, max_annual_hours: f64) -> f64 {
        max_annual_hours / (self.trips_per_call * self.cycle)
    }
}

/// Vessels served on one remote-supply trip, `max(1, ⌊S/V⌋)`.
pub fn vessels_per_trip(shuttle_size: f64, bunker_volume: f64) -> u32 {
    // Nudge exact multiples that land just below an integer
    let ratio = (shuttle_size / bunker_volume + 1e-9).floor();
    (ratio as u32).max(1)
}
