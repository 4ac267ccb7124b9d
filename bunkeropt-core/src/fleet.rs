//! Minimum integer fleet for a given demand.
//!
//! Two requirements bound the fleet:
//!
//! 1. Working time: `activity · trips_per_call · cycle ≤ N · H_max`.
//! 2. Daily peak: `N · (H_max / cycle) / 365 · S ≥ (activity / 365) · volume · peak_factor`.
//!
//! `activity` counts calls on port storage and trips on remote supply, and
//! `volume` is the matching delivery volume (`V` or `S`).

use crate::cycle_time::CycleTime;
use crate::parameters::Parameters;
use serde::Serialize;
use std::fmt;

const DAYS_PER_YEAR: f64 = 365.0;

/// Tolerance applied before rounding fractional requirements up.
const CEIL_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingConstraint {
    WorkingTime,
    DailyPeak,
}

impl fmt::Display for BindingConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingConstraint::WorkingTime => f.write_str("working_time"),
            BindingConstraint::DailyPeak => f.write_str("daily_peak"),
        }
    }
}

/// Fleet needed for one year and the constraint that sets it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FleetRequirement {
    /// Fractional fleet implied by working hours.
    pub working_time: f64,
    /// Fractional fleet implied by the peak day.
    pub daily_peak: f64,
    pub required: u32,
    pub binding: BindingConstraint,
}

/// Sizes the shuttle fleet of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FleetSizer {
    cycle: f64,
    trips_per_call: f64,
    shuttle_size: f64,
    delivery_volume: f64,
    max_annual_hours: f64,
    daily_peak_factor: f64,
}

impl FleetSizer {
    pub fn new(params: &Parameters, cycle_time: &CycleTime) -> Self {
        Self {
            cycle: cycle_time.cycle,
            trips_per_call: cycle_time.trips_per_call,
            shuttle_size: cycle_time.shuttle_size,
            delivery_volume: params
                .topology()
                .delivery_volume(params.bunkering.bunker_volume_per_call, cycle_time.shuttle_size),
            max_annual_hours: params.operations.max_annual_hours_per_vessel,
            daily_peak_factor: params.operations.daily_peak_factor,
        }
    }

    /// Calls (C1) or trips (C2/C3) needed to deliver `demand_m3`.
    pub fn annual_activity(&self, demand_m3: f64) -> f64 {
        demand_m3 / self.delivery_volume
    }

    /// Fractional fleet from working hours alone.
    pub fn working_time_fleet(&self, activity: f64) -> f64 {
        activity * self.trips_per_call * self.cycle / self.max_annual_hours
    }

    /// Fractional fleet from the peak-day delivery requirement.
    pub fn daily_peak_fleet(&self, activity: f64) -> f64 {
        let peak_day_volume = activity / DAYS_PER_YEAR * self.delivery_volume * self.daily_peak_factor;
        let per_shuttle_day = self.max_annual_hours / self.cycle / DAYS_PER_YEAR * self.shuttle_size;
        peak_day_volume / per_shuttle_day
    }

    /// Working-time-only fleet, `⌈activity · trips_per_call · cycle / H_max⌉`.
    pub fn working_time_only(&self, activity: f64) -> u32 {
        ceil_count(self.working_time_fleet(activity))
    }

    /// Fleet satisfying both working time and the daily peak.
    pub fn with_daily_peak(&self, activity: f64) -> FleetRequirement {
        let working_time = self.working_time_fleet(activity);
        let daily_peak = self.daily_peak_fleet(activity);
        let binding = if daily_peak > working_time {
            BindingConstraint::DailyPeak
        } else {
            BindingConstraint::WorkingTime
        };
        FleetRequirement {
            working_time,
            daily_peak,
            required: ceil_count(working_time.max(daily_peak)),
            binding,
        }
    }

    /// Fleet requirement for a demand in m³.
    pub fn for_demand(&self, demand_m3: f64) -> FleetRequirement {
        self.with_daily_peak(self.annual_activity(demand_m3))
    }
}

/// Tanks needed to back `fleet` shuttles, `⌈N · S · β / tank_volume⌉`.
pub fn tanks_required(fleet: u32, shuttle_size: f64, safety_factor: f64, tank_volume_m3: f64) -> u32 {
    ceil_count(f64::from(fleet) * shuttle_size * safety_factor / tank_volume_m3)
}

fn ceil_count(value: f64) -> u32 {
    (value - CEIL_TOLERANCE).ceil().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizer(params: &Parameters, shuttle: f64, pump: f64) -> FleetSizer {
        FleetSizer::new(params, &CycleTime::calculate(params, shuttle, pump))
    }

    #[test]
    fn working_time_rounds_up() {
        let params = Parameters::default();
        let ct = CycleTime::calculate(&params, 5000.0, 1000.0);
        let fleet = FleetSizer::new(&params, &ct);
        let calls_for_one_shuttle = 8000.0 / ct.cycle;
        assert_eq!(fleet.working_time_only(calls_for_one_shuttle), 1);
        assert_eq!(fleet.working_time_only(calls_for_one_shuttle * 1.01), 2);
        assert_eq!(fleet.working_time_only(0.0), 0);
    }

    #[test]
    fn peak_binds_when_shuttle_is_smaller_than_call() {
        let params = Parameters::default();
        // C1 with 2 500 m3 shuttles: two trips per call, S < V
        let fleet = sizer(&params, 2500.0, 1000.0);
        let requirement = fleet.with_daily_peak(1000.0);
        // peak/working = V·F / (tpc·S) = 5000·1.5 / (2·2500) = 1.5
        assert!((requirement.daily_peak / requirement.working_time - 1.5).abs() < 1e-12);
        assert_eq!(requirement.binding, BindingConstraint::DailyPeak);
        assert!(f64::from(requirement.required) >= requirement.daily_peak);
    }

    #[test]
    fn remote_supply_counts_trips() {
        let mut params = Parameters::default();
        params.operations.has_storage_at_busan = false;
        let fleet = sizer(&params, 25_000.0, 1000.0);
        assert_eq!(fleet.annual_activity(250_000.0), 10.0);
    }

    #[test]
    fn tank_requirement() {
        assert_eq!(tanks_required(0, 5000.0, 2.0, 44_117.6), 0);
        assert_eq!(tanks_required(4, 5000.0, 2.0, 44_117.6), 1);
        assert_eq!(tanks_required(5, 5000.0, 2.0, 44_117.6), 2);
    }
}
