//! Operating envelope of the shuttle fleet.

use serde::{Deserialize, Serialize};

/// Timing and sizing rules of shuttle operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OperationsParameters {
    /// One-way travel time between the loading point and the bunkering area (h).
    ///
    /// Default: 1.0 h
    pub travel_time_hours: f64,

    /// One-way distance matching `travel_time_hours` (nautical miles).
    ///
    /// Only used to derive transit speed for distance sweeps.
    ///
    /// Default: unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_nm: Option<f64>,

    /// Hose connection, purge and disconnection time at each endpoint (h).
    ///
    /// Default: 2.0 h
    pub setup_time_hours: f64,

    /// Operating hours available per shuttle per year.
    ///
    /// Default: 8000.0 h
    pub max_annual_hours_per_vessel: f64,

    /// Port storage volume held per unit of shuttle capacity.
    ///
    /// Default: 2.0
    pub tank_safety_factor: f64,

    /// Ratio of peak-day demand to average-day demand.
    ///
    /// Default: 1.5
    pub daily_peak_factor: f64,

    /// Topology tag: `true` for port-resident storage (C1), `false` for
    /// direct supply from a remote production site (C2/C3).
    ///
    /// Default: true
    pub has_storage_at_busan: bool,

    /// Port entry time per remote-supply trip (h).
    ///
    /// Default: 1.0 h
    pub port_entry_hours: f64,

    /// Port exit time per remote-supply trip (h).
    ///
    /// Default: 1.0 h
    pub port_exit_hours: f64,

    /// Berth-to-berth movement per served vessel on remote-supply trips (h).
    ///
    /// Default: 1.0 h
    pub vessel_movement_hours: f64,
}

impl Default for OperationsParameters {
    fn default() -> Self {
        Self {
            travel_time_hours: 1.0,
            distance_nm: None,
            setup_time_hours: 2.0,
            max_annual_hours_per_vessel: 8000.0,
            tank_safety_factor: 2.0,
            daily_peak_factor: 1.5,
            has_storage_at_busan: true,
            port_entry_hours: 1.0,
            port_exit_hours: 1.0,
            vessel_movement_hours: 1.0,
        }
    }
}

/// Hard limits on individual bunkering calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConstraintParameters {
    /// Longest acceptable time to complete one call (h).
    ///
    /// Default: 72.0 h
    pub max_call_duration_hours: f64,
}

impl Default for ConstraintParameters {
    fn default() -> Self {
        Self {
            max_call_duration_hours: 72.0,
        }
    }
}

/// Shore-side loading of the shuttle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShoreSupplyParameters {
    /// Whether shuttle loading time at the shore terminal is modelled.
    ///
    /// Default: true
    pub enabled: bool,

    /// Shore pump rate (m³/h).
    ///
    /// Default: 1500.0
    pub pump_rate_m3ph: f64,

    /// Additional fixed time per loading (h).
    ///
    /// Default: 0.0
    pub loading_time_fixed_hours: f64,
}

impl ShoreSupplyParameters {
    /// Time to fill a shuttle of `shuttle_size` m³, zero when disabled.
    pub fn loading_time(&self, shuttle_size: f64) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        shuttle_size / self.pump_rate_m3ph + self.loading_time_fixed_hours
    }
}

impl Default for ShoreSupplyParameters {
    fn default() -> Self {
        Self {
            enabled: true,
            pump_rate_m3ph: 1500.0,
            loading_time_fixed_hours: 0.0,
        }
    }
}
