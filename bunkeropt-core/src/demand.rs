//! Annual bunkering demand driven by the number of ammonia-fuelled vessels.
//!
//! The vessel count grows linearly between the first and last planning year
//! and is rounded to whole vessels each year:
//!
//! $$n(y) = \mathrm{round}\left(n_0 + (n_1 - n_0)\frac{y - y_0}{y_1 - y_0}\right)$$
//!
//! Annual demand is `n(y) · m3_per_voyage · voyages_per_year`.

use crate::parameters::Parameters;

/// Year-indexed demand series for one parameter bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandProjection {
    pub start_year: i32,
    /// Vessels in service per year, starting at `start_year`.
    pub vessels: Vec<u32>,
    /// Annual demand per year (m³).
    pub demand_m3: Vec<f64>,
    /// Ammonia volume per voyage (m³).
    pub m3_per_voyage: f64,
}

impl DemandProjection {
    pub fn from_parameters(params: &Parameters) -> Self {
        let start_year = params.time_period.start_year;
        let end_year = params.time_period.end_year;
        let shipping = &params.shipping;

        let m3_per_voyage = shipping.kg_per_voyage / (params.ammonia.density_storage * 1000.0);
        let vessels: Vec<u32> = params
            .time_period
            .years()
            .map(|year| {
                vessel_count(
                    year,
                    start_year,
                    end_year,
                    shipping.start_vessels,
                    shipping.end_vessels,
                )
            })
            .collect();
        let demand_m3 = vessels
            .iter()
            .map(|n| f64::from(*n) * m3_per_voyage * shipping.voyages_per_year)
            .collect();

        Self {
            start_year,
            vessels,
            demand_m3,
            m3_per_voyage,
        }
    }

    pub fn len(&self) -> usize {
        self.demand_m3.len()
    }

    pub fn is_empty(&self) -> bool {
        self.demand_m3.is_empty()
    }

    /// Demand in `year`, or `None` outside the planning window.
    pub fn demand(&self, year: i32) -> Option<f64> {
        let index = usize::try_from(year - self.start_year).ok()?;
        self.demand_m3.get(index).copied()
    }

    /// Total demand over the horizon (m³).
    pub fn total(&self) -> f64 {
        self.demand_m3.iter().sum()
    }
}

/// Rounded linear interpolation of the vessel count for `year`.
///
/// A single-year horizon uses the start count.
pub fn vessel_count(year: i32, start_year: i32, end_year: i32, start: u32, end: u32) -> u32 {
    if end_year <= start_year {
        return start;
    }
    let fraction = f64::from(year - start_year) / f64::from(end_year - start_year);
    let count = f64::from(start) + (f64::from(end) - f64::from(start)) * fraction;
    count.round().max(0.0) as u32
}
