use consumption_model::{Measurement, Unit};
use serde::Deserialize;

/// When a view is shown in kWh instead of Wh.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct UnitPolicy {
    /// A view switches to kWh when any cell is strictly above this.
    pub kwh_threshold: f64,
    pub kwh_divisor: f64,
}

impl Default for UnitPolicy {
    fn default() -> Self {
        Self {
            kwh_threshold: 5000.0,
            kwh_divisor: 1000.0,
        }
    }
}

impl UnitPolicy {
    pub fn unit_for(&self, measurements: &[Measurement]) -> Unit {
        let exceeds = measurements
            .iter()
            .any(|m| m.zones().iter().any(|v| *v > self.kwh_threshold));
        if exceeds {
            Unit::KilowattHour
        } else {
            Unit::WattHour
        }
    }

    /// Pick the unit for a freshly aggregated table and scale it in place.
    pub fn apply(&self, measurements: &mut [Measurement]) -> Unit {
        let unit = self.unit_for(measurements);
        if unit == Unit::KilowattHour {
            for m in measurements.iter_mut() {
                *m = m.map(|v| v / self.kwh_divisor);
            }
        }
        unit
    }
}
