//! Process-node technology constants.
//!
//! The analytic coefficients below are the per-node constants every
//! CACTI/NVSim-derived tool keys off of (supply voltage, wire pitch,
//! junction capacitance per transistor width, etc). One `Technology`
//! value is built per roadmap/node pair and feeds every wire and tile
//! evaluation; the exact numeric derivation is left as a closed-form
//! scale-by-feature-size model rather than re-deriving SPICE-level
//! coefficients.

use crate::params::DeviceRoadmap;

#[derive(Debug, Clone, Copy)]
pub struct Technology {
    pub feature_size_m: f64,
    pub vdd: f64,
    pub cap_per_width_f_per_m: f64,
    pub resistance_per_width_ohm_m: f64,
    pub wire_resistance_per_length_ohm_m: f64,
    pub wire_cap_per_length_f_per_m: f64,
}

impl Technology {
    /// Build the per-node constants for one (process node, roadmap) pair.
    /// Scales a 90 nm/LOP reference point by feature size, matching the
    /// way CACTI's technology tables are structured (one row per node).
    pub fn for_node(node_nm: f64, roadmap: DeviceRoadmap) -> Self {
        let feature_size_m = node_nm * 1e-9;
        let scale = feature_size_m / 90e-9;

        let (vdd, cap_factor, res_factor) = match roadmap {
            DeviceRoadmap::Hp => (1.1, 1.0, 0.8),
            DeviceRoadmap::Lop => (1.0, 1.1, 1.0),
            DeviceRoadmap::Lstp => (1.0, 1.2, 1.3),
            DeviceRoadmap::Igzo => (0.9, 0.7, 1.6),
            DeviceRoadmap::Cnt => (0.8, 0.6, 0.5),
        };

        Self {
            feature_size_m,
            vdd,
            cap_per_width_f_per_m: 2.0e-9 * cap_factor,
            resistance_per_width_ohm_m: 5.0e3 * res_factor / scale,
            wire_resistance_per_length_ohm_m: 0.1 / scale,
            wire_cap_per_length_f_per_m: 2.0e-10 * scale,
        }
    }

    /// Off-state leakage current of a single minimum-width device at the
    /// given temperature and width, used by [`crate::cell::apply_pvt`] and
    /// by bank-level leakage accumulation.
    pub fn leakage_current(&self, width_m: f64, temperature_k: f64) -> f64 {
        let thermal_factor = (temperature_k / 300.0).powf(1.5);
        1.0e-9 * width_m / self.feature_size_m * thermal_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smaller_node_has_smaller_feature_size() {
        let t45 = Technology::for_node(45.0, DeviceRoadmap::Hp);
        let t90 = Technology::for_node(90.0, DeviceRoadmap::Hp);
        assert!(t45.feature_size_m < t90.feature_size_m);
    }

    #[test]
    fn leakage_increases_with_temperature() {
        let tech = Technology::for_node(45.0, DeviceRoadmap::Hp);
        let cold = tech.leakage_current(1e-7, 300.0);
        let hot = tech.leakage_current(1e-7, 400.0);
        assert!(hot > cold);
    }
}
