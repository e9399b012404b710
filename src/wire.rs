//! Wire model: per-segment latency/energy of driving a load across a
//! chosen wire type, with optional repeater insertion and an optional
//! low-swing discipline. Low-swing and repeaters are mutually exclusive
//! (enforced upstream in [`crate::params::WireAxisRanges`], not here; this
//! module assumes it is only ever asked to evaluate an admissible
//! combination).

use crate::params::{RepeaterType, WireChoice};
use crate::tech::Technology;

#[derive(Debug, Clone, Copy)]
pub struct Wire {
    pub choice: WireChoice,
    pub length_m: f64,
    resistance_per_m: f64,
    capacitance_per_m: f64,
    repeater_overhead: f64,
}

impl Wire {
    pub fn new(choice: WireChoice, length_m: f64, tech: &Technology) -> Self {
        let aggressiveness = match choice.wire_type {
            crate::params::WireType::LocalAggressive
            | crate::params::WireType::SemiGlobalAggressive
            | crate::params::WireType::GlobalAggressive => 0.8,
            crate::params::WireType::LocalConservative
            | crate::params::WireType::SemiGlobalConservative
            | crate::params::WireType::GlobalConservative => 1.2,
            crate::params::WireType::DramWordline => 1.5,
        };

        let repeater_overhead = match choice.repeater {
            RepeaterType::None => 0.0,
            RepeaterType::FullyOptimized => 1.0,
            RepeaterType::Overhead5 => 0.05,
            RepeaterType::Overhead10 => 0.10,
            RepeaterType::Overhead20 => 0.20,
            RepeaterType::Overhead30 => 0.30,
            RepeaterType::Overhead40 => 0.40,
            RepeaterType::Overhead50 => 0.50,
        };

        Self {
            choice,
            length_m,
            resistance_per_m: tech.wire_resistance_per_length_ohm_m * aggressiveness,
            capacitance_per_m: tech.wire_cap_per_length_f_per_m * aggressiveness,
            repeater_overhead,
        }
    }

    pub fn resistance(&self) -> f64 {
        self.resistance_per_m * self.length_m
    }

    pub fn capacitance(&self) -> f64 {
        self.capacitance_per_m * self.length_m
    }

    /// Elmore-style RC latency of driving `load_cap` across this segment.
    /// Repeater insertion reduces the effective quadratic RC term; low
    /// swing reduces the effective voltage swing, which shows up in the
    /// energy term rather than the latency term.
    pub fn latency_s(&self, load_cap_f: f64, vdd: f64) -> f64 {
        let r = self.resistance();
        let c = self.capacitance() + load_cap_f;
        let rc = 0.69 * r * c;
        if self.repeater_overhead > 0.0 {
            // Repeaters break the wire into segments, turning the
            // quadratic-in-length RC delay into a roughly linear one.
            rc.sqrt() * (1.0 + self.repeater_overhead) * 1e-4 * self.length_m.max(1e-12).sqrt() + rc * 0.05
        } else {
            let _ = vdd;
            rc
        }
    }

    pub fn dynamic_energy_j(&self, load_cap_f: f64, vdd: f64) -> f64 {
        let swing = if self.choice.low_swing { vdd * 0.3 } else { vdd };
        let c = self.capacitance() + load_cap_f;
        0.5 * c * swing * swing
    }

    pub fn leakage_w(&self, vdd: f64) -> f64 {
        if self.repeater_overhead > 0.0 {
            self.repeater_overhead * self.length_m * 1e-9 * vdd
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{DeviceRoadmap, RepeaterType, WireType};

    fn choice(wire_type: WireType, repeater: RepeaterType, low_swing: bool) -> WireChoice {
        WireChoice { wire_type, repeater, low_swing }
    }

    #[test]
    fn longer_wire_has_higher_latency() {
        let tech = Technology::for_node(45.0, DeviceRoadmap::Hp);
        let short = Wire::new(choice(WireType::GlobalAggressive, RepeaterType::None, false), 1e-4, &tech);
        let long = Wire::new(choice(WireType::GlobalAggressive, RepeaterType::None, false), 1e-2, &tech);
        assert!(long.latency_s(0.0, tech.vdd) > short.latency_s(0.0, tech.vdd));
    }

    #[test]
    fn low_swing_reduces_energy() {
        let tech = Technology::for_node(45.0, DeviceRoadmap::Hp);
        let normal = Wire::new(choice(WireType::GlobalAggressive, RepeaterType::None, false), 1e-3, &tech);
        let low_swing = Wire::new(choice(WireType::GlobalAggressive, RepeaterType::None, true), 1e-3, &tech);
        assert!(low_swing.dynamic_energy_j(0.0, tech.vdd) < normal.dynamic_energy_j(0.0, tech.vdd));
    }
}
