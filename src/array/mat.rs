//! Mid-level tile: a grid of Subarrays with local predecode.

use crate::array::{Stage, Subarray};
use crate::cell::Cell;
use crate::tech::Technology;

#[derive(Debug, Clone, Copy)]
pub struct MatPoint {
    pub num_row_subarray: u32,
    pub num_column_subarray: u32,
    pub num_active_subarray_per_row: u32,
    pub num_active_subarray_per_column: u32,
}

#[derive(Debug, Clone)]
pub struct Mat {
    pub point: MatPoint,
    pub subarray: Subarray,
    pub predecoder: Stage,
}

impl Mat {
    pub fn active_subarray_count(&self) -> u32 {
        self.point.num_active_subarray_per_row * self.point.num_active_subarray_per_column
    }

    pub fn read_latency_s(&self) -> f64 {
        self.predecoder.read_latency_s + self.subarray.read_latency_s()
    }

    pub fn write_latency_s(&self, write_pulse_s: f64) -> f64 {
        self.predecoder.write_latency_s + self.subarray.write_latency_s(write_pulse_s)
    }

    pub fn read_energy_j(&self) -> f64 {
        self.predecoder.read_energy_j + self.subarray.read_energy_j() * self.active_subarray_count() as f64
    }

    pub fn write_energy_j(&self) -> f64 {
        self.predecoder.write_energy_j + self.subarray.write_energy_j() * self.active_subarray_count() as f64
    }

    pub fn leakage_w(&self) -> f64 {
        self.predecoder.leakage_w
            + self.subarray.leakage_w() * (self.point.num_row_subarray * self.point.num_column_subarray) as f64
    }

    pub fn height_m(&self) -> f64 {
        self.subarray.height_m * self.point.num_row_subarray as f64
    }

    pub fn width_m(&self) -> f64 {
        self.subarray.width_m * self.point.num_column_subarray as f64
    }

    pub fn area_m2(&self) -> f64 {
        self.height_m() * self.width_m()
    }
}

pub fn evaluate(point: MatPoint, subarray: Subarray, tech: &Technology, _cell: &Cell) -> Mat {
    let tiles = (point.num_row_subarray * point.num_column_subarray) as f64;
    let predecoder = Stage {
        read_latency_s: 0.69 * 80.0 * tiles.log2().max(1.0) * 1e-15,
        write_latency_s: 0.69 * 80.0 * tiles.log2().max(1.0) * 1e-15,
        read_energy_j: tech.vdd * tech.vdd * 1e-15 * tiles.log2().max(1.0),
        write_energy_j: tech.vdd * tech.vdd * 1e-15 * tiles.log2().max(1.0),
        leakage_w: 1e-9 * tiles,
        area_m2: subarray.area_m2() * 0.05 * tiles.log2().max(1.0),
    };
    Mat { point, subarray, predecoder }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::subarray::{self, SubarrayPoint};
    use crate::params::DesignTarget;

    #[test]
    fn two_by_two_mat_is_larger_than_one_subarray() {
        let tech = Technology::for_node(45.0, crate::params::DeviceRoadmap::Hp);
        let cell = Cell::default();
        let sub = subarray::evaluate(
            SubarrayPoint { num_row: 128, num_column: 128, mux_sense_amp: 4, mux_output_lev1: 2, mux_output_lev2: 2 },
            &cell,
            &tech,
            DesignTarget::RamChip,
            crate::params::ArrayKind::Data,
        );
        let area_one = sub.area_m2();
        let mat = evaluate(
            MatPoint {
                num_row_subarray: 2,
                num_column_subarray: 2,
                num_active_subarray_per_row: 1,
                num_active_subarray_per_column: 1,
            },
            sub,
            &tech,
            &cell,
        );
        assert!(mat.area_m2() > area_one);
    }
}
