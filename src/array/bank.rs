//! Top-level memory tile: a grid of Mats with H-tree or non-H-tree routing.
//! A Bank owns its Mat but does not own the local/global
//! [`crate::wire::Wire`] instances; those are evaluated by the caller and
//! threaded in as borrowed parameters, since the search driver is what owns
//! them alongside the Bank.

use crate::array::{Mat, Stage};
use crate::cell::{Cell, CellType};
use crate::params::{DesignTarget, RoutingMode};
use crate::wire::Wire;

#[derive(Debug, Clone, Copy)]
pub struct BankPoint {
    pub num_row_mat: u32,
    pub num_column_mat: u32,
    pub num_active_mat_per_row: u32,
    pub num_active_mat_per_column: u32,
    pub num_row_per_set: u32,
}

#[derive(Debug, Clone)]
pub struct Bank {
    pub point: BankPoint,
    pub mat: Mat,
    pub routing_mode: RoutingMode,
    pub routing: Stage,
    pub refresh: Option<Stage>,
}

impl Bank {
    pub fn active_mat_count(&self) -> u32 {
        self.point.num_active_mat_per_row * self.point.num_active_mat_per_column
    }

    pub fn read_latency_s(&self) -> f64 {
        self.mat.read_latency_s() + self.routing.read_latency_s
    }

    pub fn write_latency_s(&self, write_pulse_s: f64) -> f64 {
        self.mat.write_latency_s(write_pulse_s) + self.routing.write_latency_s
    }

    pub fn read_dynamic_energy_j(&self) -> f64 {
        self.mat.read_energy_j() * self.active_mat_count() as f64 + self.routing.read_energy_j
    }

    pub fn write_dynamic_energy_j(&self) -> f64 {
        self.mat.write_energy_j() * self.active_mat_count() as f64 + self.routing.write_energy_j
    }

    pub fn leakage_w(&self) -> f64 {
        self.mat.leakage_w() * (self.point.num_row_mat * self.point.num_column_mat) as f64 + self.routing.leakage_w
    }

    pub fn height_m(&self) -> f64 {
        self.mat.height_m() * self.point.num_row_mat as f64
    }

    pub fn width_m(&self) -> f64 {
        self.mat.width_m() * self.point.num_column_mat as f64
    }

    pub fn area_m2(&self) -> f64 {
        self.height_m() * self.width_m()
    }

    pub fn refresh_latency_s(&self) -> f64 {
        self.refresh.map(|r| r.read_latency_s).unwrap_or(0.0)
    }

    pub fn refresh_dynamic_energy_j(&self) -> f64 {
        self.refresh.map(|r| r.read_energy_j).unwrap_or(0.0)
    }

    /// `refresh_power = refresh_energy / retention_time`.
    pub fn refresh_power_w(&self, retention_time_s: Option<f64>) -> Option<f64> {
        match (self.refresh, retention_time_s) {
            (Some(r), Some(t)) if t > 0.0 => Some(r.read_energy_j / t),
            _ => None,
        }
    }

    /// `readBandwidth = blockSize / (subarray.readLatency - rowDecoder.readLatency
    /// + precharger.readLatency) / 8`, scaled by log2(levels) for MLC.
    pub fn read_bandwidth_bps(&self, block_size_bits: u64, cell: &Cell) -> f64 {
        let denom = self.mat.subarray.read_latency_s() - self.mat.subarray.row_decoder.read_latency_s
            + self.mat.subarray.precharger.read_latency_s;
        if denom <= 0.0 {
            return 0.0;
        }
        let bw = (block_size_bits as f64) / denom / 8.0;
        if cell.kind.is_mlc() {
            bw * (cell.n_lvl as f64).log2().max(1.0)
        } else {
            bw
        }
    }

    pub fn write_bandwidth_bps(&self, block_size_bits: u64, write_pulse_s: f64) -> f64 {
        let latency = self.write_latency_s(write_pulse_s);
        if latency <= 0.0 {
            0.0
        } else {
            (block_size_bits as f64) / latency / 8.0
        }
    }
}

/// Evaluate a fully-specified Bank tile: mats, the chosen routing model,
/// and (for DRAM-family cells) refresh.
pub fn evaluate(
    point: BankPoint,
    mat: Mat,
    routing_mode: RoutingMode,
    local_wire: &Wire,
    global_wire: &Wire,
    cell: &Cell,
    design_target: DesignTarget,
) -> Bank {
    let _ = design_target;
    let num_tiles = (point.num_row_mat * point.num_column_mat) as f64;
    let load_cap = mat.subarray.bitline.read_energy_j / (mat.subarray.bitline.read_energy_j + 1.0).max(1.0) * 1e-13;

    let routing = match routing_mode {
        RoutingMode::HTree => {
            // An H-tree hops mat-to-mat on the local wire through
            // log2(num_tiles) levels, then crosses the bank on the global
            // wire once at the root.
            let levels = num_tiles.log2().max(1.0);
            let local_latency = local_wire.latency_s(load_cap, 1.0) * levels;
            let local_energy = local_wire.dynamic_energy_j(load_cap, 1.0) * levels;
            Stage {
                read_latency_s: local_latency + global_wire.latency_s(load_cap, 1.0),
                write_latency_s: local_latency + global_wire.latency_s(load_cap, 1.0),
                read_energy_j: local_energy + global_wire.dynamic_energy_j(load_cap, 1.0),
                write_energy_j: local_energy + global_wire.dynamic_energy_j(load_cap, 1.0),
                leakage_w: local_wire.leakage_w(1.0) * levels + global_wire.leakage_w(1.0),
                area_m2: (local_wire.length_m * levels + global_wire.length_m) * 1e-7,
            }
        }
        RoutingMode::NonHTree => {
            // Orthogonal routing: a row run on the local wire plus a
            // column run on the global wire, no recursive fan-out.
            Stage {
                read_latency_s: local_wire.latency_s(load_cap, 1.0) + global_wire.latency_s(load_cap, 1.0),
                write_latency_s: local_wire.latency_s(load_cap, 1.0) + global_wire.latency_s(load_cap, 1.0),
                read_energy_j: local_wire.dynamic_energy_j(load_cap, 1.0) + global_wire.dynamic_energy_j(load_cap, 1.0),
                write_energy_j: local_wire.dynamic_energy_j(load_cap, 1.0) + global_wire.dynamic_energy_j(load_cap, 1.0),
                leakage_w: local_wire.leakage_w(1.0) + global_wire.leakage_w(1.0),
                area_m2: (local_wire.length_m + global_wire.length_m) * 1e-7,
            }
        }
    };

    let refresh = if cell.kind.is_dram_family() {
        Some(Stage {
            read_latency_s: mat.subarray.read_latency_s() * num_tiles.sqrt(),
            write_latency_s: 0.0,
            read_energy_j: mat.subarray.read_energy_j() * num_tiles,
            write_energy_j: 0.0,
            leakage_w: 0.0,
            area_m2: 0.0,
        })
    } else {
        None
    };

    Bank { point, mat, routing_mode, routing, refresh }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::mat::{self, MatPoint};
    use crate::array::subarray::{self, SubarrayPoint};
    use crate::params::{DeviceRoadmap, RepeaterType, WireChoice, WireType};
    use crate::tech::Technology;

    fn sample_bank(routing_mode: RoutingMode) -> Bank {
        let tech = Technology::for_node(45.0, DeviceRoadmap::Hp);
        let cell = Cell::default();
        let sub = subarray::evaluate(
            SubarrayPoint { num_row: 128, num_column: 128, mux_sense_amp: 4, mux_output_lev1: 2, mux_output_lev2: 2 },
            &cell,
            &tech,
            DesignTarget::RamChip,
            crate::params::ArrayKind::Data,
        );
        let m = mat::evaluate(
            MatPoint {
                num_row_subarray: 1,
                num_column_subarray: 1,
                num_active_subarray_per_row: 1,
                num_active_subarray_per_column: 1,
            },
            sub,
            &tech,
            &cell,
        );
        let choice = WireChoice { wire_type: WireType::GlobalAggressive, repeater: RepeaterType::None, low_swing: false };
        let local = Wire::new(choice, 1e-4, &tech);
        let global = Wire::new(choice, 1e-3, &tech);
        evaluate(
            BankPoint {
                num_row_mat: 2,
                num_column_mat: 2,
                num_active_mat_per_row: 1,
                num_active_mat_per_column: 1,
                num_row_per_set: 1,
            },
            m,
            routing_mode,
            &local,
            &global,
            &cell,
            DesignTarget::RamChip,
        )
    }

    #[test]
    fn htree_and_non_htree_both_produce_positive_latency() {
        assert!(sample_bank(RoutingMode::HTree).read_latency_s() > 0.0);
        assert!(sample_bank(RoutingMode::NonHTree).read_latency_s() > 0.0);
    }

    #[test]
    fn dram_family_cell_reports_refresh() {
        let tech = Technology::for_node(45.0, DeviceRoadmap::Hp);
        let cell = Cell { kind: CellType::EDram, ..Cell::default() };
        let sub = subarray::evaluate(
            SubarrayPoint { num_row: 128, num_column: 128, mux_sense_amp: 4, mux_output_lev1: 2, mux_output_lev2: 2 },
            &cell,
            &tech,
            DesignTarget::RamChip,
            crate::params::ArrayKind::Data,
        );
        let m = mat::evaluate(
            MatPoint {
                num_row_subarray: 1,
                num_column_subarray: 1,
                num_active_subarray_per_row: 1,
                num_active_subarray_per_column: 1,
            },
            sub,
            &tech,
            &cell,
        );
        let choice = WireChoice { wire_type: WireType::GlobalAggressive, repeater: RepeaterType::None, low_swing: false };
        let local = Wire::new(choice, 1e-4, &tech);
        let global = Wire::new(choice, 1e-3, &tech);
        let bank = evaluate(
            BankPoint {
                num_row_mat: 1,
                num_column_mat: 1,
                num_active_mat_per_row: 1,
                num_active_mat_per_column: 1,
                num_row_per_set: 1,
            },
            m,
            RoutingMode::HTree,
            &local,
            &global,
            &cell,
            DesignTarget::RamChip,
        );
        assert!(bank.refresh.is_some());
        assert!(bank.refresh_latency_s() > 0.0);
    }
}
