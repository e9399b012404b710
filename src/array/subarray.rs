//! The innermost tile: an actual rows×columns bitcell array with its
//! decoder, bitline, sense amp, mux levels, precharger, and (cache-only)
//! column decoder and tag comparator.

use crate::array::Stage;
use crate::cell::{Cell, CellType};
use crate::params::{ArrayKind, DesignTarget};
use crate::tech::Technology;

#[derive(Debug, Clone, Copy)]
pub struct SubarrayPoint {
    pub num_row: u32,
    pub num_column: u32,
    pub mux_sense_amp: u32,
    pub mux_output_lev1: u32,
    pub mux_output_lev2: u32,
}

#[derive(Debug, Clone)]
pub struct Subarray {
    pub point: SubarrayPoint,
    pub predecoder: Stage,
    pub row_decoder: Stage,
    pub bitline: Stage,
    pub sense_amp: Stage,
    pub mux: Stage,
    pub precharger: Stage,
    pub column_decoder: Stage,
    pub comparator: Stage,
    pub height_m: f64,
    pub width_m: f64,
}

impl Subarray {
    /// `read_latency` is the serial sum of every stage below it; write
    /// latency additionally folds in the cell's write-pulse duration.
    pub fn read_latency_s(&self) -> f64 {
        self.row_decoder.read_latency_s
            + self.bitline.read_latency_s
            + self.sense_amp.read_latency_s
            + self.mux.read_latency_s
            + self.precharger.read_latency_s
            + self.column_decoder.read_latency_s
            + self.comparator.read_latency_s
    }

    pub fn write_latency_s(&self, write_pulse_s: f64) -> f64 {
        self.row_decoder.write_latency_s
            + self.bitline.write_latency_s
            + self.sense_amp.write_latency_s
            + self.mux.write_latency_s
            + self.precharger.write_latency_s
            + write_pulse_s
    }

    pub fn read_energy_j(&self) -> f64 {
        self.row_decoder.read_energy_j
            + self.bitline.read_energy_j
            + self.sense_amp.read_energy_j
            + self.mux.read_energy_j
            + self.precharger.read_energy_j
            + self.column_decoder.read_energy_j
            + self.comparator.read_energy_j
    }

    pub fn write_energy_j(&self) -> f64 {
        self.row_decoder.write_energy_j
            + self.bitline.write_energy_j
            + self.sense_amp.write_energy_j
            + self.mux.write_energy_j
            + self.precharger.write_energy_j
    }

    pub fn leakage_w(&self) -> f64 {
        self.row_decoder.leakage_w
            + self.bitline.leakage_w
            + self.sense_amp.leakage_w
            + self.mux.leakage_w
            + self.precharger.leakage_w
            + self.column_decoder.leakage_w
            + self.comparator.leakage_w
    }

    pub fn area_m2(&self) -> f64 {
        self.height_m * self.width_m
    }
}

/// Build one fully-specified subarray tile and evaluate its stages.
pub fn evaluate(
    point: SubarrayPoint,
    cell: &Cell,
    tech: &Technology,
    design_target: DesignTarget,
    array_kind: ArrayKind,
) -> Subarray {
    let rows = point.num_row as f64;
    let cols = point.num_column as f64;
    let vdd = tech.vdd;

    let cell_area = cell.area_f2 * tech.feature_size_m * tech.feature_size_m;
    let bitline_cap = cols.log2().max(1.0) * 1e-15 * rows / 64.0;
    let wordline_cap = rows.log2().max(1.0) * 1e-15 * cols / 64.0;

    let predecoder = Stage {
        read_latency_s: 0.69 * 100.0 * wordline_cap,
        write_latency_s: 0.69 * 100.0 * wordline_cap,
        read_energy_j: wordline_cap * vdd * vdd,
        write_energy_j: wordline_cap * vdd * vdd,
        leakage_w: 1e-9 * rows.log2().max(1.0),
        area_m2: cell_area * rows.log2().max(1.0) * 4.0,
    };

    let row_decoder = Stage {
        read_latency_s: 0.69 * 200.0 * wordline_cap,
        write_latency_s: 0.69 * 200.0 * wordline_cap,
        read_energy_j: wordline_cap * vdd * vdd * rows.log2().max(1.0),
        write_energy_j: wordline_cap * vdd * vdd * rows.log2().max(1.0),
        leakage_w: 2e-9 * rows.log2().max(1.0),
        area_m2: cell_area * rows.log2().max(1.0) * 6.0,
    };

    let (read_bitline_latency, write_bitline_latency) = bitline_latency(cell, rows, bitline_cap, vdd);
    let bitline = Stage {
        read_latency_s: read_bitline_latency,
        write_latency_s: write_bitline_latency,
        read_energy_j: bitline_cap * vdd * vdd * cols,
        write_energy_j: bitline_cap * vdd * vdd * cols,
        leakage_w: cols * 1e-10,
        area_m2: cell_area * rows * cols,
    };

    let mux_total = (point.mux_sense_amp * point.mux_output_lev1 * point.mux_output_lev2).max(1);
    let sense_amp = Stage {
        read_latency_s: 0.69 * 50.0 * (point.mux_sense_amp as f64).log2().max(1.0) * 1e-15,
        write_latency_s: 0.0,
        read_energy_j: cell.min_sense_voltage * cell.min_sense_voltage * 5e-14 * mux_total as f64,
        write_energy_j: 0.0,
        leakage_w: 1e-9 * mux_total as f64,
        area_m2: cell_area * mux_total as f64 * 2.0,
    };

    let mux = Stage {
        read_latency_s: 0.69
            * 30.0
            * ((point.mux_output_lev1 as f64).log2().max(0.0) + (point.mux_output_lev2 as f64).log2().max(0.0))
            * 1e-15,
        write_latency_s: 0.69
            * 30.0
            * ((point.mux_output_lev1 as f64).log2().max(0.0) + (point.mux_output_lev2 as f64).log2().max(0.0))
            * 1e-15,
        read_energy_j: vdd * vdd * 1e-15 * mux_total as f64,
        write_energy_j: vdd * vdd * 1e-15 * mux_total as f64,
        leakage_w: 5e-10 * mux_total as f64,
        area_m2: cell_area * mux_total as f64,
    };

    let precharger = Stage {
        read_latency_s: 0.69 * 40.0 * bitline_cap,
        write_latency_s: 0.69 * 40.0 * bitline_cap,
        read_energy_j: bitline_cap * vdd * vdd * cols * 0.5,
        write_energy_j: bitline_cap * vdd * vdd * cols * 0.5,
        leakage_w: cols * 5e-11,
        area_m2: cell_area * cols * 2.0,
    };

    let column_decoder = if design_target == DesignTarget::Cache {
        Stage {
            read_latency_s: 0.69 * 20.0 * (cols.log2().max(1.0)) * 1e-15,
            write_latency_s: 0.0,
            read_energy_j: vdd * vdd * 1e-15 * cols.log2().max(1.0),
            write_energy_j: 0.0,
            leakage_w: 1e-10 * cols.log2().max(1.0),
            area_m2: cell_area * cols.log2().max(1.0),
        }
    } else {
        Stage::default()
    };

    // A tag comparator bit-compares every column against the incoming
    // address in parallel (one XOR per bit) and collapses the result
    // through a wide NOR, so its cost scales with the tag width itself
    // rather than log2 of it, unlike the decoders above. Only the tag
    // array of a cache carries this stage; the data array and every
    // non-cache design target have nothing to compare against.
    let comparator = if design_target == DesignTarget::Cache && array_kind == ArrayKind::Tag {
        Stage {
            read_latency_s: 0.69 * 25.0 * cols * 1e-15 + 0.69 * 60.0 * cols.log2().max(1.0) * 1e-15,
            write_latency_s: 0.0,
            read_energy_j: vdd * vdd * 1e-15 * cols,
            write_energy_j: 0.0,
            leakage_w: cols * 2e-10,
            area_m2: cell_area * cols * 3.0,
        }
    } else {
        Stage::default()
    };

    let height_m = rows * cell.aspect_ratio.sqrt() * tech.feature_size_m * cell.area_f2.sqrt();
    let width_m = cols / cell.aspect_ratio.sqrt() * tech.feature_size_m * cell.area_f2.sqrt();

    Subarray {
        point,
        predecoder,
        row_decoder,
        bitline,
        sense_amp,
        mux,
        precharger,
        column_decoder,
        comparator,
        height_m,
        width_m,
    }
}

/// Bitline RC delay. 3T eDRAM variants report distinct read/write values;
/// every other kind shares one RC estimate for both.
fn bitline_latency(cell: &Cell, rows: f64, bitline_cap: f64, vdd: f64) -> (f64, f64) {
    let r_access = cell.resistance_on.min(1e7);
    let read = 0.69 * r_access * bitline_cap * rows.sqrt();
    let write = match cell.kind {
        CellType::ThreeTeDram | CellType::ThreeTeDram333 => 0.69 * r_access * bitline_cap * rows.sqrt() * 1.4,
        _ => read,
    };
    let _ = vdd;
    (read, write)
}

/// The cell-kind-specific write-pulse duration folded into subarray write
/// latency.
pub fn write_pulse_s(cell: &Cell, is_reset: bool) -> f64 {
    let pulse_ns = if is_reset { cell.reset_pulse_ns } else { cell.set_pulse_ns };
    if pulse_ns > 0.0 {
        pulse_ns / 1e9
    } else {
        1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> SubarrayPoint {
        SubarrayPoint { num_row: 256, num_column: 256, mux_sense_amp: 8, mux_output_lev1: 4, mux_output_lev2: 2 }
    }

    #[test]
    fn larger_subarray_has_larger_area() {
        let tech = Technology::for_node(45.0, crate::params::DeviceRoadmap::Hp);
        let cell = Cell::default();
        let small = evaluate(
            SubarrayPoint { num_row: 64, num_column: 64, ..point() },
            &cell,
            &tech,
            DesignTarget::RamChip,
            ArrayKind::Data,
        );
        let large = evaluate(point(), &cell, &tech, DesignTarget::RamChip, ArrayKind::Data);
        assert!(large.area_m2() > small.area_m2());
    }

    #[test]
    fn tag_array_has_comparator_cost_but_data_array_does_not() {
        let tech = Technology::for_node(45.0, crate::params::DeviceRoadmap::Hp);
        let cell = Cell::default();
        let tag = evaluate(point(), &cell, &tech, DesignTarget::Cache, ArrayKind::Tag);
        let data = evaluate(point(), &cell, &tech, DesignTarget::Cache, ArrayKind::Data);
        assert!(tag.comparator.area_m2 > 0.0);
        assert!(tag.comparator.read_latency_s > 0.0);
        assert_eq!(data.comparator.area_m2, 0.0);
        assert!(tag.read_latency_s() > data.read_latency_s());
    }

    #[test]
    fn non_cache_design_target_never_gets_a_comparator() {
        let tech = Technology::for_node(45.0, crate::params::DeviceRoadmap::Hp);
        let cell = Cell::default();
        let ram = evaluate(point(), &cell, &tech, DesignTarget::RamChip, ArrayKind::Tag);
        assert_eq!(ram.comparator.area_m2, 0.0);
    }

    #[test]
    fn cache_subarray_has_column_decoder_cost() {
        let tech = Technology::for_node(45.0, crate::params::DeviceRoadmap::Hp);
        let cell = Cell::default();
        let cache = evaluate(point(), &cell, &tech, DesignTarget::Cache, ArrayKind::Data);
        let ram = evaluate(point(), &cell, &tech, DesignTarget::RamChip, ArrayKind::Data);
        assert!(cache.column_decoder.area_m2 > 0.0);
        assert_eq!(ram.column_decoder.area_m2, 0.0);
    }
}
