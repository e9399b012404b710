//! Cache composition: combine the independently-searched data-array and
//! tag-array incumbents into one cache-level result according to the
//! chosen cache access mode.

use crate::params::CacheAccessMode;
use crate::search::Candidate;

/// The composed cache-level metrics, plus the derived eDRAM availability
/// figure.
#[derive(Debug, Clone)]
pub struct CacheComposition {
    pub hit_latency_s: f64,
    pub miss_latency_s: f64,
    pub write_latency_s: f64,
    pub hit_energy_j: f64,
    pub miss_energy_j: f64,
    pub write_energy_j: f64,
    pub total_leakage_w: f64,
    pub total_area_m2: f64,
    /// `(retention - max(tag.refreshLatency, data.refreshLatency)) / retention * 100`,
    /// present only when the data array is a DRAM-family (refreshing) cell.
    pub availability_pct: Option<f64>,
}

/// Compose `data` (the cache-line-wide array) and `tag` (the tag array)
/// per the access-mode table below.
pub fn compose(
    mode: CacheAccessMode,
    data: &Candidate,
    tag: &Candidate,
    retention_time_s: Option<f64>,
) -> CacheComposition {
    let tag_read = tag.read_latency_s;
    let data_read = data.read_latency_s;
    let data_mat_read = data.bank.mat.read_latency_s();
    let data_col_dec_read = data.bank.mat.subarray.column_decoder.read_latency_s;

    let hit_latency_s = match mode {
        CacheAccessMode::Normal => tag_read.max(data_mat_read) + data_col_dec_read + (data_read - data_mat_read),
        CacheAccessMode::Fast => tag_read.max(data_read),
        CacheAccessMode::Sequential => tag_read + data_read,
    };
    let miss_latency_s = tag_read;
    let write_latency_s = tag.write_latency_s.max(data.write_latency_s);

    let hit_energy_j = tag.read_energy_j + data.read_energy_j;
    let miss_energy_j = tag.read_energy_j + data.read_energy_j;
    let write_energy_j = tag.write_energy_j + data.write_energy_j;

    let total_leakage_w = tag.leakage_w + data.leakage_w;
    let total_area_m2 = tag.area_m2 + data.area_m2;

    let availability_pct = retention_time_s.and_then(|retention| {
        if retention <= 0.0 {
            return None;
        }
        let refresh = tag.refresh_latency_s.max(data.refresh_latency_s);
        Some((retention - refresh) / retention * 100.0)
    });

    CacheComposition {
        hit_latency_s,
        miss_latency_s,
        write_latency_s,
        hit_energy_j,
        miss_energy_j,
        write_energy_j,
        total_leakage_w,
        total_area_m2,
        availability_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{apply_pvt, parse_cell};
    use crate::enumerate::enumerate;
    use crate::params::ingest::normalize;
    use crate::search::{search, SearchOutcome};
    use crate::tech::Technology;

    fn incumbent_for(doc: serde_json::Value, cell_doc: serde_json::Value) -> Candidate {
        let params = normalize(&doc).unwrap();
        let (mut cell, _) = parse_cell(&cell_doc).unwrap();
        apply_pvt(&mut cell, params.temperature_k);
        let tech = Technology::for_node(params.process_node_nm, params.device_roadmap);
        let points = enumerate(&params);
        match search(&params, &cell, &tech, points).unwrap() {
            SearchOutcome::Incumbent(c) => *c,
            SearchOutcome::Exploration(_) => panic!("expected incumbent"),
        }
    }

    #[test]
    fn sequential_hit_latency_is_tag_plus_data_read() {
        let data = incumbent_for(
            serde_json::json!({
                "DesignTarget": "cache", "OptimizationTarget": "ReadLatency",
                "Capacity_KB": 32, "WordWidth": 512, "Associativity": 8, "ProcessNode": 45,
            }),
            serde_json::json!({"CellType": "SRAM"}),
        );
        let tag = incumbent_for(
            serde_json::json!({
                "DesignTarget": "cache", "OptimizationTarget": "ReadLatency",
                "Capacity_KB": 1, "WordWidth": 20, "Associativity": 8, "ProcessNode": 45,
            }),
            serde_json::json!({"CellType": "SRAM"}),
        );
        let composed = compose(CacheAccessMode::Sequential, &data, &tag, None);
        assert!((composed.hit_latency_s - (tag.read_latency_s + data.read_latency_s)).abs() < 1e-18);
    }
}
