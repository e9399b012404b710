//! Report emitters: a plain-text report matching the CONFIGURATION / RESULT
//! / CACHE DESIGN SUMMARY sections, and a structured-document emitter with
//! unit-suffixed keys.

use std::fmt::Write as _;

use serde_json::{json, Value};

use crate::cache::CacheComposition;
use crate::cell::Cell;
use crate::params::{CacheAccessMode, Parameters, RepeaterType, WireType};
use crate::search::Candidate;

/// Render the plain-text CONFIGURATION + RESULT report for a single
/// (non-cache) incumbent.
pub fn render_text(params: &Parameters, cell: &Cell, candidate: &Candidate) -> String {
    let mut out = String::new();

    writeln!(out, "\n=============\nCONFIGURATION\n=============").unwrap();
    writeln!(out, "Bank Organization: {} x {}", candidate.point.bank.num_row_mat, candidate.point.bank.num_column_mat)
        .unwrap();
    writeln!(
        out,
        " - Row Activation   : {} / {}",
        candidate.point.bank.num_active_mat_per_column, candidate.point.bank.num_row_mat
    )
    .unwrap();
    writeln!(
        out,
        " - Column Activation: {} / {}",
        candidate.point.bank.num_active_mat_per_row, candidate.point.bank.num_column_mat
    )
    .unwrap();
    writeln!(
        out,
        "Mat Organization: {} x {}",
        candidate.point.mat.num_row_subarray, candidate.point.mat.num_column_subarray
    )
    .unwrap();
    writeln!(
        out,
        " - Subarray Size    : {} Rows x {} Columns",
        candidate.point.subarray.num_row, candidate.point.subarray.num_column
    )
    .unwrap();
    writeln!(out, "Mux Level:").unwrap();
    writeln!(out, " - Senseamp Mux      : {}", candidate.point.subarray.mux_sense_amp).unwrap();
    writeln!(out, " - Output Level-1 Mux: {}", candidate.point.subarray.mux_output_lev1).unwrap();
    writeln!(out, " - Output Level-2 Mux: {}", candidate.point.subarray.mux_output_lev2).unwrap();
    if params.design_target == crate::params::DesignTarget::Cache {
        writeln!(out, " - One set is partitioned into {} rows", candidate.point.bank.num_row_per_set).unwrap();
    }
    writeln!(out, "Local Wire:").unwrap();
    render_wire_block(&mut out, candidate.point.local_wire.wire_type, candidate.point.local_wire.repeater, candidate.point.local_wire.low_swing);
    writeln!(out, "Global Wire:").unwrap();
    render_wire_block(&mut out, candidate.point.global_wire.wire_type, candidate.point.global_wire.repeater, candidate.point.global_wire.low_swing);
    writeln!(out, "Buffer Design Style: {:?}", candidate.point.buffer_design_target).unwrap();

    writeln!(out, "\n=============\n   RESULT\n=============").unwrap();
    writeln!(out, "Area:").unwrap();
    writeln!(
        out,
        " - Total Area = {:.3e} x {:.3e} = {:.3e} m^2",
        candidate.bank.height_m(),
        candidate.bank.width_m(),
        candidate.area_m2
    )
    .unwrap();
    writeln!(out, " - Area Efficiency = {:.2}%", area_efficiency_pct(candidate)).unwrap();

    writeln!(out, "Timing:").unwrap();
    writeln!(out, " -  Read Latency = {:.3e} s", candidate.read_latency_s).unwrap();
    if cell.kind.has_asymmetric_write() {
        writeln!(out, " - RESET Latency = {:.3e} s", candidate.reset_latency_s.unwrap_or(0.0)).unwrap();
        writeln!(out, " - SET Latency   = {:.3e} s", candidate.set_latency_s.unwrap_or(0.0)).unwrap();
    } else {
        writeln!(out, " - Write Latency = {:.3e} s", candidate.write_latency_s).unwrap();
    }
    writeln!(out, " - Read Bandwidth  = {:.3e} Bps", candidate.read_bandwidth_bps).unwrap();
    writeln!(out, " - Write Bandwidth = {:.3e} Bps", candidate.write_bandwidth_bps).unwrap();

    writeln!(out, "Power:").unwrap();
    writeln!(out, " -  Read Dynamic Energy = {:.3e} J", candidate.read_energy_j).unwrap();
    if cell.kind.has_asymmetric_write() {
        writeln!(out, " - RESET Dynamic Energy = {:.3e} J", candidate.reset_energy_j.unwrap_or(0.0)).unwrap();
        writeln!(out, " - SET Dynamic Energy = {:.3e} J", candidate.set_energy_j.unwrap_or(0.0)).unwrap();
    } else {
        writeln!(out, " - Write Dynamic Energy = {:.3e} J", candidate.write_energy_j).unwrap();
    }
    writeln!(out, " - Leakage Power = {:.3e} W", candidate.leakage_w).unwrap();
    if cell.kind.is_dram_family() {
        if let Some(p) = candidate.refresh_power_w {
            writeln!(out, " - Refresh Power = {:.3e} W", p).unwrap();
        }
    }

    out
}

/// Raw bitcell area (summed over every physical subarray in the bank,
/// active or not) divided by total bank area, as a percentage. Grounded in
/// `Result.cpp`'s `cell->area * featureSize^2 * capacity / bank->area * 100`;
/// `bitline.area_m2` already carries the `featureSize^2` conversion (see
/// `subarray::evaluate`'s `cell_area` term), so no further unit conversion
/// is needed here.
fn area_efficiency_pct(candidate: &Candidate) -> f64 {
    if candidate.area_m2 <= 0.0 {
        return 0.0;
    }
    let subarrays_per_mat = (candidate.bank.mat.point.num_row_subarray * candidate.bank.mat.point.num_column_subarray) as f64;
    let mats_per_bank = (candidate.bank.point.num_row_mat * candidate.bank.point.num_column_mat) as f64;
    let raw_cell_area_m2 = candidate.bank.mat.subarray.bitline.area_m2 * subarrays_per_mat * mats_per_bank;
    raw_cell_area_m2 / candidate.area_m2 * 100.0
}

fn render_wire_block(out: &mut String, wire_type: WireType, repeater: RepeaterType, low_swing: bool) {
    writeln!(out, " - Wire Type : {}", wire_type).unwrap();
    writeln!(out, " - Repeater Type: {}", repeater).unwrap();
    writeln!(out, " - Low Swing : {}", if low_swing { "Yes" } else { "No" }).unwrap();
}

/// Render the CACHE DESIGN SUMMARY section appended after the data-array
/// and tag-array RESULT sections.
pub fn render_cache_text(params: &Parameters, composition: &CacheComposition) -> String {
    let mut out = String::new();
    writeln!(out, "\n=======================\nCACHE DESIGN -- SUMMARY\n=======================").unwrap();
    writeln!(
        out,
        "Access Mode: {}",
        match params.cache_access_mode {
            CacheAccessMode::Normal => "Normal",
            CacheAccessMode::Fast => "Fast",
            CacheAccessMode::Sequential => "Sequential",
        }
    )
    .unwrap();
    writeln!(out, "Area:").unwrap();
    writeln!(out, " - Total Area = {:.4} mm^2", composition.total_area_m2 * 1e6).unwrap();
    writeln!(out, "Timing:").unwrap();
    writeln!(out, " - Cache Hit Latency   = {:.3} ns", composition.hit_latency_s * 1e9).unwrap();
    writeln!(out, " - Cache Miss Latency  = {:.3} ns", composition.miss_latency_s * 1e9).unwrap();
    writeln!(out, " - Cache Write Latency = {:.3} ns", composition.write_latency_s * 1e9).unwrap();
    if let Some(availability) = composition.availability_pct {
        writeln!(out, " - Cache Availability = {:.3}%", availability).unwrap();
    }
    writeln!(out, "Power:").unwrap();
    writeln!(out, " - Cache Hit Dynamic Energy   = {:.3} nJ per access", composition.hit_energy_j * 1e9).unwrap();
    writeln!(out, " - Cache Miss Dynamic Energy  = {:.3} nJ per access", composition.miss_energy_j * 1e9).unwrap();
    writeln!(out, " - Cache Write Dynamic Energy = {:.3} nJ per access", composition.write_energy_j * 1e9).unwrap();
    writeln!(out, " - Cache Total Leakage Power  = {:.3} mW", composition.total_leakage_w * 1e3).unwrap();
    out
}

/// Choose a magnitude-appropriate key suffix/scale pair (`K`/`M` prefixes
/// chosen by magnitude thresholds 1e3, 1e6).
fn scaled(value: f64, base_suffix: &str, base_scale: f64) -> (String, f64) {
    let magnitude = value.abs() * base_scale;
    if magnitude >= 1.0e6 {
        (format!("_M{}", base_suffix), base_scale / 1.0e6)
    } else if magnitude >= 1.0e3 {
        (format!("_K{}", base_suffix), base_scale / 1.0e3)
    } else {
        (format!("_{}", base_suffix), base_scale)
    }
}

fn put_scaled(map: &mut serde_json::Map<String, Value>, name: &str, value: f64, base_suffix: &str, base_scale: f64) {
    let (suffix, scale) = scaled(value, base_suffix, base_scale);
    map.insert(format!("{}{}", name, suffix), json!(value * scale));
}

/// Render the structured-document report: `MemoryCell`, `Configuration`,
/// `Results` top-level keys, with unit suffixes embedded in key names.
pub fn render_structured(params: &Parameters, cell: &Cell, candidate: &Candidate) -> Value {
    let mut results = serde_json::Map::new();
    put_scaled(&mut results, "ReadLatency", candidate.read_latency_s, "ns", 1.0e9);
    put_scaled(&mut results, "WriteLatency", candidate.write_latency_s, "ns", 1.0e9);
    put_scaled(&mut results, "ReadDynamicEnergy", candidate.read_energy_j, "pJ", 1.0e12);
    put_scaled(&mut results, "WriteDynamicEnergy", candidate.write_energy_j, "pJ", 1.0e12);
    put_scaled(&mut results, "Leakage", candidate.leakage_w, "mW", 1.0e3);
    put_scaled(&mut results, "Area", candidate.area_m2, "mm2", 1.0e6);
    put_scaled(&mut results, "ReadBandwidth", candidate.read_bandwidth_bps, "Bps", 1.0);
    put_scaled(&mut results, "WriteBandwidth", candidate.write_bandwidth_bps, "Bps", 1.0);
    results.insert("AreaEfficiency".into(), json!(area_efficiency_pct(candidate)));
    if cell.kind.has_asymmetric_write() {
        put_scaled(&mut results, "ResetLatency", candidate.reset_latency_s.unwrap_or(0.0), "ns", 1.0e9);
        put_scaled(&mut results, "SetLatency", candidate.set_latency_s.unwrap_or(0.0), "ns", 1.0e9);
        put_scaled(&mut results, "ResetDynamicEnergy", candidate.reset_energy_j.unwrap_or(0.0), "pJ", 1.0e12);
        put_scaled(&mut results, "SetDynamicEnergy", candidate.set_energy_j.unwrap_or(0.0), "pJ", 1.0e12);
    }
    if cell.kind.is_dram_family() {
        put_scaled(&mut results, "RefreshLatency", candidate.refresh_latency_s, "ns", 1.0e9);
        put_scaled(&mut results, "RefreshDynamicEnergy", candidate.refresh_dynamic_energy_j, "pJ", 1.0e12);
    }

    let configuration = json!({
        "NumRowMat": candidate.point.bank.num_row_mat,
        "NumColumnMat": candidate.point.bank.num_column_mat,
        "NumActiveMatPerRow": candidate.point.bank.num_active_mat_per_row,
        "NumActiveMatPerColumn": candidate.point.bank.num_active_mat_per_column,
        "NumRowSubarray": candidate.point.mat.num_row_subarray,
        "NumColumnSubarray": candidate.point.mat.num_column_subarray,
        "MuxSenseAmp": candidate.point.subarray.mux_sense_amp,
        "MuxOutputLev1": candidate.point.subarray.mux_output_lev1,
        "MuxOutputLev2": candidate.point.subarray.mux_output_lev2,
        "ProcessNode_nm": params.process_node_nm,
        "Temperature_K": params.temperature_k,
    });

    let memory_cell = json!({
        "CellType": format!("{:?}", cell.kind),
        "CellArea_F2": cell.area_f2,
    });

    json!({
        "MemoryCell": memory_cell,
        "Configuration": configuration,
        "Results": Value::Object(results),
    })
}

/// Render the `CacheDesign` structured document with embedded `DataArray`
/// and `TagArray` subtrees.
pub fn render_structured_cache(
    params: &Parameters,
    cell: &Cell,
    data: &Candidate,
    tag: &Candidate,
    composition: &CacheComposition,
) -> Value {
    let mut cache_design = serde_json::Map::new();
    cache_design.insert("DataArray".into(), render_structured(params, cell, data));
    cache_design.insert("TagArray".into(), render_structured(params, cell, tag));
    put_scaled(&mut cache_design, "HitLatency", composition.hit_latency_s, "ns", 1.0e9);
    put_scaled(&mut cache_design, "MissLatency", composition.miss_latency_s, "ns", 1.0e9);
    put_scaled(&mut cache_design, "WriteLatency", composition.write_latency_s, "ns", 1.0e9);
    put_scaled(&mut cache_design, "HitDynamicEnergy", composition.hit_energy_j, "pJ", 1.0e12);
    put_scaled(&mut cache_design, "MissDynamicEnergy", composition.miss_energy_j, "pJ", 1.0e12);
    put_scaled(&mut cache_design, "WriteDynamicEnergy", composition.write_energy_j, "pJ", 1.0e12);
    put_scaled(&mut cache_design, "Leakage", composition.total_leakage_w, "mW", 1.0e3);
    put_scaled(&mut cache_design, "Area", composition.total_area_m2, "mm2", 1.0e6);
    if let Some(availability) = composition.availability_pct {
        cache_design.insert("Availability_pct".into(), json!(availability));
    }

    json!({ "CacheDesign": Value::Object(cache_design) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{apply_pvt, parse_cell};
    use crate::enumerate::enumerate;
    use crate::params::ingest::normalize;
    use crate::search::{search, SearchOutcome};
    use crate::tech::Technology;

    #[test]
    fn text_report_contains_configuration_and_result_sections() {
        let doc = serde_json::json!({
            "DesignTarget": "RAM",
            "OptimizationTarget": "ReadLatency",
            "Capacity_KB": 1,
            "WordWidth": 64,
            "ProcessNode": 45,
        });
        let params = normalize(&doc).unwrap();
        let (mut cell, _) = parse_cell(&serde_json::json!({"CellType": "SRAM"})).unwrap();
        apply_pvt(&mut cell, params.temperature_k);
        let tech = Technology::for_node(params.process_node_nm, params.device_roadmap);
        let points = enumerate(&params);
        let SearchOutcome::Incumbent(candidate) = search(&params, &cell, &tech, points).unwrap() else {
            panic!("expected incumbent");
        };
        let text = render_text(&params, &cell, &candidate);
        assert!(text.contains("CONFIGURATION"));
        assert!(text.contains("RESULT"));
        assert!(text.contains("Read Latency"));
    }

    #[test]
    fn structured_report_embeds_unit_suffixes() {
        let doc = serde_json::json!({
            "DesignTarget": "RAM",
            "OptimizationTarget": "ReadLatency",
            "Capacity_KB": 1,
            "WordWidth": 64,
            "ProcessNode": 45,
        });
        let params = normalize(&doc).unwrap();
        let (mut cell, _) = parse_cell(&serde_json::json!({"CellType": "SRAM"})).unwrap();
        apply_pvt(&mut cell, params.temperature_k);
        let tech = Technology::for_node(params.process_node_nm, params.device_roadmap);
        let points = enumerate(&params);
        let SearchOutcome::Incumbent(candidate) = search(&params, &cell, &tech, points).unwrap() else {
            panic!("expected incumbent");
        };
        let doc = render_structured(&params, &cell, &candidate);
        let results = doc.get("Results").unwrap().as_object().unwrap();
        assert!(results.keys().any(|k| k.starts_with("ReadLatency_")));
    }
}
