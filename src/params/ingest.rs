//! Normalization of a parsed JSON tree into [`super::Parameters`].
//!
//! File parsing itself is out of scope (reading the parameter document is
//! the embedding host's job); this module starts from a `serde_json::Value`
//! already produced that way, and normalizes it: dual nested/flat
//! spellings, case-sensitive enum vocabularies, the CACTI-assumption
//! shortcut, and the `Force*` overrides (forces always win).

use serde_json::Value;

use crate::error::ConfigError;
use crate::params::*;

/// Read a u64-valued capacity from either `Capacity: {Value, Unit}` or a
/// flat `Capacity_KB`/`Capacity_MB`/`Capacity_Bytes` key. The original tool
/// lets whichever spelling is read later in the file win; `serde_json::Value`
/// does not expose cross-key source order without the `preserve_order`
/// feature, so here the flat spelling always wins when both are present
/// (see DESIGN.md for the full discussion).
fn read_capacity_bits(root: &Value, word_width_bits: u32) -> Result<u64, ConfigError> {
    let mut capacity_bits: Option<u64> = None;

    if let Some(nested) = root.get("Capacity") {
        let value = nested
            .get("Value")
            .and_then(Value::as_f64)
            .ok_or_else(|| ConfigError::MissingKey("Capacity.Value".into()))?;
        let unit = nested.get("Unit").and_then(Value::as_str).unwrap_or("KB");
        capacity_bits = Some(unit_to_bits(value, unit, "Capacity.Unit")?);
    }

    for (key, multiplier) in [("Capacity_Bytes", 8u64), ("Capacity_KB", 8 * 1024), ("Capacity_MB", 8 * 1024 * 1024)]
    {
        if let Some(v) = root.get(key).and_then(Value::as_f64) {
            capacity_bits = Some((v * multiplier as f64) as u64);
        }
    }

    let bits = capacity_bits.ok_or_else(|| ConfigError::MissingKey("Capacity".into()))?;
    let _ = word_width_bits;
    Ok(bits)
}

fn unit_to_bits(value: f64, unit: &str, key: &str) -> Result<u64, ConfigError> {
    let multiplier: f64 = match unit {
        "Bytes" | "B" => 8.0,
        "KB" => 8.0 * 1024.0,
        "MB" => 8.0 * 1024.0 * 1024.0,
        "GB" => 8.0 * 1024.0 * 1024.0 * 1024.0,
        _ => {
            return Err(ConfigError::UnknownEnumValue { key: key.to_string(), value: unit.to_string() })
        }
    };
    Ok((value * multiplier) as u64)
}

fn get_str<'a>(root: &'a Value, key: &str) -> Option<&'a str> {
    root.get(key).and_then(Value::as_str)
}

fn get_bool(root: &Value, key: &str) -> Result<Option<bool>, ConfigError> {
    match root.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.as_str() {
            "true" | "True" | "yes" | "Yes" => Ok(Some(true)),
            "false" | "False" | "no" | "No" => Ok(Some(false)),
            other => Err(ConfigError::UnknownEnumValue { key: key.to_string(), value: other.to_string() }),
        },
        Some(other) => {
            Err(ConfigError::WrongType { key: key.to_string(), expected: "bool", found: other.to_string() })
        }
    }
}

fn get_u32(root: &Value, key: &str) -> Result<Option<u32>, ConfigError> {
    match root.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as u32))
            .ok_or_else(|| ConfigError::WrongType { key: key.to_string(), expected: "integer", found: v.to_string() }),
    }
}

fn get_f64(root: &Value, key: &str) -> Result<Option<f64>, ConfigError> {
    match root.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| ConfigError::WrongType { key: key.to_string(), expected: "number", found: v.to_string() }),
    }
}

fn parse_design_target(root: &Value) -> Result<DesignTarget, ConfigError> {
    match get_str(root, "DesignTarget") {
        None | Some("RAM") => Ok(DesignTarget::RamChip),
        Some("cache") | Some("Cache") => Ok(DesignTarget::Cache),
        Some("CAM") => Ok(DesignTarget::CamChip),
        Some(other) => {
            Err(ConfigError::UnknownEnumValue { key: "DesignTarget".into(), value: other.to_string() })
        }
    }
}

fn parse_optimization_target(root: &Value) -> Result<OptimizationTarget, ConfigError> {
    use OptimizationTarget::*;
    match get_str(root, "OptimizationTarget") {
        None | Some("ReadLatency") => Ok(ReadLatency),
        Some("WriteLatency") => Ok(WriteLatency),
        Some("ReadEnergy") => Ok(ReadEnergy),
        Some("WriteEnergy") => Ok(WriteEnergy),
        Some("ReadEDP") => Ok(ReadEdp),
        Some("WriteEDP") => Ok(WriteEdp),
        Some("Leakage") => Ok(Leakage),
        Some("Area") => Ok(Area),
        Some("FullExploration") => Ok(FullExploration),
        Some(other) => {
            Err(ConfigError::UnknownEnumValue { key: "OptimizationTarget".into(), value: other.to_string() })
        }
    }
}

fn parse_cache_access_mode(root: &Value) -> Result<CacheAccessMode, ConfigError> {
    match get_str(root, "CacheAccessMode") {
        None | Some("normal") => Ok(CacheAccessMode::Normal),
        Some("fast") => Ok(CacheAccessMode::Fast),
        Some("sequential") => Ok(CacheAccessMode::Sequential),
        Some(other) => {
            Err(ConfigError::UnknownEnumValue { key: "CacheAccessMode".into(), value: other.to_string() })
        }
    }
}

fn parse_roadmap(root: &Value, key: &str, default: DeviceRoadmap) -> Result<DeviceRoadmap, ConfigError> {
    match get_str(root, key) {
        None => Ok(default),
        Some("HP") => Ok(DeviceRoadmap::Hp),
        Some("LOP") => Ok(DeviceRoadmap::Lop),
        Some("LSTP") => Ok(DeviceRoadmap::Lstp),
        Some("IGZO") => Ok(DeviceRoadmap::Igzo),
        Some("CNT") => Ok(DeviceRoadmap::Cnt),
        Some(other) => Err(ConfigError::UnknownEnumValue { key: key.to_string(), value: other.to_string() }),
    }
}

fn parse_write_scheme(root: &Value) -> Result<WriteScheme, ConfigError> {
    use WriteScheme::*;
    match get_str(root, "WriteScheme") {
        None | Some("normal") => Ok(Normal),
        Some("set-before-reset") => Ok(SetBeforeReset),
        Some("reset-before-set") => Ok(ResetBeforeSet),
        Some("erase-before-set") => Ok(EraseBeforeSet),
        Some("erase-before-reset") => Ok(EraseBeforeReset),
        Some("write-and-verify") => Ok(WriteAndVerify),
        Some(other) => Err(ConfigError::UnknownEnumValue { key: "WriteScheme".into(), value: other.to_string() }),
    }
}

fn range_or(root: &Value, min_key: &str, max_key: &str, default: Range) -> Result<Range, ConfigError> {
    let min = get_u32(root, min_key)?.unwrap_or(default.min);
    let max = get_u32(root, max_key)?.unwrap_or(default.max);
    Range::new(min, max).map_err(|_| ConfigError::InvalidRange {
        axis: min_key.trim_start_matches("Min").to_string(),
        min: min as i64,
        max: max as i64,
    })
}

fn default_wire_axis() -> WireAxisRanges {
    WireAxisRanges {
        wire_types: vec![WireType::LocalAggressive, WireType::LocalConservative],
        repeaters: RepeaterType::ALL.to_vec(),
        low_swing: vec![false, true],
    }
}

/// Normalize a parsed parameter document into [`Parameters`], applying
/// defaults, then the CACTI-assumption shortcut, then explicit `Force*`
/// keys, in that order, so forces always win.
pub fn normalize(root: &Value) -> Result<Parameters, ConfigError> {
    let design_target = parse_design_target(root)?;
    let optimization_target = parse_optimization_target(root)?;

    let word_width_bits = get_u32(root, "WordWidth")?.ok_or_else(|| ConfigError::MissingKey("WordWidth".into()))?;
    let capacity_bits = read_capacity_bits(root, word_width_bits)?;
    let associativity = get_u32(root, "Associativity")?.unwrap_or(1).max(1);

    let process_node_nm = get_f64(root, "ProcessNode")?.unwrap_or(90.0);
    let process_node_r_nm = get_f64(root, "ProcessNodeR")?.unwrap_or(process_node_nm);
    let process_node_w_nm = get_f64(root, "ProcessNodeW")?.unwrap_or(process_node_nm);

    let device_roadmap = parse_roadmap(root, "DeviceRoadmap", DeviceRoadmap::Lop)?;
    let device_roadmap_r = parse_roadmap(root, "DeviceRoadmapR", device_roadmap)?;
    let device_roadmap_w = parse_roadmap(root, "DeviceRoadmapW", device_roadmap)?;

    let temperature_k = get_f64(root, "Temperature")?.unwrap_or(350.0);

    let defaults = SearchRanges::default();
    let mut ranges = SearchRanges {
        num_row_mat: range_or(root, "MinNumRowMat", "MaxNumRowMat", defaults.num_row_mat)?,
        num_column_mat: range_or(root, "MinNumColumnMat", "MaxNumColumnMat", defaults.num_column_mat)?,
        num_active_mat_per_row: range_or(
            root,
            "MinNumActiveMatPerRow",
            "MaxNumActiveMatPerRow",
            defaults.num_active_mat_per_row,
        )?,
        num_active_mat_per_column: range_or(
            root,
            "MinNumActiveMatPerColumn",
            "MaxNumActiveMatPerColumn",
            defaults.num_active_mat_per_column,
        )?,
        num_row_subarray: range_or(root, "MinNumRowSubarray", "MaxNumRowSubarray", defaults.num_row_subarray)?,
        num_column_subarray: range_or(
            root,
            "MinNumColumnSubarray",
            "MaxNumColumnSubarray",
            defaults.num_column_subarray,
        )?,
        num_active_subarray_per_row: range_or(
            root,
            "MinNumActiveSubarrayPerRow",
            "MaxNumActiveSubarrayPerRow",
            defaults.num_active_subarray_per_row,
        )?,
        num_active_subarray_per_column: range_or(
            root,
            "MinNumActiveSubarrayPerColumn",
            "MaxNumActiveSubarrayPerColumn",
            defaults.num_active_subarray_per_column,
        )?,
        mux_sense_amp: range_or(root, "MinMuxSenseAmp", "MaxMuxSenseAmp", defaults.mux_sense_amp)?,
        mux_output_lev1: range_or(root, "MinMuxOutputLev1", "MaxMuxOutputLev1", defaults.mux_output_lev1)?,
        mux_output_lev2: range_or(root, "MinMuxOutputLev2", "MaxMuxOutputLev2", defaults.mux_output_lev2)?,
        num_row_per_set: range_or(root, "MinNumRowPerSet", "MaxNumRowPerSet", defaults.num_row_per_set)?,
    };

    let routing_mode = match get_str(root, "RoutingMode") {
        None | Some("h-tree") => RoutingMode::HTree,
        Some("non-h-tree") => RoutingMode::NonHTree,
        Some(other) => {
            return Err(ConfigError::UnknownEnumValue { key: "RoutingMode".into(), value: other.to_string() })
        }
    };
    let internal_sensing = get_bool(root, "InternalSensing")?.unwrap_or(true);
    let write_scheme = parse_write_scheme(root)?;
    let cache_access_mode = parse_cache_access_mode(root)?;

    let flash_page_size_bits = get_u32(root, "FlashPageSize")?.map(|v| v as u64 * 8).unwrap_or(0);
    let flash_block_size_bits = get_u32(root, "FlashBlockSize")?.map(|v| v as u64 * 8 * 1024).unwrap_or(0);

    let enable_pruning = get_bool(root, "EnablePruning")?.unwrap_or(false);
    let use_cacti_assumption = get_bool(root, "UseCactiAssumption")?.unwrap_or(false);

    let mut buffer_design_targets = BufferDesignTarget::ALL.to_vec();
    if let Some(shorthand) = get_str(root, "AreaOptimizationLevel") {
        buffer_design_targets = match shorthand {
            "latency" => vec![BufferDesignTarget::LatencyFirst],
            "area" => vec![BufferDesignTarget::AreaFirst],
            _ => vec![BufferDesignTarget::Balanced],
        };
    }

    let constraints = parse_constraints(root)?;

    // Fixed vector overwriting the active-mat/subarray axes, matching the
    // tiling CACTI itself always searches. Applied after defaults, before
    // forces.
    if use_cacti_assumption {
        ranges.num_active_mat_per_row = Range::fixed(ranges.num_column_mat.max);
        ranges.num_active_mat_per_column = Range::fixed(1);
        ranges.num_row_subarray = Range::fixed(2);
        ranges.num_column_subarray = Range::fixed(2);
        ranges.num_active_subarray_per_row = Range::fixed(2);
        ranges.num_active_subarray_per_column = Range::fixed(2);
    }

    apply_force_keys(root, &mut ranges)?;

    Ok(Parameters {
        design_target,
        array_kind: ArrayKind::default(),
        optimization_target,
        capacity_bits,
        word_width_bits,
        associativity,
        cache_access_mode,
        process_node_nm,
        process_node_r_nm,
        process_node_w_nm,
        device_roadmap,
        device_roadmap_r,
        device_roadmap_w,
        temperature_k,
        ranges,
        local_wires: default_wire_axis(),
        global_wires: default_wire_axis(),
        buffer_design_targets,
        routing_mode,
        internal_sensing,
        write_scheme,
        flash_page_size_bits,
        flash_block_size_bits,
        enable_pruning,
        use_cacti_assumption,
        constraints,
    })
}

fn apply_force_keys(root: &Value, ranges: &mut SearchRanges) -> Result<(), ConfigError> {
    if let Some(force_bank) = root.get("ForceBank") {
        if let Some(v) = get_u32(force_bank, "TotalRows")? {
            ranges.num_row_mat = Range::fixed(v);
        }
        if let Some(v) = get_u32(force_bank, "TotalColumns")? {
            ranges.num_column_mat = Range::fixed(v);
        }
        if let Some(v) = get_u32(force_bank, "ActiveRows")? {
            ranges.num_active_mat_per_column = Range::fixed(v);
        }
        if let Some(v) = get_u32(force_bank, "ActiveColumns")? {
            ranges.num_active_mat_per_row = Range::fixed(v);
        }
    }
    if let Some(force_mat) = root.get("ForceMat") {
        if let Some(v) = get_u32(force_mat, "TotalRows")? {
            ranges.num_row_subarray = Range::fixed(v);
        }
        if let Some(v) = get_u32(force_mat, "TotalColumns")? {
            ranges.num_column_subarray = Range::fixed(v);
        }
        if let Some(v) = get_u32(force_mat, "ActiveRows")? {
            ranges.num_active_subarray_per_column = Range::fixed(v);
        }
        if let Some(v) = get_u32(force_mat, "ActiveColumns")? {
            ranges.num_active_subarray_per_row = Range::fixed(v);
        }
    }
    if let Some(v) = get_u32(root, "ForceMuxSenseAmp")? {
        ranges.mux_sense_amp = Range::fixed(v);
    }
    if let Some(v) = get_u32(root, "ForceMuxOutputLev1")? {
        ranges.mux_output_lev1 = Range::fixed(v);
    }
    if let Some(v) = get_u32(root, "ForceMuxOutputLev2")? {
        ranges.mux_output_lev2 = Range::fixed(v);
    }
    Ok(())
}

fn parse_constraints(root: &Value) -> Result<Constraints, ConfigError> {
    let mut constraints = Constraints::default();
    if let Some(c) = root.get("Constraints") {
        constraints.read_latency = get_f64(c, "ReadLatency")?;
        constraints.write_latency = get_f64(c, "WriteLatency")?;
        constraints.read_dynamic_energy = get_f64(c, "ReadDynamicEnergy")?;
        constraints.write_dynamic_energy = get_f64(c, "WriteDynamicEnergy")?;
        constraints.read_edp = get_f64(c, "ReadEDP")?;
        constraints.write_edp = get_f64(c, "WriteEDP")?;
        constraints.leakage = get_f64(c, "Leakage")?;
        constraints.area = get_f64(c, "Area")?;
    }
    Ok(constraints)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_doc() -> Value {
        serde_json::json!({
            "DesignTarget": "cache",
            "OptimizationTarget": "ReadLatency",
            "Capacity_KB": 32,
            "WordWidth": 512,
            "Associativity": 8,
            "ProcessNode": 45,
        })
    }

    #[test]
    fn capacity_flat_kb_converts_to_bits() {
        let params = normalize(&base_doc()).unwrap();
        assert_eq!(params.capacity_bits, 32 * 1024 * 8);
    }

    #[test]
    fn flat_capacity_overrides_nested_when_both_present() {
        // serde_json::Value does not retain source byte order across
        // differently-named keys (see the comment on read_capacity_bits),
        // so this port resolves the "last one read wins" rule as "the flat
        // spelling always wins when both are present" rather than trying
        // to recover true file order. Documented in DESIGN.md.
        let mut doc = base_doc();
        doc["Capacity"] = serde_json::json!({"Value": 64.0, "Unit": "KB"});
        let params = normalize(&doc).unwrap();
        assert_eq!(params.capacity_bits, 32 * 1024 * 8);
    }

    #[test]
    fn unknown_enum_value_is_fatal() {
        let mut doc = base_doc();
        doc["OptimizationTarget"] = serde_json::json!("NotARealTarget");
        assert!(normalize(&doc).is_err());
    }

    #[test]
    fn cacti_assumption_overwrites_active_axes() {
        let mut doc = base_doc();
        doc["UseCactiAssumption"] = serde_json::json!("Yes");
        doc["MaxNumColumnMat"] = serde_json::json!(16);
        let params = normalize(&doc).unwrap();
        assert_eq!(params.ranges.num_row_subarray, Range::fixed(2));
        assert_eq!(params.ranges.num_active_mat_per_row, Range::fixed(16));
    }

    #[test]
    fn force_keys_win_over_cacti_assumption() {
        let mut doc = base_doc();
        doc["UseCactiAssumption"] = serde_json::json!("Yes");
        doc["ForceMuxSenseAmp"] = serde_json::json!(2);
        let params = normalize(&doc).unwrap();
        assert_eq!(params.ranges.mux_sense_amp, Range::fixed(2));
    }

    #[test]
    fn bool_spellings_all_accepted() {
        for spelling in ["true", "True", "yes", "Yes"] {
            let mut doc = base_doc();
            doc["EnablePruning"] = serde_json::json!(spelling);
            assert!(normalize(&doc).unwrap().enable_pruning);
        }
    }
}
