//! Integration coverage for the seed scenarios enumerated in spec.md §8.
//! Scenarios 2, 4 and 5 already have near-equivalent unit coverage inside
//! `search.rs`/`enumerate.rs`; this file covers the ones that exercise the
//! crate end to end: the cache access-mode table, eDRAM retention
//! derivation feeding cache availability, and constraint infeasibility.

use memsysexplorer::cache;
use memsysexplorer::cell::{apply_pvt, parse_cell};
use memsysexplorer::enumerate::enumerate;
use memsysexplorer::params::ingest::normalize;
use memsysexplorer::params::CacheAccessMode;
use memsysexplorer::search::{search, SearchOutcome};
use memsysexplorer::tech::Technology;

fn incumbent(doc: serde_json::Value, cell_doc: serde_json::Value) -> memsysexplorer::search::Candidate {
    let params = normalize(&doc).unwrap();
    let (mut cell, _warnings) = parse_cell(&cell_doc).unwrap();
    apply_pvt(&mut cell, params.temperature_k);
    let tech = Technology::for_node(params.process_node_nm, params.device_roadmap);
    let points = enumerate(&params);
    match search(&params, &cell, &tech, points).unwrap() {
        SearchOutcome::Incumbent(c) => *c,
        SearchOutcome::Exploration(_) => panic!("expected a single incumbent"),
    }
}

/// Scenario 1: SRAM L1 data cache. In sequential mode the cache hit latency
/// is exactly tag.readLatency + data.readLatency; in fast mode it is the
/// max of the two, so it is never larger than the sequential figure.
#[test]
fn sram_l1_cache_sequential_and_fast_modes() {
    let data_doc = serde_json::json!({
        "DesignTarget": "cache",
        "OptimizationTarget": "ReadLatency",
        "Capacity_KB": 32,
        "WordWidth": 512,
        "Associativity": 8,
        "ProcessNode": 45,
    });
    let tag_doc = serde_json::json!({
        "DesignTarget": "cache",
        "OptimizationTarget": "ReadLatency",
        "Capacity_KB": 1,
        "WordWidth": 32,
        "Associativity": 8,
        "ProcessNode": 45,
    });
    let cell_doc = serde_json::json!({"CellType": "SRAM"});

    let data = incumbent(data_doc, cell_doc.clone());
    let tag = incumbent(tag_doc, cell_doc);

    let sequential = cache::compose(CacheAccessMode::Sequential, &data, &tag, None);
    let fast = cache::compose(CacheAccessMode::Fast, &data, &tag, None);

    assert!(sequential.hit_latency_s.is_finite());
    assert!((sequential.hit_latency_s - (tag.read_latency_s + data.read_latency_s)).abs() < 1e-18);
    assert!(fast.hit_latency_s <= sequential.hit_latency_s);
    assert!(fast.miss_latency_s.is_finite());
}

/// Scenario 3: eDRAM cache with retention time left unspecified.
/// `apply_pvt` derives retention = capDRAMCell * maxStorageNodeDrop /
/// leakageCurrent, and cache availability must equal
/// (retention - refreshLatency) / retention * 100.
#[test]
fn edram_retention_derivation_feeds_cache_availability() {
    let doc = serde_json::json!({
        "DesignTarget": "cache",
        "OptimizationTarget": "ReadLatency",
        "Capacity_KB": 32,
        "WordWidth": 512,
        "Associativity": 8,
        "ProcessNode": 45,
    });
    let tag_doc = serde_json::json!({
        "DesignTarget": "cache",
        "OptimizationTarget": "ReadLatency",
        "Capacity_KB": 1,
        "WordWidth": 32,
        "Associativity": 8,
        "ProcessNode": 45,
    });
    let cell_doc = serde_json::json!({
        "CellType": "eDRAM",
        "DRAMCellCapacitance_F": 20e-15,
        "MaxStorageNodeDrop_V": 0.5,
        "LeakageCurrentAccessDevice_uA": 1.0,
    });

    let params = normalize(&doc).unwrap();
    let (mut cell, warnings) = parse_cell(&cell_doc).unwrap();
    assert!(warnings.is_empty());
    apply_pvt(&mut cell, params.temperature_k);
    let retention = cell.retention_time_s.expect("eDRAM retention must be derived, not absent");
    let expected_retention = 20e-15 * 0.5 / 1.0e-6;
    assert!((retention - expected_retention).abs() / expected_retention < 1e-9);

    let tech = Technology::for_node(params.process_node_nm, params.device_roadmap);
    let data_points = enumerate(&params);
    let data = match search(&params, &cell, &tech, data_points).unwrap() {
        SearchOutcome::Incumbent(c) => *c,
        SearchOutcome::Exploration(_) => panic!("expected a single incumbent"),
    };
    let tag_params = normalize(&tag_doc).unwrap();
    let tag_points = enumerate(&tag_params);
    let tag = match search(&tag_params, &cell, &tech, tag_points).unwrap() {
        SearchOutcome::Incumbent(c) => *c,
        SearchOutcome::Exploration(_) => panic!("expected a single incumbent"),
    };

    let composition = cache::compose(CacheAccessMode::Normal, &data, &tag, cell.retention_time_s);
    let availability = composition.availability_pct.expect("eDRAM cell must report an availability figure");
    let refresh = tag.refresh_latency_s.max(data.refresh_latency_s);
    let expected_availability = (retention - refresh) / retention * 100.0;
    assert!((availability - expected_availability).abs() < 1e-9);
}

/// Scenario 6: an unsatisfiable ReadLatency constraint must surface as a
/// named infeasibility rather than silently returning an empty result.
#[test]
fn impossible_constraint_reports_infeasibility() {
    let doc = serde_json::json!({
        "DesignTarget": "RAM",
        "OptimizationTarget": "ReadLatency",
        "Capacity_KB": 1,
        "WordWidth": 64,
        "ProcessNode": 45,
        "Constraints": {"ReadLatency": 1e-12},
    });
    let cell_doc = serde_json::json!({"CellType": "SRAM"});
    let params = normalize(&doc).unwrap();
    let (mut cell, _warnings) = parse_cell(&cell_doc).unwrap();
    apply_pvt(&mut cell, params.temperature_k);
    let tech = Technology::for_node(params.process_node_nm, params.device_roadmap);
    let points = enumerate(&params);
    assert!(!points.is_empty());

    let err = search(&params, &cell, &tech, points).unwrap_err();
    assert_eq!(err.most_violated, "ReadLatency");
    assert!(err.candidates_evaluated > 0);
    assert!(err.to_string().contains("ReadLatency"));
}
