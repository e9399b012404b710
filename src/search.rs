//! The search driver: evaluates every enumerated point, applies
//! constraints, and tracks the incumbent per the objective.

use log::{debug, info};

use crate::array::bank::{self, Bank};
use crate::array::mat;
use crate::array::subarray::{self, write_pulse_s};
use crate::cell::Cell;
use crate::enumerate::CandidatePoint;
use crate::error::InfeasibleError;
use crate::params::{Constraints, OptimizationTarget, Parameters};
use crate::tech::Technology;
use crate::wire::Wire;

/// One fully-evaluated candidate: a `Bank` plus the two wires used to route
/// it (not owned by the `Bank` itself, per the design notes) and the scalar
/// metrics the selection policy compares.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub point: CandidatePoint,
    pub bank: Bank,
    pub local_wire: Wire,
    pub global_wire: Wire,
    pub read_latency_s: f64,
    pub write_latency_s: f64,
    pub reset_latency_s: Option<f64>,
    pub set_latency_s: Option<f64>,
    pub read_energy_j: f64,
    pub write_energy_j: f64,
    pub reset_energy_j: Option<f64>,
    pub set_energy_j: Option<f64>,
    pub leakage_w: f64,
    pub area_m2: f64,
    pub read_bandwidth_bps: f64,
    pub write_bandwidth_bps: f64,
    pub refresh_latency_s: f64,
    pub refresh_dynamic_energy_j: f64,
    pub refresh_power_w: Option<f64>,
}

impl Candidate {
    /// `read-EDP`/`write-EDP` use latency × dynamic energy.
    pub fn objective_value(&self, target: OptimizationTarget) -> f64 {
        use OptimizationTarget::*;
        match target {
            ReadLatency => self.read_latency_s,
            WriteLatency => self.write_latency_s,
            ReadEnergy => self.read_energy_j,
            WriteEnergy => self.write_energy_j,
            ReadEdp => self.read_latency_s * self.read_energy_j,
            WriteEdp => self.write_latency_s * self.write_energy_j,
            Leakage => self.leakage_w,
            Area => self.area_m2,
            FullExploration => self.read_latency_s,
        }
    }
}

/// `invalid` (`None`) bounds are treated as +∞, so an unset constraint is
/// always satisfied.
fn satisfies(value: f64, bound: Option<f64>) -> bool {
    match bound {
        None => true,
        Some(limit) => value <= limit,
    }
}

struct ConstraintCheck {
    ok: bool,
    first_violation: Option<&'static str>,
}

fn check_constraints(c: &Candidate, constraints: &Constraints) -> ConstraintCheck {
    let checks: [(bool, &'static str); 8] = [
        (satisfies(c.read_latency_s, constraints.read_latency), "ReadLatency"),
        (satisfies(c.write_latency_s, constraints.write_latency), "WriteLatency"),
        (satisfies(c.read_energy_j, constraints.read_dynamic_energy), "ReadDynamicEnergy"),
        (satisfies(c.write_energy_j, constraints.write_dynamic_energy), "WriteDynamicEnergy"),
        (satisfies(c.read_latency_s * c.read_energy_j, constraints.read_edp), "ReadEDP"),
        (satisfies(c.write_latency_s * c.write_energy_j, constraints.write_edp), "WriteEDP"),
        (satisfies(c.leakage_w, constraints.leakage), "Leakage"),
        (satisfies(c.area_m2, constraints.area), "Area"),
    ];
    let first_violation = checks.iter().find(|(ok, _)| !ok).map(|(_, name)| *name);
    ConstraintCheck { ok: first_violation.is_none(), first_violation }
}

/// Evaluate one fully-specified design-space point into a [`Candidate`].
pub fn evaluate_point(params: &Parameters, cell: &Cell, tech: &Technology, point: CandidatePoint) -> Candidate {
    let subarray = subarray::evaluate(point.subarray, cell, tech, params.design_target, params.array_kind);
    let mat = mat::evaluate(point.mat, subarray, tech, cell);

    let local_length_m = mat.height_m().max(mat.width_m());
    let global_length_m =
        local_length_m * ((point.bank.num_row_mat * point.bank.num_column_mat).max(1) as f64).sqrt();
    let local_wire = Wire::new(point.local_wire, local_length_m, tech);
    let global_wire = Wire::new(point.global_wire, global_length_m, tech);

    let bank = bank::evaluate(
        point.bank,
        mat,
        params.routing_mode,
        &local_wire,
        &global_wire,
        cell,
        params.design_target,
    );

    let (reset_latency_s, set_latency_s, reset_energy_j, set_energy_j, write_latency_s, write_energy_j) =
        if cell.kind.has_asymmetric_write() {
            let reset_pulse_s = write_pulse_s(cell, true);
            let set_pulse_s = write_pulse_s(cell, false);
            let reset_latency = bank.write_latency_s(reset_pulse_s);
            let set_latency = bank.write_latency_s(set_pulse_s);
            let reset_energy = cell.reset_energy_pj / 1.0e12 + bank.write_dynamic_energy_j();
            let set_energy = cell.set_energy_pj / 1.0e12 + bank.write_dynamic_energy_j();
            (Some(reset_latency), Some(set_latency), Some(reset_energy), Some(set_energy), reset_latency.max(set_latency), reset_energy.max(set_energy))
        } else {
            let pulse_s = write_pulse_s(cell, false);
            (None, None, None, None, bank.write_latency_s(pulse_s), bank.write_dynamic_energy_j())
        };

    let read_latency_s = bank.read_latency_s();
    let read_energy_j = bank.read_dynamic_energy_j();
    let leakage_w = bank.leakage_w();
    let area_m2 = bank.area_m2();
    let read_bandwidth_bps = bank.read_bandwidth_bps(params.word_width_bits as u64, cell);
    let write_bandwidth_bps = bank.write_bandwidth_bps(params.word_width_bits as u64, write_pulse_s(cell, false));
    let refresh_latency_s = bank.refresh_latency_s();
    let refresh_dynamic_energy_j = bank.refresh_dynamic_energy_j();
    let refresh_power_w = bank.refresh_power_w(cell.retention_time_s);

    Candidate {
        point,
        bank,
        local_wire,
        global_wire,
        read_latency_s,
        write_latency_s,
        reset_latency_s,
        set_latency_s,
        read_energy_j,
        write_energy_j,
        reset_energy_j,
        set_energy_j,
        leakage_w,
        area_m2,
        read_bandwidth_bps,
        write_bandwidth_bps,
        refresh_latency_s,
        refresh_dynamic_energy_j,
        refresh_power_w,
    }
}

/// Outcome of driving the search over every admitted point.
pub enum SearchOutcome {
    /// A single incumbent was selected (the common case).
    Incumbent(Box<Candidate>),
    /// `full_exploration`: every admissible candidate, no incumbent.
    Exploration(Vec<Candidate>),
}

/// Drive the search: evaluate every point from [`crate::enumerate::enumerate`],
/// apply constraints, and track the incumbent (or, for `full_exploration`,
/// collect every admissible candidate).
pub fn search(
    params: &Parameters,
    cell: &Cell,
    tech: &Technology,
    points: Vec<CandidatePoint>,
) -> Result<SearchOutcome, InfeasibleError> {
    if params.optimization_target == OptimizationTarget::FullExploration {
        let admitted: Vec<Candidate> = points
            .into_iter()
            .map(|p| evaluate_point(params, cell, tech, p))
            .filter(|c| check_constraints(c, &params.constraints).ok)
            .collect();
        return Ok(SearchOutcome::Exploration(admitted));
    }

    let mut incumbent: Option<Candidate> = None;
    let mut violation_counts: std::collections::HashMap<&'static str, usize> = std::collections::HashMap::new();
    let mut evaluated = 0usize;

    for point in points {
        let candidate = evaluate_point(params, cell, tech, point);
        evaluated += 1;
        debug!(
            "evaluated candidate {}: read={:.3e}s write={:.3e}s area={:.3e}m^2",
            evaluated, candidate.read_latency_s, candidate.write_latency_s, candidate.area_m2
        );
        let check = check_constraints(&candidate, &params.constraints);
        if !check.ok {
            if let Some(name) = check.first_violation {
                *violation_counts.entry(name).or_insert(0) += 1;
            }
            continue;
        }

        let target = params.optimization_target;
        let replace = match &incumbent {
            None => true,
            Some(current) => candidate.objective_value(target) < current.objective_value(target),
        };
        if replace {
            info!("new incumbent at candidate {} (objective = {:.3e})", evaluated, candidate.objective_value(target));
            incumbent = Some(candidate);
        }
    }

    match incumbent {
        Some(c) => Ok(SearchOutcome::Incumbent(Box::new(c))),
        None => {
            let most_violated =
                violation_counts.into_iter().max_by_key(|(_, count)| *count).map(|(name, _)| name).unwrap_or("none");
            Err(InfeasibleError { most_violated: most_violated.to_string(), candidates_evaluated: evaluated })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{apply_pvt, parse_cell};
    use crate::enumerate::enumerate;
    use crate::params::ingest::normalize;

    fn build(doc: serde_json::Value, cell_doc: serde_json::Value) -> (Parameters, Cell, Technology) {
        let params = normalize(&doc).unwrap();
        let (mut cell, _warnings) = parse_cell(&cell_doc).unwrap();
        apply_pvt(&mut cell, params.temperature_k);
        let tech = Technology::for_node(params.process_node_nm, params.device_roadmap);
        (params, cell, tech)
    }

    #[test]
    fn sram_read_latency_search_finds_one_incumbent() {
        let doc = serde_json::json!({
            "DesignTarget": "cache",
            "OptimizationTarget": "ReadLatency",
            "Capacity_KB": 32,
            "WordWidth": 512,
            "Associativity": 8,
            "ProcessNode": 45,
        });
        let cell_doc = serde_json::json!({"CellType": "SRAM"});
        let (params, cell, tech) = build(doc, cell_doc);
        let points = enumerate(&params);
        let outcome = search(&params, &cell, &tech, points).unwrap();
        match outcome {
            SearchOutcome::Incumbent(c) => assert!(c.read_latency_s > 0.0),
            SearchOutcome::Exploration(_) => panic!("expected a single incumbent"),
        }
    }

    #[test]
    fn impossible_read_latency_constraint_is_infeasible() {
        let doc = serde_json::json!({
            "DesignTarget": "RAM",
            "OptimizationTarget": "ReadLatency",
            "Capacity_KB": 1,
            "WordWidth": 64,
            "ProcessNode": 45,
            "Constraints": {"ReadLatency": 1e-12},
        });
        let cell_doc = serde_json::json!({"CellType": "SRAM"});
        let (params, cell, tech) = build(doc, cell_doc);
        let points = enumerate(&params);
        let err = search(&params, &cell, &tech, points).unwrap_err();
        assert_eq!(err.most_violated, "ReadLatency");
    }

    #[test]
    fn pcram_reset_and_set_latency_are_at_least_their_pulse_width() {
        let doc = serde_json::json!({
            "DesignTarget": "RAM",
            "OptimizationTarget": "WriteEDP",
            "Capacity_MB": 1,
            "WordWidth": 64,
            "ProcessNode": 32,
        });
        let cell_doc = serde_json::json!({
            "CellType": "PCRAM",
            "ResetVoltage_V": 2.0,
            "ResetPulse_ns": 10.0,
            "SetVoltage_V": 1.2,
            "SetPulse_ns": 20.0,
            "ResistanceOn_ohm": 1000.0,
        });
        let (params, cell, tech) = build(doc, cell_doc);
        let points = enumerate(&params);
        let outcome = search(&params, &cell, &tech, points).unwrap();
        match outcome {
            SearchOutcome::Incumbent(c) => {
                assert!(c.reset_latency_s.unwrap() >= 10e-9);
                assert!(c.set_latency_s.unwrap() >= 20e-9);
            }
            SearchOutcome::Exploration(_) => panic!("expected a single incumbent"),
        }
    }
}
