//! Design-space enumeration: the Cartesian product over the twelve integer
//! axes plus wire axes and buffer-area level, iterated in powers of two,
//! with invalid combinations skipped silently.

use crate::array::bank::BankPoint;
use crate::array::mat::MatPoint;
use crate::array::subarray::SubarrayPoint;
use crate::params::{BufferDesignTarget, Parameters, WireChoice};

/// One fully-specified point in the design space, ready for evaluation by
/// [`crate::search`].
#[derive(Debug, Clone, Copy)]
pub struct CandidatePoint {
    pub bank: BankPoint,
    pub mat: MatPoint,
    pub subarray: SubarrayPoint,
    pub local_wire: WireChoice,
    pub global_wire: WireChoice,
    pub buffer_design_target: BufferDesignTarget,
}

/// Derive the subarray's (numRow, numColumn) from the capacity equation
/// `capacity = numRowMat·numColumnMat·numRowSubarray·numColumnSubarray
/// ·subarray.numRow·subarray.numColumn / (muxSenseAmp·muxOutputLev1·muxOutputLev2) · wordWidth`.
///
/// `numColumn` is pinned to the word width (the natural bit-line pitch for
/// one addressable word) and `numRow` is solved for; both are required to
/// come out as exact powers of two, otherwise the tuple is inadmissible.
fn derive_subarray_dims(
    params: &Parameters,
    num_row_mat: u32,
    num_column_mat: u32,
    num_row_subarray: u32,
    num_column_subarray: u32,
    mux_sense_amp: u32,
    mux_output_lev1: u32,
    mux_output_lev2: u32,
) -> Option<(u32, u32)> {
    let num_column = params.word_width_bits.next_power_of_two().max(1);
    let tile_count = num_row_mat as u64 * num_column_mat as u64 * num_row_subarray as u64 * num_column_subarray as u64;
    let mux_product = mux_sense_amp as u64 * mux_output_lev1 as u64 * mux_output_lev2 as u64;
    if tile_count == 0 || num_column == 0 || params.word_width_bits == 0 {
        return None;
    }

    let numerator = params.capacity_bits.checked_mul(mux_product)?;
    let denominator = tile_count.checked_mul(num_column as u64)?.checked_mul(params.word_width_bits as u64)?;
    if denominator == 0 || numerator % denominator != 0 {
        return None;
    }
    let num_row = numerator / denominator;
    if num_row == 0 || num_row > u32::MAX as u64 || !num_row.is_power_of_two() {
        return None;
    }
    Some((num_row as u32, num_column))
}

/// Produce every admissible [`CandidatePoint`] for `params`, in the
/// lexicographic order `full_exploration` needs for reproducible output:
/// outer axes first.
pub fn enumerate(params: &Parameters) -> Vec<CandidatePoint> {
    let r = &params.ranges;
    let mut out = Vec::new();

    for num_row_mat in r.num_row_mat.powers_of_two() {
        for num_column_mat in r.num_column_mat.powers_of_two() {
            for num_active_mat_per_column in r.num_active_mat_per_column.powers_of_two() {
                if num_active_mat_per_column > num_row_mat {
                    continue;
                }
                for num_active_mat_per_row in r.num_active_mat_per_row.powers_of_two() {
                    if num_active_mat_per_row > num_column_mat {
                        continue;
                    }
                    for num_row_subarray in r.num_row_subarray.powers_of_two() {
                        for num_column_subarray in r.num_column_subarray.powers_of_two() {
                            for num_active_subarray_per_column in r.num_active_subarray_per_column.powers_of_two() {
                                if num_active_subarray_per_column > num_row_subarray {
                                    continue;
                                }
                                for num_active_subarray_per_row in r.num_active_subarray_per_row.powers_of_two() {
                                    if num_active_subarray_per_row > num_column_subarray {
                                        continue;
                                    }
                                    for mux_sense_amp in r.mux_sense_amp.powers_of_two() {
                                        for mux_output_lev1 in r.mux_output_lev1.powers_of_two() {
                                            for mux_output_lev2 in r.mux_output_lev2.powers_of_two() {
                                                let Some((num_row, num_column)) = derive_subarray_dims(
                                                    params,
                                                    num_row_mat,
                                                    num_column_mat,
                                                    num_row_subarray,
                                                    num_column_subarray,
                                                    mux_sense_amp,
                                                    mux_output_lev1,
                                                    mux_output_lev2,
                                                ) else {
                                                    continue;
                                                };

                                                for num_row_per_set in r.num_row_per_set.powers_of_two() {
                                                    if params.design_target == crate::params::DesignTarget::Cache
                                                        && num_row_per_set >= num_row
                                                    {
                                                        continue;
                                                    }

                                                    push_cross_product(
                                                        &mut out,
                                                        params,
                                                        BankPoint {
                                                            num_row_mat,
                                                            num_column_mat,
                                                            num_active_mat_per_row,
                                                            num_active_mat_per_column,
                                                            num_row_per_set,
                                                        },
                                                        MatPoint {
                                                            num_row_subarray,
                                                            num_column_subarray,
                                                            num_active_subarray_per_row,
                                                            num_active_subarray_per_column,
                                                        },
                                                        SubarrayPoint {
                                                            num_row,
                                                            num_column,
                                                            mux_sense_amp,
                                                            mux_output_lev1,
                                                            mux_output_lev2,
                                                        },
                                                    );
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    out
}

fn push_cross_product(
    out: &mut Vec<CandidatePoint>,
    params: &Parameters,
    bank: BankPoint,
    mat: MatPoint,
    subarray: SubarrayPoint,
) {
    for local_wire in params.local_wires.combinations() {
        for global_wire in params.global_wires.combinations() {
            for &buffer_design_target in &params.buffer_design_targets {
                out.push(CandidatePoint { bank, mat, subarray, local_wire, global_wire, buffer_design_target });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ingest::normalize;

    fn params_for(doc: serde_json::Value) -> Parameters {
        normalize(&doc).unwrap()
    }

    #[test]
    fn forced_configuration_yields_one_tile_tuple_per_wire_cross_product() {
        let doc = serde_json::json!({
            "DesignTarget": "RAM",
            "OptimizationTarget": "ReadLatency",
            "Capacity_KB": 1,
            "WordWidth": 64,
            "ProcessNode": 45,
            "ForceBank": {"TotalRows": 4, "TotalColumns": 4, "ActiveRows": 1, "ActiveColumns": 4},
            "ForceMat": {"TotalRows": 1, "TotalColumns": 1, "ActiveRows": 1, "ActiveColumns": 1},
            "ForceMuxSenseAmp": 2,
            "ForceMuxOutputLev1": 1,
            "ForceMuxOutputLev2": 1,
        });
        let params = params_for(doc);
        let points = enumerate(&params);
        assert!(!points.is_empty());
        let tile_tuples: std::collections::HashSet<(u32, u32, u32, u32)> = points
            .iter()
            .map(|p| (p.bank.num_row_mat, p.bank.num_column_mat, p.subarray.num_row, p.subarray.num_column))
            .collect();
        assert_eq!(tile_tuples.len(), 1);
    }

    #[test]
    fn active_count_never_exceeds_total() {
        let doc = serde_json::json!({
            "DesignTarget": "RAM",
            "OptimizationTarget": "ReadLatency",
            "Capacity_KB": 4,
            "WordWidth": 64,
            "ProcessNode": 45,
            "MaxNumRowMat": 4,
            "MaxNumColumnMat": 4,
            "MaxNumActiveMatPerRow": 8,
            "MaxNumActiveMatPerColumn": 8,
        });
        let params = params_for(doc);
        for p in enumerate(&params) {
            assert!(p.bank.num_active_mat_per_row <= p.bank.num_column_mat);
            assert!(p.bank.num_active_mat_per_column <= p.bank.num_row_mat);
        }
    }

    #[test]
    fn full_exploration_produces_at_least_two_candidates() {
        let doc = serde_json::json!({
            "DesignTarget": "RAM",
            "OptimizationTarget": "FullExploration",
            "Capacity_KB": 4,
            "WordWidth": 64,
            "ProcessNode": 45,
        });
        let params = params_for(doc);
        assert!(enumerate(&params).len() >= 2);
    }
}
