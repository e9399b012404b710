//! The typed parameter model and its JSON ingestion/normalization.
//! Ingestion itself lives in [`ingest`]; this module only defines the
//! canonical, already-normalized shape.

pub mod ingest;

use std::fmt;

/// A closed integer axis, inclusive on both ends. `min <= max` is an
/// invariant enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

impl Range {
    pub fn new(min: u32, max: u32) -> Result<Self, crate::error::ConfigError> {
        if min > max {
            return Err(crate::error::ConfigError::InvalidRange {
                axis: String::new(),
                min: min as i64,
                max: max as i64,
            });
        }
        Ok(Self { min, max })
    }

    pub fn fixed(value: u32) -> Self {
        Self { min: value, max: value }
    }

    /// Iterate admissible values, restricted to powers of two, as required
    /// for the mat/subarray tiling axes.
    pub fn powers_of_two(&self) -> impl Iterator<Item = u32> + Clone {
        let (min, max) = (self.min, self.max);
        (0u32..32).map(|p| 1u32 << p).filter(move |v| *v >= min && *v <= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DesignTarget {
    Cache,
    RamChip,
    CamChip,
}

/// Which half of a cache run a subarray belongs to: the wide data array or
/// the narrow tag array searched alongside it. Only the tag array carries a
/// comparator stage, since only tag bits get matched against an incoming
/// address. Meaningless (and ignored) outside `DesignTarget::Cache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArrayKind {
    #[default]
    Data,
    Tag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizationTarget {
    ReadLatency,
    WriteLatency,
    ReadEnergy,
    WriteEnergy,
    ReadEdp,
    WriteEdp,
    Leakage,
    Area,
    FullExploration,
}

impl OptimizationTarget {
    pub fn is_edp(&self) -> bool {
        matches!(self, OptimizationTarget::ReadEdp | OptimizationTarget::WriteEdp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheAccessMode {
    Normal,
    Fast,
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRoadmap {
    Hp,
    Lop,
    Lstp,
    Igzo,
    Cnt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    LocalAggressive,
    LocalConservative,
    SemiGlobalAggressive,
    SemiGlobalConservative,
    GlobalAggressive,
    GlobalConservative,
    DramWordline,
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WireType::LocalAggressive => "Local Aggressive",
            WireType::LocalConservative => "Local Conservative",
            WireType::SemiGlobalAggressive => "Semi-Global Aggressive",
            WireType::SemiGlobalConservative => "Semi-Global Conservative",
            WireType::GlobalAggressive => "Global Aggressive",
            WireType::GlobalConservative => "Global Conservative",
            WireType::DramWordline => "DRAM Wire",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeaterType {
    None,
    FullyOptimized,
    Overhead5,
    Overhead10,
    Overhead20,
    Overhead30,
    Overhead40,
    Overhead50,
}

impl fmt::Display for RepeaterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RepeaterType::None => "No Repeaters",
            RepeaterType::FullyOptimized => "Fully-Optimized Repeaters",
            RepeaterType::Overhead5 => "Repeaters with 5% Overhead",
            RepeaterType::Overhead10 => "Repeaters with 10% Overhead",
            RepeaterType::Overhead20 => "Repeaters with 20% Overhead",
            RepeaterType::Overhead30 => "Repeaters with 30% Overhead",
            RepeaterType::Overhead40 => "Repeaters with 40% Overhead",
            RepeaterType::Overhead50 => "Repeaters with 50% Overhead",
        };
        f.write_str(s)
    }
}

impl RepeaterType {
    pub const ALL: [RepeaterType; 8] = [
        RepeaterType::None,
        RepeaterType::FullyOptimized,
        RepeaterType::Overhead5,
        RepeaterType::Overhead10,
        RepeaterType::Overhead20,
        RepeaterType::Overhead30,
        RepeaterType::Overhead40,
        RepeaterType::Overhead50,
    ];
}

// Keeps ALL in sync with the repeater-overhead match in Wire::new: a
// missing/extra arm there would otherwise only surface as a silently wrong
// enumeration, not a compile error.
static_assertions::const_assert_eq!(RepeaterType::ALL.len(), 8);

/// Buffer-sizing strategy for repeater/driver area-vs-latency tradeoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferDesignTarget {
    LatencyFirst,
    Balanced,
    AreaFirst,
}

impl BufferDesignTarget {
    pub const ALL: [BufferDesignTarget; 3] =
        [BufferDesignTarget::LatencyFirst, BufferDesignTarget::Balanced, BufferDesignTarget::AreaFirst];
}

static_assertions::const_assert_eq!(BufferDesignTarget::ALL.len(), 3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingMode {
    HTree,
    NonHTree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteScheme {
    Normal,
    SetBeforeReset,
    ResetBeforeSet,
    EraseBeforeSet,
    EraseBeforeReset,
    WriteAndVerify,
}

/// A wire-axis configuration (type, repeater class, low-swing flag). The
/// low-swing / repeater exclusivity rule is enforced by
/// [`WireAxisRanges::combinations`], not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireChoice {
    pub wire_type: WireType,
    pub repeater: RepeaterType,
    pub low_swing: bool,
}

#[derive(Debug, Clone)]
pub struct WireAxisRanges {
    pub wire_types: Vec<WireType>,
    pub repeaters: Vec<RepeaterType>,
    pub low_swing: Vec<bool>,
}

impl WireAxisRanges {
    /// Cross product of the three sub-axes, with the low-swing/repeater
    /// exclusivity rule applied: a combination requesting both low-swing
    /// and a repeater class other than `None` is skipped.
    pub fn combinations(&self) -> Vec<WireChoice> {
        let mut out = Vec::new();
        for &wire_type in &self.wire_types {
            for &repeater in &self.repeaters {
                for &low_swing in &self.low_swing {
                    if low_swing && repeater != RepeaterType::None {
                        continue;
                    }
                    out.push(WireChoice { wire_type, repeater, low_swing });
                }
            }
        }
        out
    }
}

/// Optional upper bound. `None` means "unbounded", replacing the
/// magic-number "invalid_value" sentinel with an explicit absence.
pub type Bound = Option<f64>;

#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub read_latency: Bound,
    pub write_latency: Bound,
    pub read_dynamic_energy: Bound,
    pub write_dynamic_energy: Bound,
    pub read_edp: Bound,
    pub write_edp: Bound,
    pub leakage: Bound,
    pub area: Bound,
}

impl Constraints {
    pub fn is_applied(&self) -> bool {
        self.read_latency.is_some()
            || self.write_latency.is_some()
            || self.read_dynamic_energy.is_some()
            || self.write_dynamic_energy.is_some()
            || self.read_edp.is_some()
            || self.write_edp.is_some()
            || self.leakage.is_some()
            || self.area.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SearchRanges {
    pub num_row_mat: Range,
    pub num_column_mat: Range,
    pub num_active_mat_per_row: Range,
    pub num_active_mat_per_column: Range,
    pub num_row_subarray: Range,
    pub num_column_subarray: Range,
    pub num_active_subarray_per_row: Range,
    pub num_active_subarray_per_column: Range,
    pub mux_sense_amp: Range,
    pub mux_output_lev1: Range,
    pub mux_output_lev2: Range,
    pub num_row_per_set: Range,
}

impl Default for SearchRanges {
    fn default() -> Self {
        Self {
            num_row_mat: Range::new(1, 512).unwrap(),
            num_column_mat: Range::new(1, 512).unwrap(),
            num_active_mat_per_row: Range::new(1, 512).unwrap(),
            num_active_mat_per_column: Range::new(1, 512).unwrap(),
            num_row_subarray: Range::new(1, 2).unwrap(),
            num_column_subarray: Range::new(1, 2).unwrap(),
            num_active_subarray_per_row: Range::new(1, 2).unwrap(),
            num_active_subarray_per_column: Range::new(1, 2).unwrap(),
            mux_sense_amp: Range::new(1, 256).unwrap(),
            mux_output_lev1: Range::new(1, 256).unwrap(),
            mux_output_lev2: Range::new(1, 256).unwrap(),
            num_row_per_set: Range::new(1, 256).unwrap(),
        }
    }
}

/// The fully-normalized parameter set driving one engine run.
#[derive(Debug, Clone)]
pub struct Parameters {
    pub design_target: DesignTarget,
    pub array_kind: ArrayKind,
    pub optimization_target: OptimizationTarget,
    pub capacity_bits: u64,
    pub word_width_bits: u32,
    pub associativity: u32,
    pub cache_access_mode: CacheAccessMode,
    pub process_node_nm: f64,
    pub process_node_r_nm: f64,
    pub process_node_w_nm: f64,
    pub device_roadmap: DeviceRoadmap,
    pub device_roadmap_r: DeviceRoadmap,
    pub device_roadmap_w: DeviceRoadmap,
    pub temperature_k: f64,
    pub ranges: SearchRanges,
    pub local_wires: WireAxisRanges,
    pub global_wires: WireAxisRanges,
    pub buffer_design_targets: Vec<BufferDesignTarget>,
    pub routing_mode: RoutingMode,
    pub internal_sensing: bool,
    pub write_scheme: WriteScheme,
    pub flash_page_size_bits: u64,
    pub flash_block_size_bits: u64,
    pub enable_pruning: bool,
    pub use_cacti_assumption: bool,
    pub constraints: Constraints,
}
