//! The bitcell descriptor and its PVT-derived quantities: retention time
//! and write energy, derived where the parameter document leaves them
//! unspecified.

use serde_json::Value;

use crate::error::{ConfigError, DomainWarning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    Sram,
    Dram,
    EDram,
    ThreeTeDram,
    ThreeTeDram333,
    Mram,
    Pcram,
    Fbram,
    Memristor,
    Ctt,
    MlcCtt,
    FeFet,
    MlcFeFet,
    MlcRram,
    SlcNand,
    MlcNand,
}

impl CellType {
    fn from_str(s: &str) -> Option<Self> {
        use CellType::*;
        Some(match s {
            "SRAM" => Sram,
            "DRAM" => Dram,
            "eDRAM" => EDram,
            "3T-eDRAM" => ThreeTeDram,
            "3T-eDRAM-333" => ThreeTeDram333,
            "MRAM" => Mram,
            "PCRAM" => Pcram,
            "FBRAM" => Fbram,
            "memristor" => Memristor,
            "CTT" => Ctt,
            "MLC-CTT" => MlcCtt,
            "FeFET" => FeFet,
            "MLC-FeFET" => MlcFeFet,
            "MLC-RRAM" => MlcRram,
            "SLCNAND" => SlcNand,
            "MLCNAND" => MlcNand,
            _ => return None,
        })
    }

    pub fn is_dram_family(&self) -> bool {
        matches!(self, CellType::Dram | CellType::EDram | CellType::ThreeTeDram | CellType::ThreeTeDram333)
    }

    /// Cell kinds that report a distinct set/reset latency and energy
    /// rather than a single write latency/energy.
    pub fn has_asymmetric_write(&self) -> bool {
        matches!(
            self,
            CellType::Pcram
                | CellType::Fbram
                | CellType::FeFet
                | CellType::MlcFeFet
                | CellType::MlcRram
                | CellType::Memristor
                | CellType::SlcNand
        )
    }

    pub fn is_flash(&self) -> bool {
        matches!(self, CellType::SlcNand | CellType::MlcNand)
    }

    pub fn is_mlc(&self) -> bool {
        matches!(self, CellType::MlcCtt | CellType::MlcFeFet | CellType::MlcRram | CellType::MlcNand)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Voltage,
    Current,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDevice {
    Cmos,
    Bjt,
    Diode,
    None,
}

/// Bitcell descriptor. Fields irrelevant to `kind` are carried (so forced
/// values in a mixed-kind document round-trip) but flagged by
/// [`Cell::domain_warnings`] rather than silently misapplied.
#[derive(Debug, Clone)]
pub struct Cell {
    pub kind: CellType,
    pub area_f2: f64,
    pub aspect_ratio: f64,

    pub resistance_on: f64,
    pub resistance_off: f64,
    pub resistance_on_at_set: Option<f64>,
    pub resistance_on_at_reset: Option<f64>,
    pub resistance_off_at_set: Option<f64>,
    pub resistance_off_at_reset: Option<f64>,

    pub cap_access: f64,
    pub cap_dram_cell: Option<f64>,
    pub max_storage_node_drop_v: Option<f64>,

    pub read_mode: ReadMode,
    pub read_voltage: f64,
    pub read_current: f64,
    pub min_sense_voltage: f64,
    pub wordline_boost_ratio: f64,

    pub reset_voltage: f64,
    pub reset_current: f64,
    pub reset_pulse_ns: f64,
    pub reset_energy_pj: f64,
    pub set_voltage: f64,
    pub set_current: f64,
    pub set_pulse_ns: f64,
    pub set_energy_pj: f64,

    pub access_device: AccessDevice,
    pub access_device_width: f64,
    pub leakage_current_access_device_ua: f64,

    pub retention_time_s: Option<f64>,

    pub n_fingers: u32,
    pub n_lvl: u32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            kind: CellType::Sram,
            area_f2: 146.0,
            aspect_ratio: 1.46,
            resistance_on: 1.0e4,
            resistance_off: 1.0e10,
            resistance_on_at_set: None,
            resistance_on_at_reset: None,
            resistance_off_at_set: None,
            resistance_off_at_reset: None,
            cap_access: 0.0,
            cap_dram_cell: None,
            max_storage_node_drop_v: None,
            read_mode: ReadMode::Voltage,
            read_voltage: 1.0,
            read_current: 0.0,
            min_sense_voltage: 0.1,
            wordline_boost_ratio: 1.0,
            reset_voltage: 0.0,
            reset_current: 0.0,
            reset_pulse_ns: 0.0,
            reset_energy_pj: 0.0,
            set_voltage: 0.0,
            set_current: 0.0,
            set_pulse_ns: 0.0,
            set_energy_pj: 0.0,
            access_device: AccessDevice::Cmos,
            access_device_width: 1.0,
            leakage_current_access_device_ua: 0.0,
            retention_time_s: None,
            n_fingers: 1,
            n_lvl: 2,
        }
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

/// Parse a cell document into a [`Cell`], collecting (not failing on)
/// fields that only make sense for a different cell kind.
pub fn parse_cell(root: &Value) -> Result<(Cell, Vec<DomainWarning>), ConfigError> {
    let kind_str = root
        .get("CellType")
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::MissingKey("CellType".into()))?;
    let kind = CellType::from_str(kind_str)
        .ok_or_else(|| ConfigError::UnknownEnumValue { key: "CellType".into(), value: kind_str.to_string() })?;

    let mut cell = Cell { kind, ..Cell::default() };
    let mut warnings = Vec::new();

    if let Some(v) = get_f64(root, "CellArea_F2")? {
        cell.area_f2 = v;
    }
    if let Some(v) = get_f64(root, "CellAspectRatio")? {
        cell.aspect_ratio = v;
    }
    if let Some(v) = get_f64(root, "ResistanceOn_ohm")? {
        cell.resistance_on = v;
    }
    if let Some(v) = get_f64(root, "ResistanceOff_ohm")? {
        cell.resistance_off = v;
    }
    if let Some(v) = get_f64(root, "ReadVoltage_V")? {
        cell.read_voltage = v;
    }
    if let Some(v) = get_f64(root, "MinSenseVoltage_V")? {
        cell.min_sense_voltage = v;
    }
    if let Some(v) = get_f64(root, "ResetVoltage_V")? {
        cell.reset_voltage = v;
    }
    if let Some(v) = get_f64(root, "ResetCurrent_uA")? {
        cell.reset_current = v / 1.0e6;
    }
    if let Some(v) = get_f64(root, "ResetPulse_ns")? {
        cell.reset_pulse_ns = v;
    }
    // A present-but-zero energy field is treated as absent for the
    // purposes of `apply_pvt`'s derivation.
    if let Some(v) = get_f64(root, "ResetEnergy_pJ")? {
        if v != 0.0 {
            cell.reset_energy_pj = v;
        }
    }
    if let Some(v) = get_f64(root, "SetVoltage_V")? {
        cell.set_voltage = v;
    }
    if let Some(v) = get_f64(root, "SetCurrent_uA")? {
        cell.set_current = v / 1.0e6;
    }
    if let Some(v) = get_f64(root, "SetPulse_ns")? {
        cell.set_pulse_ns = v;
    }
    if let Some(v) = get_f64(root, "SetEnergy_pJ")? {
        if v != 0.0 {
            cell.set_energy_pj = v;
        }
    }
    if let Some(v) = get_f64(root, "LeakageCurrentAccessDevice_uA")? {
        cell.leakage_current_access_device_ua = v;
    }
    if let Some(v) = get_f64(root, "DRAMCellCapacitance_F")? {
        cell.cap_dram_cell = Some(v);
    }
    if let Some(v) = get_f64(root, "MaxStorageNodeDrop_V")? {
        cell.max_storage_node_drop_v = Some(v);
    }
    if let Some(v) = get_f64(root, "RetentionTime_us")? {
        cell.retention_time_s = Some(v / 1.0e6);
    }
    if let Some(v) = get_f64(root, "NumFingers")? {
        cell.n_fingers = v as u32;
    }
    if let Some(v) = get_f64(root, "NumLevels")? {
        cell.n_lvl = v as u32;
    }

    // DRAM-only fields supplied on a non-DRAM-family cell: warn, ignore.
    if !kind.is_dram_family() && root.get("DRAMCellCapacitance_F").is_some() {
        warnings.push(DomainWarning {
            field: "DRAMCellCapacitance_F".into(),
            expected_kind: "DRAM family".into(),
            actual_kind: format!("{:?}", kind),
        });
        cell.cap_dram_cell = None;
    }
    if !kind.is_dram_family() && root.get("MaxStorageNodeDrop_V").is_some() {
        warnings.push(DomainWarning {
            field: "MaxStorageNodeDrop_V".into(),
            expected_kind: "DRAM family".into(),
            actual_kind: format!("{:?}", kind),
        });
        cell.max_storage_node_drop_v = None;
    }

    Ok((cell, warnings))
}

/// Derive retention time and write energy that were left unspecified.
/// Falls back to the "invalid" sentinel (`None`) on a zero-denominator
/// derivation so downstream comparisons treat the candidate as having
/// infinite cost rather than panicking.
pub fn apply_pvt(cell: &mut Cell, temperature_k: f64) {
    let _ = temperature_k;

    if cell.retention_time_s.is_none() && cell.kind.is_dram_family() {
        let leakage_current = cell.leakage_current_access_device_ua / 1.0e6 * effective_width_factor(cell.access_device_width);
        cell.retention_time_s = match (cell.cap_dram_cell, cell.max_storage_node_drop_v) {
            (Some(cap), Some(drop)) if leakage_current > 0.0 => Some(cap * drop / leakage_current),
            _ => None,
        };
    }

    if cell.kind.has_asymmetric_write() {
        if cell.reset_energy_pj == 0.0 {
            cell.reset_energy_pj = derive_write_energy(cell, true) * 1.0e12;
        }
        if cell.set_energy_pj == 0.0 {
            cell.set_energy_pj = derive_write_energy(cell, false) * 1.0e12;
        }
    }
}

fn effective_width_factor(width: f64) -> f64 {
    width.max(0.0)
}

/// `voltage * (voltage - access_drop) / on_resistance * pulse`, with
/// cell-kind-specific branches.
fn derive_write_energy(cell: &Cell, is_reset: bool) -> f64 {
    let (voltage, current, pulse_ns) = if is_reset {
        (cell.reset_voltage, cell.reset_current, cell.reset_pulse_ns)
    } else {
        (cell.set_voltage, cell.set_current, cell.set_pulse_ns)
    };
    let pulse_s = pulse_ns / 1.0e9;

    match cell.kind {
        CellType::Pcram => {
            // PCM clamps to on-resistance throughout the pulse.
            let access_drop = access_device_drop(cell);
            voltage.abs() * (voltage.abs() - access_drop) / cell.resistance_on * pulse_s
        }
        CellType::Fbram => voltage.abs() * current.abs() * pulse_s,
        CellType::Memristor | CellType::FeFet | CellType::MlcFeFet | CellType::MlcRram
            if cell.access_device == AccessDevice::None =>
        {
            let resistance = if is_reset {
                cell.resistance_on_at_reset.unwrap_or(cell.resistance_on)
            } else {
                cell.resistance_on_at_set.unwrap_or(cell.resistance_on)
            };
            if resistance <= 0.0 {
                0.0
            } else {
                voltage.abs() * voltage.abs() / resistance * pulse_s
            }
        }
        _ => {
            let access_drop = access_device_drop(cell);
            if cell.resistance_on <= 0.0 {
                voltage.abs() * current.abs() * pulse_s
            } else {
                voltage.abs() * (voltage.abs() - access_drop) / cell.resistance_on * pulse_s
            }
        }
    }
}

fn access_device_drop(cell: &Cell) -> f64 {
    match cell.access_device {
        AccessDevice::None => 0.0,
        _ => cell.read_voltage * 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retention_time_derived_from_storage_cap_and_leakage() {
        let mut cell = Cell {
            kind: CellType::EDram,
            cap_dram_cell: Some(20e-15),
            max_storage_node_drop_v: Some(0.5),
            leakage_current_access_device_ua: 1.0,
            access_device_width: 1.0,
            ..Cell::default()
        };
        apply_pvt(&mut cell, 350.0);
        let expected = 20e-15 * 0.5 / (1.0e-6);
        assert!((cell.retention_time_s.unwrap() - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn retention_time_falls_back_to_sentinel_on_zero_leakage() {
        let mut cell = Cell {
            kind: CellType::Dram,
            cap_dram_cell: Some(20e-15),
            max_storage_node_drop_v: Some(0.5),
            leakage_current_access_device_ua: 0.0,
            ..Cell::default()
        };
        apply_pvt(&mut cell, 350.0);
        assert!(cell.retention_time_s.is_none());
    }

    #[test]
    fn zero_reset_energy_is_treated_as_absent_and_derived() {
        let mut cell = Cell {
            kind: CellType::Pcram,
            reset_voltage: 2.0,
            reset_pulse_ns: 10.0,
            resistance_on: 1000.0,
            reset_energy_pj: 0.0,
            ..Cell::default()
        };
        apply_pvt(&mut cell, 350.0);
        assert!(cell.reset_energy_pj > 0.0);
    }

    #[test]
    fn domain_mismatched_dram_field_is_warned_not_applied() {
        let doc = serde_json::json!({
            "CellType": "SRAM",
            "DRAMCellCapacitance_F": 20e-15,
        });
        let (cell, warnings) = parse_cell(&doc).unwrap();
        assert!(cell.cap_dram_cell.is_none());
        assert_eq!(warnings.len(), 1);
    }
}
