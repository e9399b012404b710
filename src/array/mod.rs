//! Array hierarchy models: Subarray → Mat → Bank.

pub mod bank;
pub mod mat;
pub mod subarray;

pub use bank::Bank;
pub use mat::Mat;
pub use subarray::Subarray;

/// One circuit stage's contribution to latency, energy, leakage and area.
/// Every named stage (decoder, bitline, sense amp, mux levels, precharger,
/// column decoder, comparator, refresh) is represented as one of these,
/// composed serially for latency and additively for energy/leakage/area.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stage {
    pub read_latency_s: f64,
    pub write_latency_s: f64,
    pub read_energy_j: f64,
    pub write_energy_j: f64,
    pub leakage_w: f64,
    pub area_m2: f64,
}

impl Stage {
    pub fn combine_serial(&self, other: &Stage) -> Stage {
        Stage {
            read_latency_s: self.read_latency_s + other.read_latency_s,
            write_latency_s: self.write_latency_s + other.write_latency_s,
            read_energy_j: self.read_energy_j + other.read_energy_j,
            write_energy_j: self.write_energy_j + other.write_energy_j,
            leakage_w: self.leakage_w + other.leakage_w,
            area_m2: self.area_m2 + other.area_m2,
        }
    }
}
