//! Area/timing/energy design-space exploration for memory arrays.
//!
//! The module layout mirrors the leaves-first component list: technology
//! and cell modeling (C1), wires (C2), the array hierarchy (C3), the
//! enumerator (C4), and the search driver (C5).

pub mod array;
pub mod cache;
pub mod cell;
pub mod enumerate;
pub mod error;
pub mod params;
pub mod report;
pub mod search;
pub mod tech;
pub mod wire;
