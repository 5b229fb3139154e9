//! Risk management.
//!
//! Position sizing policies applied by the simulation engine on entry.

mod position_sizer;

pub use position_sizer::{PositionSizer, SizingMethod};
