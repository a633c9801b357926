//! Transformation module.
//!
//! - Grouper: source rows to per-crop and per-state views
//! - Pipeline: load, group, check and persist in one call

pub mod grouper;
pub mod pipeline;

pub use grouper::{collect_groups, group_by_crop, group_by_state, SEPARATOR};
pub use pipeline::*;
