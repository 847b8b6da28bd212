//! Rush City traffic simulation library
//!
//! Cars drive lane by lane across a rectangular city grid, queue behind each
//! other and stop at red traffic lights.

pub mod simulation;
pub mod stats;
