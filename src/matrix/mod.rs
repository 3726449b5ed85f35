//! Broadcast arithmetic over numeric grids

mod grid;
mod broadcast;

pub use grid::Matrix;
pub use broadcast::{broadcast, check_conformable, MissingValues, Operand, Operation};
