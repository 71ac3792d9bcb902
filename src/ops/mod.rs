//! High-level operations

pub mod check;

pub use check::check_unit;
