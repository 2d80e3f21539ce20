//! Pure time-series composition operations.
//!
//! Modules include:
//! - `normalize`: date-format and numeric coercion at the collaborator boundary
//! - `expand`: step-function upsampling to a monthly cadence
//! - `rebase`: rescaling to a reference value at an anchor
//! - `join`: nearest-date matching and bulk alignment
//! - `compound`: percent changes to levels, and splicing with observed history
//! - `recompose`: deflator substitution for ratio series
/// Element-wise currency conversion and averaging of aligned series.
pub mod convert;
/// Cumulative compounding and historical splicing.
pub mod compound;
/// Monthly step-function expansion.
pub mod expand;
/// Nearest-date joins.
pub mod join;
/// Parsing and sanitizing raw provider values.
pub mod normalize;
/// Rebasing to a reference value.
pub mod rebase;
/// Ratio recomposition with a replacement deflator.
pub mod recompose;
/// Descriptive statistics for a series.
pub mod stats;
