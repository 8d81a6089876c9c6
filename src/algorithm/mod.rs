//! Pipeline stage algorithms
//!
//! - `duration`: survival durations and event status per record
//! - `matching`: birth-year matched cohorts for inductees
//! - `emit`: model-ready survival rows with exclusion counts

pub mod duration;
pub mod emit;
pub mod matching;
