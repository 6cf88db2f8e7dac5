//! Statistics calculation.
//!
//! This module computes the flat statistics record from a sequence of
//! trip records.

pub mod aggregator;

pub use aggregator::*;
