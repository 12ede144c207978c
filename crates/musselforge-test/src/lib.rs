//! Shared test fixtures for MusselForge crates.
//!
//! - [`observations`] - a small deterministic ten-day experiment
//! - [`predictors`] - closed-form mortality predictors
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! musselforge-test = { workspace = true }
//! ```
//!
//! ```ignore
//! use musselforge_test::observations::{experiment, merged_records};
//! use musselforge_test::predictors::CopperThreshold;
//! ```

pub mod observations;
pub mod predictors;

pub use observations::{experiment, merged_records, COPPER_GAP_DAY, LAST_DAY};
pub use predictors::{Constant, CopperRamp, CopperThreshold};
