//! Settlement readiness and risk scoring.
//!
//! Converts read-only operational records (personnel, security infrastructure,
//! training, threat assessments, incidents, equipment) into readiness, risk and
//! priority scores per settlement, each with the reasons behind a low score.

pub mod config;
pub mod error;
pub mod import;
pub mod readiness;
pub mod telemetry;
