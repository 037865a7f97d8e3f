//! Back-office core for the preschool franchise network: enquiry intake with city fan-out,
//! the franchise directory it routes against, and the ambient configuration/telemetry glue.

pub mod actor;
pub mod config;
pub mod error;
pub mod payload;
pub mod telemetry;
pub mod validation;
pub mod workflows;
