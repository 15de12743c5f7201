//! Flow-aware field visibility and verification report compilation for the
//! KYC/AML review dashboard.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
