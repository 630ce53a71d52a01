//! HTTP handlers for contact-service.
//!
//! Public routes live under `/api`; `health` holds the operational probes.

pub mod contact;
pub mod health;
pub mod root;
pub mod status;

pub use contact::submit_contact;
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use root::root;
pub use status::{create_status_check, list_status_checks};
