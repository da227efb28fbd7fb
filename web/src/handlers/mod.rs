//! HTTP handlers shared by every StayHub service.

pub mod health;

pub use health::{ComponentCheck, health_check, readiness_response};
