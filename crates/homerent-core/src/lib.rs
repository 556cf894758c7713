//! Plumbing shared by Homerent services: configuration loading, error bodies,
//! health probes, request ids and tracing setup.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
