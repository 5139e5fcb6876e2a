//! Managed profile provisioning
//!
//! Binary-side wiring: configuration loading, tracing setup and assembly of
//! the provisioning flow on top of the simulated device.

pub mod bootstrap;
