//! # mp-infra
//!
//! Adapters implementing the provisioning ports: an in-memory simulated
//! device standing in for the user, package and policy subsystems, plus
//! consent and UI adapters.

pub mod consent;
pub mod device;
pub mod ui;

pub use consent::{ScriptedConsent, TerminalConsent};
pub use device::{DeviceFixture, FixtureError, SimulatedDevice};
pub use ui::{LoggingUi, UiEvent};
