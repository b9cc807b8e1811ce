//! Core state and service layer for the Sentinel disaster-response console.
//!
//! The modules keep the domain model, the seed feed, the generative-AI
//! gateway and the toolkit-independent view state (map markers, victim
//! registration, dashboard shell) apart from any rendering code.

pub mod gateway;
pub mod math;
pub mod model;
pub mod prelude;
pub mod store;
pub mod telemetry;
pub mod views;

pub use prelude::{GatewayError, GatewayResult, RegistrationError};
