//! Converter generation and local converter test runs

pub mod client;
pub mod controller;
pub mod simulate;

pub use client::{GeneratedConverters, HttpTransformClient, MockTransformClient, TransformClient};
pub use controller::{TransformController, TransformOutcome};
pub use simulate::{converter_names, sample_input, simulate, simulate_value};
