//! # apiconf
//!
//! Configure adapters that translate between a legacy flat API and a new
//! nested API.
//!
//! ## Usage
//!
//! ```bash
//! apiconf wizard session.yaml [--output deployment.xml] [--no-deploy]
//! apiconf convert request legacy.json
//! apiconf simulate --converter convertCheckRoamingRequest
//! ```
//!
//! ## Modules
//!
//! - `mapping` - Field mapping between the legacy and new request/response formats
//! - `wizard` - Five-step configuration wizard state machine
//! - `spec_source` - API specification selections and their resolution into text
//! - `transform` - Converter generation through the transform service, and local test runs
//! - `deploy` - Deployment document rendering and simulated deployment
//! - `config` - Layered settings
//! - `app` - Logging, application configuration and fatal error handling
//! - `cli` - Command line interface
pub mod app;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod error;
pub mod mapping;
pub mod spec_source;
pub mod transform;
pub mod wizard;

pub use error::{Error, FieldErrors, Result};
