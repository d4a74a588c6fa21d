//! Network communication layer for SmartSub.
//!
//! This crate checks tags against the checkpoint HTTP service and reduces
//! each answer to accepted or rejected.
//!
//! # Components
//!
//! - **TagValidator**: the seam the engine validates through
//! - **ValidationClient**: reqwest-based implementation against the service
//! - **classify_response**: status/body rules that decide the verdict
//!
//! # Example
//!
//! ```no_run
//! use smartsub_core::Tag;
//! use smartsub_network::{TagValidator, ValidationClient, ValidationClientConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ValidationClientConfig {
//!     base_url: "http://127.0.0.1:9062/api/checkpoint-posto".to_string(),
//!     timeout: Duration::from_millis(2500),
//!     ..ValidationClientConfig::default()
//! };
//!
//! let client = ValidationClient::new(config)?;
//! let accepted = client.validate(&Tag::new("E2003412")?).await;
//! # Ok(())
//! # }
//! ```

mod classify;
mod client;
mod validator;

pub use classify::{classify_response, is_truthy};
pub use client::{
    ValidationClient, ValidationClientConfig, ValidationClientError, ValidationResponse,
};
pub use validator::TagValidator;
