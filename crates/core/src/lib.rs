//! Core types and shared functionality for dayfetch.
//!
//! This crate provides:
//! - Layered configuration
//! - Unified error types
//! - Date-stamped naming of remote and cached files
//! - The local file store and the bounded-retry download loop
//! - The fetch resolver that ties them together

pub mod config;
pub mod error;
pub mod naming;
pub mod resolver;
pub mod store;
pub mod transport;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use naming::{Naming, ResourceLocation};
pub use resolver::{ExhaustedReason, FetchOutcome, Origin, Resolver};
pub use store::{FsStore, Store};
pub use transport::{AttemptFailure, Reporter, RetryExhausted, SilentReporter, Transport, fetch_with_retries};
