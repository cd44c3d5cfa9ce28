//! Client code for dayfetch.
//!
//! This crate provides the HTTP transport used by the fetch resolver in
//! `dayfetch_core`, plus download link validation.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, UrlError, check_root, parse_link};
