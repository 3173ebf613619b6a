//! REST API client module for the school backend.
//!
//! This module provides the `SchoolClient` for fetching the school document
//! and the `ApiError` type describing HTTP-level failures.

pub mod client;
pub mod error;

pub use client::SchoolClient;
pub use error::ApiError;
