//! Identity-plane service library crate.
//!
//! # Purpose
//! Exposes the identity API surface, auth helpers, configuration, and storage
//! implementations for use by the binary and tests.
//!
//! # Notes
//! Module boundaries mirror the HTTP API and the authentication pipeline.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod model;
pub mod observability;
pub mod store;
