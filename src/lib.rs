//! Relay service library crate.
//!
//! # Purpose
//! Exposes the relay's API surface, configuration, fan-out dispatcher, and
//! storage implementations for use by the binary and tests.
//!
//! # Notes
//! Module boundaries mirror the request path: validation, the subscription
//! service, the store backends, and the publish dispatcher.
pub mod api;
pub mod app;
pub mod config;
pub mod dispatch;
pub mod model;
pub mod observability;
pub mod service;
pub mod store;
pub mod validate;
