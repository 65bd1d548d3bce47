//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`; request IDs flow through the
//!   middleware stack
//! - Metrics are cheap (atomic increments) and exposition is optional,
//!   on a separate listener so scrapes never compete with submissions

pub mod logging;
pub mod metrics;
