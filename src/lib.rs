//! CAD generation relay.
//!
//! A small HTTP service that sits between many concurrent clients and a
//! single-capacity CAD execution engine.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                    CAD RELAY                     │
//!                 │                                                  │
//!  Client ────────┼─▶ security ──▶ http ──▶ queue ──▶ executor ──────┼──▶ CAD engine
//!  (POST code)    │   (rate limit,  (dispatch)  (FIFO,    (HTTP      │    (one job
//!                 │    body cap)               1 worker)   adapter)  │     at a time)
//!                 │                                                  │
//!  Client ◀───────┼── response shaping (JSON mesh / binary file) ◀───┼──── result
//!                 │                                                  │
//!                 │  Cross-cutting: config, observability, lifecycle │
//!                 └──────────────────────────────────────────────────┘
//! ```
//!
//! The queue is the heart of the crate: concurrent submissions are appended
//! to one channel, a single worker drains it, and every job settles exactly
//! once with a result or an HTTP-mappable failure.

pub mod config;
pub mod executor;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod queue;
pub mod security;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use queue::JobQueue;
