//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → security layers (body cap, rate limit)
//!     → request.rs (parse submission body)
//!     → [job queue serializes execution]
//!     → response.rs (envelope, JSON vs binary shaping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
