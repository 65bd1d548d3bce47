//! Admission control subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming submission:
//!     → limits.rs (reject oversized bodies)
//!     → rate_limit.rs (per-IP window counter)
//!     → Pass to the dispatcher
//! ```
//!
//! # Design Decisions
//! - Everything here runs before a job exists; the queue does no
//!   admission accounting of its own
//! - Fail closed: rejection on any check failure
//! - Liveness (`/test`) bypasses admission entirely

pub mod limits;
pub mod rate_limit;
