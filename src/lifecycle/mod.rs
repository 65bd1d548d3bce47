//! Process lifecycle subsystem.
//!
//! Startup is plain code in `main`; this module owns the shutdown path:
//! a broadcast coordinator plus the Ctrl+C watcher that feeds it.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
