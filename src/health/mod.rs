//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Probe execution (prober.rs):
//!     ProbeTransport (injected collaborator)
//!     → bounded by the fixed probe timeout
//!     → interceptor hooks around the call
//!     → collapse every failure mode to `false`
//!
//! Recurring checks (monitor.rs):
//!     5-minute timer
//!     → probe the currently active environment
//!     → fire-and-forget; outcome observable via logs and stats
//! ```
//!
//! # Design Decisions
//! - The prober never errors to its caller; "could not determine" is "down"
//! - The probe timeout is fixed and independent of operation timeouts
//! - The monitor holds a weak back-reference and is cancelled on dispose

pub mod monitor;
pub mod prober;

pub use prober::{HealthProber, ProbeTransport, PROBE_TIMEOUT};
