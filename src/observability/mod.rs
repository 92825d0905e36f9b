//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per transition)
//!     → metrics.rs (counters)
//! ```
//!
//! # Design Decisions
//! - Transition id (UUID v4) and generation flow through every event of a transition
//! - Metrics are cheap and recorder-agnostic

pub mod logging;
pub mod metrics;
