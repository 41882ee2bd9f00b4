//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! sync operations produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (operation counters via the metrics facade)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`file`, `pid`, `operation`) on every sync event
//! - Counters are recorded unconditionally; without an installed recorder
//!   they cost nothing

pub mod logging;
pub mod metrics;
