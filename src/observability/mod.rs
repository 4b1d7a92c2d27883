//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! session / switcher / account produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters via the metrics facade)
//!
//! Consumers:
//!     → stderr, pretty or JSON
//!     → whatever metrics recorder the embedding binary installs
//! ```
//!
//! # Design Decisions
//! - Library code only emits; the binary decides where output goes
//! - Without an installed recorder metric updates are no-ops

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
