//! Nullable infrastructure for deterministic testing.
//!
//! In-memory stand-ins for the process-external pieces: the clock, the
//! document stores, and the reporting sink. Tests drive time manually and
//! can inject storage or report failures.

pub mod clock;
pub mod sink;
pub mod store;

pub use clock::NullClock;
pub use sink::NullReportingSink;
pub use store::NullStore;
