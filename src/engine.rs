//! Search engine.
//!
//! This module is the entry point for finding run dates. The search itself
//! lives in `engine/search.rs`; the other submodules observe it or repeat it.
//!
//! ## How the parts work together
//!
//! ```text
//! Schedule ──┐
//! instant ───┼─ CalendarMoment::new            (cursor.rs)
//! zone ──────┘    - bind to zone, drop seconds
//!                        │
//!                        v
//!                  forced first step?          (exclusive, or sub-minute start)
//!                        │
//!                        v
//!            ┌──> first unsatisfied field      (matcher.rs)
//!            │      month → day → hour → minute
//!            │           │
//!            │     Some(kind): increment(kind) ─┐
//!            │     None: skip n-th, or return   │
//!            └──────────────────────────────────┘
//! ```
//!
//! The loop restarts from the month after every mutation. A finer mutation
//! can roll a coarser field over (23:59 + 1 minute is tomorrow), so a fixed
//! nested loop would miss that. Termination comes from
//! [`Options::max_iterations`](crate::Options); running out is
//! [`SearchError::Exhausted`](crate::SearchError).
//!
//! ## Responsibilities by module
//!
//! - `search.rs`: the state machine above, plus tracing.
//! - `metrics.rs`: per-search counters and the verbose report.
//! - `runs.rs`: an iterator that chains searches into a run sequence.
//!
//! ## Debugging
//!
//! Set `CRONWALK_LOG=cronwalk=trace` when running the `cronwalk` binary to see
//! every cursor move.

#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/runs.rs"]
mod runs;
#[path = "engine/search.rs"]
mod search;

#[allow(unused_imports)]
pub use metrics::{SearchMetrics, SearchReport};
#[allow(unused_imports)]
pub use runs::Runs;
pub(crate) use search::{Request, search};
