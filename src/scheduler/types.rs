//! Types used internally by the scheduler loop, plus the run-level
//! [`Stats`] exposed to callers.

use crate::error::Result;
use crate::paging::state::PagingState;
use crate::protocol::Protocol;

/// Result of one in-flight batch's fetch, posted back to the coordinator
/// over the completion channel.
pub(crate) struct BatchOutcome<P: Protocol> {
    pub members: Vec<PagingState<P>>,
    pub result: Result<P::Response>,
}

/// Counters describing one scheduler run. Not a substitute for a real
/// metrics pipeline, just enough visibility to write assertions in tests
/// and to answer "did this run do roughly what I expected".
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Batches that reached `Ready` via `max_items` and were dispatched.
    pub batches_dispatched: usize,
    /// Batches force-dispatched by the idle-flush timer while still partial.
    pub batches_force_flushed: usize,
    /// States emitted to the output stream (terminal, successful or not).
    pub states_emitted: usize,
    /// Spawned states accepted into the run.
    pub spawns_accepted: usize,
    /// Spawned states ignored due to a key collision with a live or
    /// already-seen state.
    pub spawns_ignored: usize,
    /// Highest in-flight batch count observed during the run.
    pub max_in_flight: usize,
}
