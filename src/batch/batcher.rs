//! Groups pending `PagingState`s into batches by a batch-key function,
//! handing complete ones back to the scheduler.

use crate::paging::state::PagingState;
use crate::protocol::{EntityType, Protocol};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

/// Lifecycle of a [`Batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Still accepting members, hasn't reached `max_items`.
    Forming,
    /// Reached `max_items`, or was force-flushed; ready to dispatch.
    Ready,
    /// Handed off to the executor.
    InFlight,
}

/// A transient grouping of [`PagingState`]s sharing one batch key.
#[derive(Debug)]
pub struct Batch<P: Protocol> {
    /// The key `batch_fn` produced for every member.
    pub key: EntityType,
    /// The grouped states, in the order they were added.
    pub members: Vec<PagingState<P>>,
    /// This batch's current lifecycle stage.
    pub status: BatchStatus,
}

impl<P: Protocol> Batch<P> {
    fn new(key: EntityType) -> Self {
        Self { key, members: Vec::new(), status: BatchStatus::Forming }
    }
}

pub(crate) type BatchFn<P> = Arc<dyn Fn(&PagingState<P>) -> EntityType + Send + Sync>;

/// Groups incoming `PagingState`s into batches of up to `max_items` sharing
/// a batch key, and hands complete batches back to the scheduler.
///
/// A key can have more than one pending batch at once: if states keep
/// arriving for the same key while the executor is at its concurrency cap,
/// the previous `Ready` batch for that key sits undispatched, and `add()`
/// must not keep stuffing members into it past `max_items`. So each key owns
/// a FIFO queue of batches rather than a single one; `add()` only ever
/// appends to the queue's tail, and only while that tail batch is still
/// `Forming`, starting a fresh one otherwise. `pop_ready`/`force_flush` pull
/// from a queue's head, so same-key batches dispatch in the order they
/// filled.
///
/// Batches are always kept in ascending key order internally. In `sorted`
/// mode that ordering is the dispatch contract; in unordered mode it is
/// simply one valid realization of "any order" (see DESIGN.md) — this
/// batcher never needs two code paths to honor both modes.
pub struct Batcher<P: Protocol> {
    batch_fn: BatchFn<P>,
    max_items: usize,
    sorted: bool,
    batches: BTreeMap<EntityType, VecDeque<Batch<P>>>,
}

impl<P: Protocol> Batcher<P> {
    /// Create a batcher. `max_items` must be at least 1.
    pub fn new(batch_fn: BatchFn<P>, max_items: usize, sorted: bool) -> Self {
        assert!(max_items >= 1, "max_items must be at least 1");
        Self { batch_fn, max_items, sorted, batches: BTreeMap::new() }
    }

    /// Whether this batcher is configured for sorted dispatch.
    pub fn sorted(&self) -> bool {
        self.sorted
    }

    /// Add a state to its key's tail batch, starting a fresh one if the
    /// tail is missing or already `Ready`/`InFlight`. Returns `true` if the
    /// batch the state landed in just became `Ready`.
    pub fn add(&mut self, state: PagingState<P>) -> bool {
        let key = (self.batch_fn)(&state);
        let queue = self.batches.entry(key.clone()).or_default();
        let needs_new_tail = !matches!(queue.back(), Some(batch) if batch.status == BatchStatus::Forming);
        if needs_new_tail {
            queue.push_back(Batch::new(key));
        }
        let batch = queue.back_mut().expect("a forming batch was just ensured");
        batch.members.push(state);
        if batch.status == BatchStatus::Forming && batch.members.len() >= self.max_items {
            batch.status = BatchStatus::Ready;
            true
        } else {
            false
        }
    }

    /// Remove and return the oldest `Ready` batch of the smallest key that
    /// has one, if any.
    pub fn pop_ready(&mut self) -> Option<Batch<P>> {
        let key = self
            .batches
            .iter()
            .find(|(_, q)| matches!(q.front(), Some(b) if b.status == BatchStatus::Ready))
            .map(|(k, _)| k.clone())?;
        self.pop_front(&key)
    }

    /// Promote the smallest-keyed non-empty `Forming` batch straight to
    /// dispatch-ready and return it. Used by the scheduler's idle-timeout
    /// flush so partial batches don't wait forever for more members.
    ///
    /// Only a key's tail batch can ever be `Forming` (every earlier batch in
    /// its queue already reached `Ready`), so this promotes and removes the
    /// tail, leaving any older `Ready` batches for that key in front of it
    /// to be drained first via [`pop_ready`](Self::pop_ready).
    pub fn force_flush(&mut self) -> Option<Batch<P>> {
        let key = self
            .batches
            .iter()
            .find(|(_, q)| matches!(q.back(), Some(b) if b.status == BatchStatus::Forming && !b.members.is_empty()))
            .map(|(k, _)| k.clone())?;
        let queue = self.batches.get_mut(&key)?;
        let mut batch = queue.pop_back()?;
        batch.status = BatchStatus::InFlight;
        if queue.is_empty() {
            self.batches.remove(&key);
        }
        Some(batch)
    }

    /// `true` iff no batch currently holds any members.
    pub fn empty(&self) -> bool {
        self.batches.values().all(|q| q.iter().all(|b| b.members.is_empty()))
    }

    fn pop_front(&mut self, key: &EntityType) -> Option<Batch<P>> {
        let queue = self.batches.get_mut(key)?;
        let mut batch = queue.pop_front()?;
        batch.status = BatchStatus::InFlight;
        if queue.is_empty() {
            self.batches.remove(key);
        }
        Some(batch)
    }
}
