//! The scheduler: the single coordinator loop that drives a run.
//!
//! It multiplexes four event sources — new input states, batch
//! completions, a dispatch opportunity after either of those, and an
//! idle-flush timer — and is the only task that ever mutates the batcher,
//! the seen-keys bookkeeping, or writes to the output channel. Dispatched
//! batches run on separate spawned tasks and report back over an mpsc
//! channel; nothing outside this loop touches scheduler state directly.

mod types;

pub(crate) use types::BatchOutcome;
pub use types::Stats;

use crate::batch::{Batch, Batcher};
use crate::config::EngineConfig;
use crate::executor::FetchExecutor;
use crate::paging::state::{CursorState, PagingState};
use crate::protocol::{EntityType, Protocol};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Input channel capacity for [`paginate_stream`]. Large enough that seed
/// bursts rarely block on it; the scheduler's own back-pressure comes from
/// `result_buf` and the concurrency cap, not this buffer.
const INPUT_BUF: usize = 1024;

/// Handle returned by [`paginate_stream`]: feed seed states into `input`,
/// read terminal states from `output`, and optionally await [`stats`]
/// for run-level counters.
///
/// [`stats`]: PaginateStream::stats
pub struct PaginateStream<P: Protocol> {
    /// Send seed (or externally discovered) states here. Drop this sender
    /// once no more states will ever be added to let the run terminate.
    pub input: mpsc::Sender<PagingState<P>>,
    /// Terminal states — done or failed — arrive here in completion order.
    pub output: mpsc::Receiver<PagingState<P>>,
    handle: tokio::task::JoinHandle<Stats>,
}

impl<P: Protocol> PaginateStream<P> {
    /// Close `input` and drop `output`, then await the scheduler's
    /// termination and return its run-level [`Stats`]. Use this only when
    /// you don't need to read `output` yourself; otherwise drain `output`
    /// to completion and track what you need from the emitted states
    /// directly.
    pub async fn stats(self) -> Stats {
        let PaginateStream { input, output, handle } = self;
        drop(input);
        drop(output);
        match handle.await {
            Ok(stats) => stats,
            Err(_) => {
                tracing::error!("scheduler task panicked");
                Stats::default()
            }
        }
    }
}

/// Start a scheduler run and return its input/output channel ends.
///
/// This is the core streaming entry point; [`paginate`](crate::frontend::paginate)
/// and friends are thin blocking wrappers around it.
pub fn paginate_stream<P: Protocol>(config: EngineConfig<P>, params: P::Params) -> PaginateStream<P> {
    let (input_tx, input_rx) = mpsc::channel(INPUT_BUF);
    let (output_tx, output_rx) = mpsc::channel(config.result_buf);
    let params = Arc::new(params);
    let handle = tokio::spawn(run(config, params, input_rx, output_tx));
    PaginateStream { input: input_tx, output: output_rx, handle }
}

async fn run<P: Protocol>(
    config: EngineConfig<P>,
    params: Arc<P::Params>,
    mut input_rx: mpsc::Receiver<PagingState<P>>,
    output_tx: mpsc::Sender<PagingState<P>>,
) -> Stats {
    let mut batcher = Batcher::new(config.batch_fn.clone(), config.max_items, config.sorted);
    let executor = FetchExecutor::new(config.max_concurrency);
    let (completion_tx, mut completion_rx) = mpsc::channel::<BatchOutcome<P>>(config.max_concurrency);
    let mut seen: HashSet<(EntityType, P::Id)> = HashSet::new();
    let mut stats = Stats::default();
    let mut input_closed = false;

    loop {
        if input_closed && batcher.empty() && executor.in_flight() == 0 {
            break;
        }

        let idle = tokio::time::sleep(config.idle_flush);
        tokio::pin!(idle);

        tokio::select! {
            maybe_state = input_rx.recv(), if !input_closed => {
                match maybe_state {
                    Some(state) => accept(state, &mut batcher, &mut seen),
                    None => {
                        input_closed = true;
                        tracing::debug!("input stream closed");
                    }
                }
            }
            Some(outcome) = completion_rx.recv() => {
                handle_completion(&config, outcome, &mut batcher, &mut seen, &output_tx, &mut stats).await;
            }
            _ = &mut idle => {
                if executor.has_capacity() {
                    if let Some(batch) = batcher.force_flush() {
                        stats.batches_force_flushed += 1;
                        tracing::debug!(key = %batch.key, size = batch.members.len(), "idle-flushed a partial batch");
                        dispatch(batch, &config, params.clone(), &executor, completion_tx.clone(), &mut stats);
                    }
                }
            }
        }

        while executor.has_capacity() {
            match batcher.pop_ready() {
                Some(batch) => dispatch(batch, &config, params.clone(), &executor, completion_tx.clone(), &mut stats),
                None => break,
            }
        }

        stats.max_in_flight = stats.max_in_flight.max(executor.in_flight());
    }

    stats
}

fn accept<P: Protocol>(
    state: PagingState<P>,
    batcher: &mut Batcher<P>,
    seen: &mut HashSet<(EntityType, P::Id)>,
) {
    seen.insert(state.key());
    batcher.add(state);
}

fn accept_spawn<P: Protocol>(
    state: PagingState<P>,
    batcher: &mut Batcher<P>,
    seen: &mut HashSet<(EntityType, P::Id)>,
    stats: &mut Stats,
) {
    let key = state.key();
    if seen.contains(&key) {
        stats.spawns_ignored += 1;
        tracing::debug!("ignoring a spawned state whose key collides with one already seen");
        return;
    }
    seen.insert(key);
    stats.spawns_accepted += 1;
    batcher.add(state);
}

async fn handle_completion<P: Protocol>(
    config: &EngineConfig<P>,
    outcome: BatchOutcome<P>,
    batcher: &mut Batcher<P>,
    seen: &mut HashSet<(EntityType, P::Id)>,
    output_tx: &mpsc::Sender<PagingState<P>>,
    stats: &mut Stats,
) {
    let BatchOutcome { members, result } = outcome;

    let response = match result {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(error = %error, "fetch failed for a batch");
            fail_and_emit(members, error, output_tx, stats).await;
            return;
        }
    };

    let parsed = match config.result_parser.parse(&response, &members) {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::warn!(error = %error, "result parser failed for a batch");
            fail_and_emit(members, error, output_tx, stats).await;
            return;
        }
    };

    for mut state in members {
        let key = state.key();
        let items = parsed.items.get(&key).cloned().unwrap_or_default();
        match parsed.cursors.get(&key) {
            Some(cursor) => {
                if let CursorState::Next(prev) = state.cursor() {
                    if prev == cursor {
                        tracing::debug!("a state's cursor did not advance between pages");
                    }
                }
                state.record_page(items, CursorState::Next(cursor.clone()));
                batcher.add(state);
            }
            None => {
                state.record_page(items, CursorState::Done);
                emit(state, output_tx, stats).await;
            }
        }
    }

    for spawn in parsed.spawns {
        accept_spawn(spawn, batcher, seen, stats);
    }
}

async fn fail_and_emit<P: Protocol>(
    mut members: Vec<PagingState<P>>,
    error: crate::error::Error,
    output_tx: &mpsc::Sender<PagingState<P>>,
    stats: &mut Stats,
) {
    for member in &mut members {
        member.fail(error.clone());
    }
    for member in members {
        emit(member, output_tx, stats).await;
    }
}

async fn emit<P: Protocol>(state: PagingState<P>, output_tx: &mpsc::Sender<PagingState<P>>, stats: &mut Stats) {
    stats.states_emitted += 1;
    if output_tx.send(state).await.is_err() {
        tracing::warn!("output receiver dropped before the scheduler finished");
    }
}

fn dispatch<P: Protocol>(
    batch: Batch<P>,
    config: &EngineConfig<P>,
    params: Arc<P::Params>,
    executor: &FetchExecutor,
    completion_tx: mpsc::Sender<BatchOutcome<P>>,
    stats: &mut Stats,
) {
    let fetch_fn = config.fetch_fn.clone();
    let members = batch.members;
    let submitted = executor.try_submit(async move {
        let result = fetch_fn.fetch(params, &members).await;
        let _ = completion_tx.send(BatchOutcome { members, result }).await;
    });
    debug_assert!(submitted, "dispatch called without available concurrency");
    stats.batches_dispatched += 1;
}
