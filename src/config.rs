//! `EngineConfig`: immutable scheduler configuration, built through a
//! consuming builder.

use crate::fetch::Fetch;
use crate::paging::parser::ResultParser;
use crate::paging::state::PagingState;
use crate::protocol::{EntityType, Protocol};
use std::sync::Arc;
use std::time::Duration;

/// Default idle-flush interval: a forming batch is force-dispatched after
/// this much inactivity so a slow or exhausted input stream can't strand a
/// partial batch forever.
pub const DEFAULT_IDLE_FLUSH: Duration = Duration::from_millis(100);

const DEFAULT_RESULT_BUF: usize = 100;

/// Immutable configuration for one scheduler run.
///
/// Build with [`engine`], then customize via the `with_*` methods, each of
/// which consumes and returns `self`.
#[derive(Clone)]
pub struct EngineConfig<P: Protocol> {
    pub(crate) result_parser: Arc<dyn ResultParser<P>>,
    pub(crate) fetch_fn: Arc<dyn Fetch<P>>,
    pub(crate) max_concurrency: usize,
    pub(crate) result_buf: usize,
    pub(crate) sorted: bool,
    pub(crate) max_items: usize,
    pub(crate) batch_fn: Arc<dyn Fn(&PagingState<P>) -> EntityType + Send + Sync>,
    pub(crate) idle_flush: Duration,
}

/// Build a base [`EngineConfig`] from a result parser and a fetch function.
///
/// Defaults: `max_concurrency` 1, `result_buf` 100, unordered dispatch with
/// `max_items` 1 batched by `entity_type`, and a 100ms idle-flush interval.
pub fn engine<P: Protocol>(
    result_parser: impl ResultParser<P> + 'static,
    fetch_fn: impl Fetch<P> + 'static,
) -> EngineConfig<P> {
    EngineConfig {
        result_parser: Arc::new(result_parser),
        fetch_fn: Arc::new(fetch_fn),
        max_concurrency: 1,
        result_buf: DEFAULT_RESULT_BUF,
        sorted: false,
        max_items: 1,
        batch_fn: Arc::new(|state: &PagingState<P>| state.entity_type().clone()),
        idle_flush: DEFAULT_IDLE_FLUSH,
    }
}

impl<P: Protocol> EngineConfig<P> {
    /// Configure the batcher: dispatch order, states per batch, and
    /// optionally a custom batch-key function (default: `entity_type`).
    #[must_use]
    pub fn with_batcher(
        mut self,
        sorted: bool,
        max_items: usize,
        batch_fn: Option<Arc<dyn Fn(&PagingState<P>) -> EntityType + Send + Sync>>,
    ) -> Self {
        assert!(max_items >= 1, "max_items must be at least 1");
        self.sorted = sorted;
        self.max_items = max_items;
        if let Some(batch_fn) = batch_fn {
            self.batch_fn = batch_fn;
        }
        self
    }

    /// Set the global in-flight batch cap (default 1).
    #[must_use]
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Set the output channel's buffer capacity (default 100).
    #[must_use]
    pub fn with_result_buf(mut self, result_buf: usize) -> Self {
        self.result_buf = result_buf.max(1);
        self
    }

    /// Replace the result parser. There is no narrower way to override just
    /// the items-extraction half of it; the parser is one indivisible
    /// contract in this crate (see [`ResultParser`]).
    #[must_use]
    pub fn with_result_parser(mut self, result_parser: impl ResultParser<P> + 'static) -> Self {
        self.result_parser = Arc::new(result_parser);
        self
    }

    /// Override the idle-flush interval (default 100ms).
    #[must_use]
    pub fn with_idle_flush(mut self, idle_flush: Duration) -> Self {
        self.idle_flush = idle_flush;
        self
    }
}
