// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagehive
//!
//! A concurrent pagination scheduler for fan-out, cursor-based HTTP APIs.
//!
//! Give it a fetch function and a result parser, seed it with the entities
//! you want paginated, and it groups them into batches, dispatches fetches
//! under a concurrency cap, and drives each entity's cursor forward until it
//! reports no further pages or raises an error.
//!
//! ## Quick Start
//!
//! ```
//! use pagehive::{engine, paginate_coll, result_parser1, fetch_fn, Protocol};
//! use std::sync::Arc;
//!
//! struct Github;
//! impl Protocol for Github {
//!     type Params = Arc<str>; // e.g. an API token
//!     type Id = String;       // repo full_name
//!     type Item = u64;        // issue numbers, say
//!     type Cursor = String;   // opaque page token
//!     type Response = Vec<u64>;
//! }
//!
//! # async fn run() -> pagehive::Result<()> {
//! let parser = result_parser1::<Github>(
//!     |items: &Vec<u64>| items.clone(),
//!     |items: &Vec<u64>| if items.is_empty() { None } else { Some("next".to_string()) },
//! );
//! let fetch = fetch_fn::<Github, _, _>(|_token, _batch| async move { Ok(vec![1, 2, 3]) });
//! let config = engine(parser, fetch).with_concurrency(8);
//!
//! let results = paginate_coll(
//!     config,
//!     Arc::from("token"),
//!     "issues",
//!     vec!["octocat/Hello-World".to_string()],
//! ).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      paginate / paginate_coll                    │
//! │            (blocking front-ends over the streaming core)         │
//! └──────────────────────────────────────────────────────────────────┘
//!                                 │
//!                        paginate_stream
//!                                 │
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          scheduler loop                          │
//! │  input stream ─┐                                                 │
//! │  completions  ─┼─▶ select! ─▶ Batcher ─▶ FetchExecutor ─▶ Fetch   │
//! │  idle timer   ─┘             (batch/)    (executor.rs)  (fetch.rs)│
//! └──────────────────────────────────────────────────────────────────┘
//!                                 │
//!                     ResultParser::parse (paging/parser.rs)
//!                                 │
//!                 PagingState updates, spawns, output emission
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error type shared across the scheduler core.
pub mod error;

/// The `Protocol` trait bundling a caller's pagination-protocol types.
pub mod protocol;

/// `PagingState`, its cursor convention, and the `ResultParser` contract.
pub mod paging;

/// Batching of pending states into dispatch-ready groups.
pub mod batch;

/// The caller-supplied fetch contract.
pub mod fetch;

/// Bounded-concurrency task runner for dispatched batches.
pub mod executor;

/// Runtime `entity_type -> handler` registry, usable as a default `Fetch`.
pub mod registry;

/// `EngineConfig` and its builder.
pub mod config;

/// The scheduler coordinator loop and its streaming entry point.
pub mod scheduler;

/// Blocking front-ends over the streaming core.
pub mod frontend;

// ============================================================================
// Re-exports
// ============================================================================

pub use batch::{Batch, BatchStatus, Batcher};
pub use config::{engine, EngineConfig};
pub use error::{Error, Result};
pub use executor::FetchExecutor;
pub use fetch::{fetch_fn, Fetch, FetchFn};
pub use frontend::{paginate, paginate_coll, paginate_one};
pub use paging::{
    result_parser, result_parser1, CursorState, MultiStateParser, PagingState, ParseOutcome,
    ResultParser, SingleStateParser, StateKey, StateUpdate,
};
pub use protocol::{EntityType, Protocol};
pub use registry::HandlerRegistry;
pub use scheduler::{paginate_stream, PaginateStream, Stats};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
