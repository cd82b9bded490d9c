//! Batching of pending `PagingState`s into dispatch-ready groups.

mod batcher;

pub use batcher::{Batch, BatchStatus, Batcher};
pub(crate) use batcher::BatchFn;

#[cfg(test)]
mod tests;
