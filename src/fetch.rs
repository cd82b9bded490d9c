//! The `Fetch` contract: the caller-supplied function that turns one batch
//! into a raw response.

use crate::error::Result;
use crate::paging::state::PagingState;
use crate::protocol::Protocol;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Contract for the caller-supplied fetch step: given the run's shared
/// `params` and the batch's member states, produce the raw response for
/// that batch. Any error raised here is attached to every member of the
/// batch rather than aborting the run.
#[async_trait]
pub trait Fetch<P: Protocol>: Send + Sync {
    /// Perform one batch's fetch.
    async fn fetch(&self, params: Arc<P::Params>, batch: &[PagingState<P>]) -> Result<P::Response>;
}

/// Wraps a plain async closure as a [`Fetch`] implementation. Built with
/// [`fetch_fn`].
pub struct FetchFn<F> {
    f: F,
}

#[async_trait]
impl<P, F, Fut> Fetch<P> for FetchFn<F>
where
    P: Protocol,
    F: Fn(Arc<P::Params>, &[PagingState<P>]) -> Fut + Send + Sync,
    Fut: Future<Output = Result<P::Response>> + Send,
{
    async fn fetch(&self, params: Arc<P::Params>, batch: &[PagingState<P>]) -> Result<P::Response> {
        (self.f)(params, batch).await
    }
}

/// Build a [`Fetch`] implementation from a plain async closure:
///
/// ```
/// use pagehive::{fetch_fn, Protocol};
/// use std::sync::Arc;
///
/// struct Test;
/// impl Protocol for Test {
///     type Params = ();
///     type Id = u64;
///     type Item = u64;
///     type Cursor = u64;
///     type Response = Vec<u64>;
/// }
///
/// let _ = fetch_fn::<Test, _, _>(|_params: Arc<()>, _batch| async move { Ok(vec![1, 2, 3]) });
/// ```
pub fn fetch_fn<P, F, Fut>(f: F) -> FetchFn<F>
where
    P: Protocol,
    F: Fn(Arc<P::Params>, &[PagingState<P>]) -> Fut + Send + Sync,
    Fut: Future<Output = Result<P::Response>> + Send,
{
    FetchFn { f }
}
