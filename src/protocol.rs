//! The `Protocol` trait bundles the opaque types a caller's pagination
//! protocol is built from, so the rest of the crate only has to carry one
//! generic parameter instead of five.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Opaque tag identifying an entity kind, e.g. `"accounts"` or
/// `"account_repos"`. Cheaply cloneable, used as the scheduler's default
/// batch key and as half of a [`PagingState`](crate::paging::PagingState)'s
/// identity.
pub type EntityType = Arc<str>;

/// Bundles the types that make up one caller's pagination protocol: the
/// opaque request context (`Params`), the per-entity identifier (`Id`), the
/// accumulated item type (`Item`), the opaque next-page cursor (`Cursor`),
/// and the raw fetch response type (`Response`).
///
/// Implement this on a zero-sized marker type and use it to parameterize
/// [`PagingState`](crate::paging::PagingState),
/// [`EngineConfig`](crate::config::EngineConfig), and everything else in the
/// crate:
///
/// ```
/// use pagehive::Protocol;
///
/// struct Github;
///
/// impl Protocol for Github {
///     type Params = ();
///     type Id = String;
///     type Item = String;
///     type Cursor = String;
///     type Response = String;
/// }
/// ```
pub trait Protocol: Send + Sync + 'static {
    /// Caller-chosen context threaded through to every fetch call, opaque
    /// to the scheduler (an HTTP client, an API token, ...).
    type Params: Send + Sync + 'static;
    /// Identifier of one entity, unique within its [`EntityType`].
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;
    /// One accumulated result item.
    type Item: Send + 'static;
    /// Opaque continuation token returned by the fetch/parse round trip.
    type Cursor: Clone + PartialEq + Send + 'static;
    /// Raw response handed from the fetch function to the result parser.
    type Response: Send + 'static;
}
