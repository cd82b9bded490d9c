//! Registry-based default dispatch: map `entity_type -> handler` instead of
//! writing one `fetch_fn` that branches on it internally.

use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::paging::state::PagingState;
use crate::protocol::{EntityType, Protocol};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Handler<P> = Arc<dyn Fetch<P>>;

/// Runtime-registered `entity_type -> handler` table.
///
/// A `HandlerRegistry` itself implements [`Fetch`], so it can be handed to
/// [`engine`](crate::config::engine) directly: register one handler per
/// entity type up front, and every batch is routed to the handler matching
/// its members' entity type.
pub struct HandlerRegistry<P: Protocol> {
    handlers: RwLock<HashMap<EntityType, Handler<P>>>,
}

impl<P: Protocol> HandlerRegistry<P> {
    /// An empty registry.
    pub fn new() -> Self {
        Self { handlers: RwLock::new(HashMap::new()) }
    }

    /// Register (or replace) the handler for `entity_type`.
    pub async fn register(&self, entity_type: impl Into<EntityType>, handler: impl Fetch<P> + 'static) {
        self.handlers.write().await.insert(entity_type.into(), Arc::new(handler));
    }

    /// `true` iff a handler is registered for `entity_type`.
    pub async fn contains(&self, entity_type: &EntityType) -> bool {
        self.handlers.read().await.contains_key(entity_type)
    }
}

impl<P: Protocol> Default for HandlerRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<P: Protocol> Fetch<P> for HandlerRegistry<P> {
    async fn fetch(&self, params: Arc<P::Params>, batch: &[PagingState<P>]) -> Result<P::Response> {
        let entity_type = batch
            .first()
            .map(|s| s.entity_type().clone())
            .ok_or_else(|| Error::other("dispatch called with an empty batch"))?;

        let handler = self.handlers.read().await.get(&entity_type).cloned();

        match handler {
            Some(handler) => handler.fetch(params, batch).await,
            None => Err(Error::UnknownDispatch { entity_type: entity_type.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fetch_fn;

    struct Test;
    impl Protocol for Test {
        type Params = ();
        type Id = u64;
        type Item = u64;
        type Cursor = u64;
        type Response = u64;
    }

    #[tokio::test]
    async fn dispatches_to_the_registered_handler_for_the_batchs_entity_type() {
        let registry: HandlerRegistry<Test> = HandlerRegistry::new();
        registry
            .register("widgets", fetch_fn::<Test, _, _>(|_params, _batch| async move { Ok(7) }))
            .await;

        let batch = vec![PagingState::new("widgets", 1)];
        let result = registry.fetch(Arc::new(()), &batch).await.unwrap();
        assert_eq!(result, 7);
    }

    #[tokio::test]
    async fn unregistered_entity_type_raises_unknown_dispatch() {
        let registry: HandlerRegistry<Test> = HandlerRegistry::new();
        let batch = vec![PagingState::new("widgets", 1)];
        let err = registry.fetch(Arc::new(()), &batch).await.unwrap_err();
        assert!(matches!(err, Error::UnknownDispatch { .. }));
    }
}
