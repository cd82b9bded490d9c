//! The `ResultParser` contract and convenience builders for it.

use crate::error::{Error, Result};
use crate::paging::state::PagingState;
use crate::protocol::{EntityType, Protocol};
use std::collections::HashMap;
use std::sync::Arc;

/// Key used to address one state's contribution within a [`ParseOutcome`]:
/// `(entity_type, id)`.
pub type StateKey<P> = (EntityType, <P as Protocol>::Id);

/// What a [`ResultParser`] extracts from one fetch response.
pub struct ParseOutcome<P: Protocol> {
    /// Next cursor per state; a state with no entry here is done.
    pub cursors: HashMap<StateKey<P>, P::Cursor>,
    /// New items per state; a state with no entry here got none this round.
    pub items: HashMap<StateKey<P>, Vec<P::Item>>,
    /// Freshly discovered states to inject into the scheduler.
    pub spawns: Vec<PagingState<P>>,
}

impl<P: Protocol> Default for ParseOutcome<P> {
    fn default() -> Self {
        Self { cursors: HashMap::new(), items: HashMap::new(), spawns: Vec::new() }
    }
}

impl<P: Protocol> ParseOutcome<P> {
    /// An outcome with no cursors, items, or spawns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `cursor` as the next page for `key`.
    #[must_use]
    pub fn with_cursor(mut self, key: StateKey<P>, cursor: P::Cursor) -> Self {
        self.cursors.insert(key, cursor);
        self
    }

    /// Record `items` as fetched this round for `key`.
    #[must_use]
    pub fn with_items(mut self, key: StateKey<P>, items: Vec<P::Item>) -> Self {
        self.items.insert(key, items);
        self
    }

    /// Queue `state` to be injected into the scheduler.
    #[must_use]
    pub fn with_spawn(mut self, state: PagingState<P>) -> Self {
        self.spawns.push(state);
        self
    }
}

/// Contract a caller implements to turn one batch's raw response into a
/// [`ParseOutcome`]: the items and next cursor for every state the batch
/// covered, plus any newly discovered states to spawn.
///
/// See [`result_parser1`] and [`result_parser`] for building one from plain
/// closures instead of a dedicated type.
pub trait ResultParser<P: Protocol>: Send + Sync {
    /// Parse one batch's response.
    fn parse(&self, response: &P::Response, batch: &[PagingState<P>]) -> Result<ParseOutcome<P>>;
}

// ============================================================================
// Single-state parser
// ============================================================================

type ItemsOf<P> = Arc<dyn Fn(&<P as Protocol>::Response) -> Vec<<P as Protocol>::Item> + Send + Sync>;
type CursorOf<P> = Arc<dyn Fn(&<P as Protocol>::Response) -> Option<<P as Protocol>::Cursor> + Send + Sync>;
type SpawnsOf<P> = Arc<dyn Fn(&<P as Protocol>::Response) -> Vec<PagingState<P>> + Send + Sync>;

/// A [`ResultParser`] built from plain closures, for a `fetch_fn` that only
/// ever dispatches batches of exactly one state (`max_items == 1`).
///
/// Raises [`Error::InvalidBatchSize`] if applied to a larger batch.
pub struct SingleStateParser<P: Protocol> {
    items_of: ItemsOf<P>,
    cursor_of: CursorOf<P>,
    spawns_of: Option<SpawnsOf<P>>,
}

impl<P: Protocol> SingleStateParser<P> {
    /// Attach a spawns extractor.
    #[must_use]
    pub fn with_spawns(
        mut self,
        spawns_of: impl Fn(&P::Response) -> Vec<PagingState<P>> + Send + Sync + 'static,
    ) -> Self {
        self.spawns_of = Some(Arc::new(spawns_of));
        self
    }
}

impl<P: Protocol> ResultParser<P> for SingleStateParser<P> {
    fn parse(&self, response: &P::Response, batch: &[PagingState<P>]) -> Result<ParseOutcome<P>> {
        if batch.len() != 1 {
            return Err(Error::InvalidBatchSize { size: batch.len() });
        }
        let key = batch[0].key();

        let mut outcome = ParseOutcome::new().with_items(key.clone(), (self.items_of)(response));
        if let Some(cursor) = (self.cursor_of)(response) {
            outcome = outcome.with_cursor(key, cursor);
        }
        if let Some(spawns_of) = &self.spawns_of {
            for spawn in spawns_of(response) {
                outcome = outcome.with_spawn(spawn);
            }
        }
        Ok(outcome)
    }
}

/// Build a [`ResultParser`] for a `fetch_fn` that only ever dispatches
/// single-state batches. `cursor_of` returning `None` means "no further
/// pages".
pub fn result_parser1<P: Protocol>(
    items_of: impl Fn(&P::Response) -> Vec<P::Item> + Send + Sync + 'static,
    cursor_of: impl Fn(&P::Response) -> Option<P::Cursor> + Send + Sync + 'static,
) -> SingleStateParser<P> {
    SingleStateParser { items_of: Arc::new(items_of), cursor_of: Arc::new(cursor_of), spawns_of: None }
}

// ============================================================================
// Multi-state parser
// ============================================================================

/// One state's contribution to a multi-state batch response.
pub struct StateUpdate<P: Protocol> {
    /// The entity type this update belongs to.
    pub entity_type: EntityType,
    /// The entity id this update belongs to.
    pub id: P::Id,
    /// Items fetched this round for this entity.
    pub items: Vec<P::Item>,
    /// Next cursor for this entity; `None` means done.
    pub cursor: Option<P::Cursor>,
}

type StatesOf<P> = Arc<dyn Fn(&<P as Protocol>::Response) -> Vec<StateUpdate<P>> + Send + Sync>;

/// A [`ResultParser`] built from a plain closure, for a `fetch_fn` whose
/// responses cover several states at once. Any state in the batch that
/// `states_of` doesn't mention implicitly gets no items and a `None`
/// cursor (i.e. it terminates).
pub struct MultiStateParser<P: Protocol> {
    states_of: StatesOf<P>,
    spawns_of: Option<SpawnsOf<P>>,
}

impl<P: Protocol> MultiStateParser<P> {
    /// Attach a spawns extractor.
    #[must_use]
    pub fn with_spawns(
        mut self,
        spawns_of: impl Fn(&P::Response) -> Vec<PagingState<P>> + Send + Sync + 'static,
    ) -> Self {
        self.spawns_of = Some(Arc::new(spawns_of));
        self
    }
}

impl<P: Protocol> ResultParser<P> for MultiStateParser<P> {
    fn parse(&self, response: &P::Response, _batch: &[PagingState<P>]) -> Result<ParseOutcome<P>> {
        let mut outcome = ParseOutcome::new();
        for update in (self.states_of)(response) {
            let key = (update.entity_type, update.id);
            outcome = outcome.with_items(key.clone(), update.items);
            if let Some(cursor) = update.cursor {
                outcome = outcome.with_cursor(key, cursor);
            }
        }
        if let Some(spawns_of) = &self.spawns_of {
            for spawn in spawns_of(response) {
                outcome = outcome.with_spawn(spawn);
            }
        }
        Ok(outcome)
    }
}

/// Build a [`ResultParser`] for a `fetch_fn` whose responses cover several
/// states at once.
pub fn result_parser<P: Protocol>(
    states_of: impl Fn(&P::Response) -> Vec<StateUpdate<P>> + Send + Sync + 'static,
) -> MultiStateParser<P> {
    MultiStateParser { states_of: Arc::new(states_of), spawns_of: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Test;
    impl Protocol for Test {
        type Params = ();
        type Id = u64;
        type Item = u64;
        type Cursor = u64;
        type Response = Vec<u64>;
    }

    #[test]
    fn result_parser1_rejects_multi_member_batches() {
        let parser = result_parser1::<Test>(|r| r.clone(), |_| None);
        let batch = vec![PagingState::new("widgets", 1), PagingState::new("widgets", 2)];
        let err = parser.parse(&vec![1, 2], &batch).unwrap_err();
        assert!(matches!(err, Error::InvalidBatchSize { size: 2 }));
    }

    #[test]
    fn result_parser1_extracts_items_and_cursor() {
        let parser = result_parser1::<Test>(
            |r: &Vec<u64>| r.clone(),
            |r: &Vec<u64>| r.last().copied(),
        );
        let batch = vec![PagingState::new("widgets", 1)];
        let outcome = parser.parse(&vec![10, 20, 30], &batch).unwrap();
        let key = (EntityType::from("widgets"), 1u64);
        assert_eq!(outcome.items.get(&key), Some(&vec![10, 20, 30]));
        assert_eq!(outcome.cursors.get(&key), Some(&30));
    }

    #[test]
    fn result_parser1_none_cursor_means_no_entry() {
        let parser = result_parser1::<Test>(|r: &Vec<u64>| r.clone(), |_| None);
        let batch = vec![PagingState::new("widgets", 1)];
        let outcome = parser.parse(&vec![1], &batch).unwrap();
        let key = (EntityType::from("widgets"), 1u64);
        assert!(!outcome.cursors.contains_key(&key));
    }

    #[test]
    fn result_parser_covers_several_states_from_one_response() {
        let parser = result_parser::<Test>(|_: &Vec<u64>| {
            vec![
                StateUpdate { entity_type: "widgets".into(), id: 1, items: vec![1], cursor: Some(2) },
                StateUpdate { entity_type: "widgets".into(), id: 2, items: vec![9], cursor: None },
            ]
        });
        let batch = vec![PagingState::new("widgets", 1), PagingState::new("widgets", 2)];
        let outcome = parser.parse(&vec![], &batch).unwrap();
        assert_eq!(outcome.items.get(&("widgets".into(), 1u64)), Some(&vec![1]));
        assert_eq!(outcome.cursors.get(&("widgets".into(), 1u64)), Some(&2));
        assert!(!outcome.cursors.contains_key(&("widgets".into(), 2u64)));
    }
}
