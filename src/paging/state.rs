//! `PagingState` and the three-state cursor.

use crate::error::Error;
use crate::protocol::{EntityType, Protocol};

/// Tracks a single `PagingState`'s progress through its continuation
/// protocol.
///
/// Three states instead of an `Option<Cursor>` because a missing cursor is
/// ambiguous between "never fetched a page yet" and "fetched the last page,
/// stop": collapsing both into `None` is exactly the bug this type exists
/// to rule out.
#[derive(Debug, Clone)]
pub enum CursorState<C> {
    /// No page has been fetched for this state yet.
    NeverFetched,
    /// At least one page has been fetched; the next request uses `C`.
    Next(C),
    /// Pagination for this state is complete.
    Done,
}

impl<C> CursorState<C> {
    /// `true` iff this state has never been dispatched.
    pub fn is_never_fetched(&self) -> bool {
        matches!(self, Self::NeverFetched)
    }

    /// `true` iff pagination is complete.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The pending continuation token, if any.
    pub fn next_cursor(&self) -> Option<&C> {
        match self {
            Self::Next(c) => Some(c),
            _ => None,
        }
    }
}

/// Per-entity pagination progress record: which entity, how many pages
/// have been fetched, the items accumulated so far, where to resume, and
/// whether it ended in error.
///
/// Everything but construction is driven by the scheduler; callers read a
/// `PagingState` back through the output stream once it reaches a terminal
/// state (`cursor` is [`CursorState::Done`] or `exception` is `Some`).
#[derive(Debug, Clone)]
pub struct PagingState<P: Protocol> {
    pub(crate) entity_type: EntityType,
    pub(crate) id: P::Id,
    pub(crate) pages: u64,
    pub(crate) items: Vec<P::Item>,
    pub(crate) cursor: CursorState<P::Cursor>,
    pub(crate) exception: Option<Error>,
}

impl<P: Protocol> PagingState<P> {
    /// Construct a fresh state: zero pages, no items, cursor unset.
    pub fn new(entity_type: impl Into<EntityType>, id: P::Id) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
            pages: 0,
            items: Vec::new(),
            cursor: CursorState::NeverFetched,
            exception: None,
        }
    }

    /// The entity kind this state belongs to.
    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// This entity's identifier, unique within `entity_type`.
    pub fn id(&self) -> &P::Id {
        &self.id
    }

    /// How many pages have been successfully fetched for this state.
    pub fn pages(&self) -> u64 {
        self.pages
    }

    /// Items accumulated across all pages fetched so far.
    pub fn items(&self) -> &[P::Item] {
        &self.items
    }

    /// This state's cursor progress.
    pub fn cursor(&self) -> &CursorState<P::Cursor> {
        &self.cursor
    }

    /// The error that ended this state's pagination, if it ended in error.
    pub fn exception(&self) -> Option<&Error> {
        self.exception.as_ref()
    }

    /// `true` once this state will never be dispatched again: cursor
    /// reached `Done`, or an exception was attached.
    pub fn is_terminal(&self) -> bool {
        self.cursor.is_done() || self.exception.is_some()
    }

    /// Identity key the scheduler uses to detect duplicates and spawn
    /// collisions: `(entity_type, id)`.
    pub fn key(&self) -> (EntityType, P::Id) {
        (self.entity_type.clone(), self.id.clone())
    }

    /// Consume the state, returning its accumulated items.
    pub fn into_items(self) -> Vec<P::Item> {
        self.items
    }

    pub(crate) fn record_page(&mut self, items: Vec<P::Item>, cursor: CursorState<P::Cursor>) {
        self.items.extend(items);
        self.pages += 1;
        self.cursor = cursor;
    }

    pub(crate) fn fail(&mut self, error: Error) {
        self.exception = Some(error);
    }
}
