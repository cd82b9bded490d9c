use super::*;
use crate::paging::state::PagingState;
use crate::protocol::{EntityType, Protocol};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct Test;
impl Protocol for Test {
    type Params = ();
    type Id = u64;
    type Item = u64;
    type Cursor = u64;
    type Response = ();
}

fn by_entity_type() -> BatchFn<Test> {
    Arc::new(|state: &PagingState<Test>| state.entity_type().clone())
}

#[test]
fn add_forms_a_batch_and_reports_ready_at_max_items() {
    let mut batcher = Batcher::new(by_entity_type(), 2, true);
    assert!(!batcher.add(PagingState::new("widgets", 1)));
    assert!(batcher.add(PagingState::new("widgets", 2)));
}

#[test]
fn pop_ready_returns_none_while_forming() {
    let mut batcher = Batcher::new(by_entity_type(), 2, true);
    batcher.add(PagingState::new("widgets", 1));
    assert!(batcher.pop_ready().is_none());
}

#[test]
fn pop_ready_returns_the_smallest_keyed_batch_first() {
    let mut batcher = Batcher::new(by_entity_type(), 1, true);
    batcher.add(PagingState::new("zzz", 1));
    batcher.add(PagingState::new("aaa", 1));
    let batch = batcher.pop_ready().expect("a batch should be ready");
    assert_eq!(&*batch.key, "aaa");
    let batch = batcher.pop_ready().expect("a batch should be ready");
    assert_eq!(&*batch.key, "zzz");
}

#[test]
fn force_flush_promotes_a_partial_forming_batch() {
    let mut batcher = Batcher::new(by_entity_type(), 10, false);
    batcher.add(PagingState::new("widgets", 1));
    assert!(batcher.pop_ready().is_none());
    let batch = batcher.force_flush().expect("a partial batch should flush");
    assert_eq!(batch.members.len(), 1);
    assert!(batcher.force_flush().is_none());
}

#[test]
fn empty_reports_whether_any_batch_holds_members() {
    let mut batcher = Batcher::new(by_entity_type(), 10, false);
    assert!(batcher.empty());
    batcher.add(PagingState::new("widgets", 1));
    assert!(!batcher.empty());
}

#[test]
fn add_starts_a_fresh_batch_once_the_previous_one_for_a_key_is_ready() {
    // Many same-key states arriving before a Ready batch is popped (e.g. the
    // executor is at its concurrency cap) must not all pile into one
    // over-sized batch — each full `max_items` group gets its own batch.
    let mut batcher = Batcher::new(by_entity_type(), 1, false);
    for id in 0..5u64 {
        assert!(batcher.add(PagingState::new("widgets", id)));
    }
    for _ in 0..5 {
        let batch = batcher.pop_ready().expect("a batch should be ready");
        assert_eq!(batch.members.len(), 1);
    }
    assert!(batcher.pop_ready().is_none());
}

#[test]
fn add_leaves_an_undispatched_ready_batch_untouched_and_queues_a_new_one() {
    let mut batcher = Batcher::new(by_entity_type(), 2, false);
    assert!(!batcher.add(PagingState::new("widgets", 1)));
    assert!(batcher.add(PagingState::new("widgets", 2))); // first batch -> Ready, not popped yet
    assert!(!batcher.add(PagingState::new("widgets", 3))); // must start a new Forming batch

    let first = batcher.pop_ready().expect("the first batch should still be ready");
    assert_eq!(first.members.len(), 2);
    assert!(batcher.pop_ready().is_none(), "the second batch hasn't reached max_items yet");
}

#[test]
fn custom_batch_fn_groups_by_a_derived_key() {
    let batch_fn: BatchFn<Test> = Arc::new(|state: &PagingState<Test>| {
        EntityType::from(format!("{}:{}", state.entity_type(), state.id() % 2))
    });
    let mut batcher = Batcher::new(batch_fn, 2, true);
    batcher.add(PagingState::new("widgets", 1));
    batcher.add(PagingState::new("widgets", 3));
    assert!(batcher.pop_ready().is_some());
}
