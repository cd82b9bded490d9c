//! Blocking front-ends: thin adapters from a finite seed collection to a
//! collected result, bridging the streaming core to batch callers.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::paging::state::PagingState;
use crate::protocol::{EntityType, Protocol};
use crate::scheduler::{paginate_stream, PaginateStream};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Seed a run from `(entity_type, id)` pairs, push them to input, close
/// input, and drain output into a list.
///
/// Feeding input and draining output run concurrently (the drain is
/// spawned as its own task): with a large seed collection, the scheduler's
/// `output_tx.send().await` can back-pressure on a full `result_buf` before
/// every seed has even been pushed, so draining only after every seed is
/// sent risks the two sides deadlocking each other.
///
/// Scans the collected outputs and raises the first `exception` seen, if
/// any, once every seed has reached a terminal state.
pub async fn paginate<P: Protocol>(
    config: EngineConfig<P>,
    params: P::Params,
    seeds: impl IntoIterator<Item = (EntityType, P::Id)>,
) -> Result<Vec<PagingState<P>>> {
    let PaginateStream { input, output, .. } = paginate_stream(config, params);

    let drain = tokio::spawn(drain_output(output));

    for (entity_type, id) in seeds {
        if input.send(PagingState::new(entity_type, id)).await.is_err() {
            break;
        }
    }
    drop(input);

    let collected = drain.await.expect("output drain task panicked");

    if let Some(error) = collected.iter().find_map(|s| s.exception().cloned()) {
        return Err(error);
    }
    Ok(collected)
}

async fn drain_output<P: Protocol>(mut output: mpsc::Receiver<PagingState<P>>) -> Vec<PagingState<P>> {
    let mut collected = Vec::new();
    while let Some(state) = output.recv().await {
        collected.push(state);
    }
    collected
}

/// As [`paginate`], but all seeds share one `entity_type`, any states the
/// parser spawns are silently ignored, and the result is the `items` list
/// for each id, in the same order as the input ids.
pub async fn paginate_coll<P: Protocol>(
    config: EngineConfig<P>,
    params: P::Params,
    entity_type: impl Into<EntityType>,
    ids: impl IntoIterator<Item = P::Id>,
) -> Result<Vec<Vec<P::Item>>> {
    let entity_type = entity_type.into();
    let ordered_ids: Vec<P::Id> = ids.into_iter().collect();
    let seeds = ordered_ids.iter().cloned().map(|id| (entity_type.clone(), id));

    let states = paginate(config, params, seeds).await?;

    let mut by_id: HashMap<P::Id, Vec<P::Item>> = states
        .into_iter()
        .filter(|s| *s.entity_type() == entity_type)
        .map(|s| (s.id().clone(), s.into_items()))
        .collect();

    Ok(ordered_ids.into_iter().map(|id| by_id.remove(&id).unwrap_or_default()).collect())
}

/// As [`paginate_coll`] with a single id; returns that id's `items` list.
pub async fn paginate_one<P: Protocol>(
    config: EngineConfig<P>,
    params: P::Params,
    entity_type: impl Into<EntityType>,
    id: P::Id,
) -> Result<Vec<P::Item>> {
    let mut results = paginate_coll(config, params, entity_type, [id]).await?;
    Ok(results.pop().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::engine;
    use crate::error::Error;
    use crate::fetch::fetch_fn;
    use crate::paging::result_parser1;

    struct Test;
    impl Protocol for Test {
        type Params = ();
        type Id = u64;
        type Item = u64;
        type Cursor = u64;
        type Response = Vec<u64>;
    }

    #[tokio::test]
    async fn paginate_coll_preserves_input_id_order() {
        let parser = result_parser1::<Test>(
            |items: &Vec<u64>| items.clone(),
            |_: &Vec<u64>| None,
        );
        let fetch = fetch_fn::<Test, _, _>(|_params, batch: &[PagingState<Test>]| {
            let id = *batch[0].id();
            async move { Ok(vec![id * 10]) }
        });
        let config = engine(parser, fetch).with_concurrency(4);

        let results = paginate_coll(config, (), "widgets", [3u64, 1, 2]).await.unwrap();
        assert_eq!(results, vec![vec![30], vec![10], vec![20]]);
    }

    #[tokio::test]
    async fn paginate_coll_ignores_spawned_states() {
        let parser = result_parser1::<Test>(|_: &Vec<u64>| vec![1], |_: &Vec<u64>| None)
            .with_spawns(|_: &Vec<u64>| vec![PagingState::new("other", 99)]);
        let fetch = fetch_fn::<Test, _, _>(|_params, _batch| async move { Ok(vec![]) });
        let config = engine(parser, fetch);

        let results = paginate_coll(config, (), "widgets", [1u64]).await.unwrap();
        assert_eq!(results, vec![vec![1]]);
    }

    #[tokio::test]
    async fn paginate_one_returns_a_single_items_list() {
        let parser = result_parser1::<Test>(|items: &Vec<u64>| items.clone(), |_: &Vec<u64>| None);
        let fetch = fetch_fn::<Test, _, _>(|_params, _batch| async move { Ok(vec![1, 2, 3]) });
        let config = engine(parser, fetch);

        let items = paginate_one(config, (), "widgets", 1).await.unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn paginate_does_not_stall_when_seeds_outrun_the_output_buffer() {
        // A small result_buf plus a seed count that outruns the scheduler's
        // input buffer reproduces the shape of run that deadlocks if input
        // is fully drained before output draining starts: the coordinator
        // blocks sending a finished state to a full output channel, which
        // stops it from ever freeing room on input, which stops this
        // function's send loop from ever finishing.
        let parser = result_parser1::<Test>(|items: &Vec<u64>| items.clone(), |_: &Vec<u64>| None);
        let fetch = fetch_fn::<Test, _, _>(|_params, batch: &[PagingState<Test>]| {
            let id = *batch[0].id();
            async move { Ok(vec![id]) }
        });
        let config = engine(parser, fetch).with_concurrency(50).with_result_buf(1);

        let seeds = (0..2000u64).map(|id| (EntityType::from("widgets"), id));
        let result = tokio::time::timeout(std::time::Duration::from_secs(10), paginate(config, (), seeds)).await;

        let states = result.expect("paginate should not deadlock").unwrap();
        assert_eq!(states.len(), 2000);
    }

    #[tokio::test]
    async fn paginate_raises_the_first_exception_seen() {
        let parser = result_parser1::<Test>(|_: &Vec<u64>| vec![], |_: &Vec<u64>| None);
        let fetch = fetch_fn::<Test, _, _>(|_params, _batch| async move {
            Err(Error::fetch_failure("upstream unavailable"))
        });
        let config = engine(parser, fetch);

        let err = paginate(config, (), [("widgets".into(), 1u64)]).await.unwrap_err();
        assert!(matches!(err, Error::FetchFailure { .. }));
    }
}
