//! crates/trip_scout_core/src/fanout.rs

use futures::stream::{self, StreamExt};
use std::future::Future;

/// Runs `task` over every input with at most `min(cap, len)` futures in flight.
/// Output order matches input order.
pub async fn bounded_map<T, R, F, Fut>(inputs: Vec<T>, cap: usize, task: F) -> Vec<R>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = R>,
{
    if inputs.is_empty() {
        return Vec::new();
    }
    let limit = cap.min(inputs.len()).max(1);
    stream::iter(inputs).map(task).buffered(limit).collect().await
}
