//! Running fallible work concurrently and collecting every failure.
//!
//! Both collectors wait for all work to finish. There is no early exit, no
//! cancellation and no concurrency cap. Failures are collected in completion
//! order, so the member order of the result is not deterministic.

use std::any::Any;
use std::error::Error as StdError;
use std::future::Future;
use std::panic;
use std::sync::mpsc;
use std::thread;

use futures::stream::{FuturesUnordered, StreamExt};

use super::Aggregate;
use crate::chain::{into_dyn, DynError};

type PanicPayload = Box<dyn Any + Send + 'static>;

/// Spawns one tokio task per future and aggregates the errors they return.
///
/// Returns `None` when every task succeeds.
///
/// # Panics
/// If a task panics, the first panic is resumed in the caller once all tasks
/// have finished.
pub async fn aggregate_parallel<I, F, E>(tasks: I) -> Option<Aggregate>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: StdError + Send + Sync + 'static,
{
    let mut pending: FuturesUnordered<_> = tasks.into_iter().map(tokio::spawn).collect();
    let total = pending.len();

    let mut errors: Vec<DynError> = Vec::new();
    let mut panicked: Option<PanicPayload> = None;

    while let Some(joined) = pending.next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => errors.push(into_dyn(err)),
            Err(join_err) if join_err.is_panic() => {
                let payload = join_err.into_panic();
                panicked.get_or_insert(payload);
            }
            Err(join_err) => errors.push(into_dyn(join_err)),
        }
    }

    tracing::debug!(
        tasks = total,
        failed = errors.len(),
        panicked = panicked.is_some(),
        "parallel collection finished"
    );

    if let Some(payload) = panicked {
        panic::resume_unwind(payload);
    }
    Aggregate::new(errors.into_iter().map(Some))
}

/// Runs each closure on its own scoped thread and aggregates the errors.
///
/// Blocking counterpart of [`aggregate_parallel`] for callers outside an
/// async runtime. Closures may borrow from the caller.
///
/// # Panics
/// If a closure panics, the first panic is resumed once all threads joined.
pub fn aggregate_threads<I, F, E>(tasks: I) -> Option<Aggregate>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Result<(), E> + Send,
    E: StdError + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::channel::<DynError>();

    let (total, panicked) = thread::scope(|scope| {
        let handles: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let tx = tx.clone();
                scope.spawn(move || {
                    if let Err(err) = task() {
                        // The receiver outlives the scope.
                        let _ = tx.send(into_dyn(err));
                    }
                })
            })
            .collect();

        let total = handles.len();
        let mut panicked: Option<PanicPayload> = None;
        for handle in handles {
            if let Err(payload) = handle.join() {
                panicked.get_or_insert(payload);
            }
        }
        (total, panicked)
    });
    drop(tx);

    let errors: Vec<DynError> = rx.into_iter().collect();
    tracing::debug!(
        tasks = total,
        failed = errors.len(),
        panicked = panicked.is_some(),
        "threaded collection finished"
    );

    if let Some(payload) = panicked {
        panic::resume_unwind(payload);
    }
    Aggregate::new(errors.into_iter().map(Some))
}
