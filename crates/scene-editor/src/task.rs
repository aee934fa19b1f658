//! Moves blocking I/O off the event thread

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::BoxFuture;

/// Runs `work` on a worker thread and resolves with its result.
///
/// `on_cancel` builds the error returned if the worker dies before
/// answering (it panicked or the thread could not be spawned).
pub fn run_blocking<T, E, F, C>(
    name: &str,
    work: F,
    on_cancel: C,
) -> BoxFuture<'static, Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
    C: FnOnce() -> E + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let spawned = std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let _ = tx.send(work());
        });

    if let Err(e) = spawned {
        tracing::error!("Failed to spawn worker thread: {}", e);
    }

    rx.map(move |result| result.unwrap_or_else(|_| Err(on_cancel())))
        .boxed()
}
