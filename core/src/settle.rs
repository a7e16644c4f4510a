//! Free-function adapters.
//!
//! Every adapter awaits the wrapped operation exactly once and hands back its
//! outcome as a [`Settled`] value. None of them add suspension points, timers
//! or retries; if the wrapped operation never completes, neither does the
//! adapter.

use std::any::{Any, type_name};
use std::error::Error as StdError;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use settle_types::{PANIC_CODE, Settled, SystemError};

pub(crate) fn log_failure<F>(_: &F) {
    tracing::debug!(
        error_type = type_name::<F>(),
        "operation settled on its failure channel"
    );
}

/// Map the failure channel of a finished operation into the error category `E`.
pub(crate) fn settle_output<T, F, E>(result: Result<T, F>) -> Settled<T, E>
where
    E: From<F>,
{
    result.inspect_err(log_failure).map_err(E::from)
}

pub(crate) fn settle_system_output<T, F>(result: Result<T, F>) -> Settled<T, SystemError>
where
    F: StdError + 'static,
{
    result.map_err(|err| {
        tracing::debug!(
            error_type = type_name::<F>(),
            error = %err,
            "operation settled on its failure channel"
        );
        SystemError::from_error(&err)
    })
}

pub(crate) fn settle_unwind_output<T, F>(
    outcome: Result<Result<T, F>, Box<dyn Any + Send>>,
) -> Settled<T, SystemError>
where
    SystemError: From<F>,
{
    match outcome {
        Ok(result) => settle_output(result),
        Err(payload) => {
            let message = panic_message(&*payload);
            tracing::warn!(%message, "operation panicked before settling");
            Err(SystemError::new()
                .with_code(PANIC_CODE)
                .with_message(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

/// Await `operation` and return its outcome as a settled value.
///
/// The failure channel is converted into `E` with `From`. The returned future
/// has no failure channel of its own.
pub async fn settle<Fut, T, F, E>(operation: Fut) -> Settled<T, E>
where
    Fut: Future<Output = Result<T, F>>,
    E: From<F>,
{
    settle_output(operation.await)
}

/// Like [`settle`], with an explicit mapping for the failure channel.
pub async fn settle_with<Fut, T, F, E, M>(operation: Fut, map: M) -> Settled<T, E>
where
    Fut: Future<Output = Result<T, F>>,
    M: FnOnce(F) -> E,
{
    operation.await.inspect_err(log_failure).map_err(map)
}

/// Settle any operation whose failure is a `std::error::Error` into
/// [`SystemError`], keeping the rendered source chain as the message.
pub async fn settle_system<Fut, T, F>(operation: Fut) -> Settled<T, SystemError>
where
    Fut: Future<Output = Result<T, F>>,
    F: StdError + 'static,
{
    settle_system_output(operation.await)
}

/// Settle an operation whose panics are also failures.
///
/// A panic while polling `operation` becomes a [`SystemError`] with code
/// [`PANIC_CODE`] and the panic payload as message. The operation is treated
/// as unwind-safe: it is consumed by the adapter and never observed again.
pub async fn settle_unwind<Fut, T, F>(operation: Fut) -> Settled<T, SystemError>
where
    Fut: Future<Output = Result<T, F>>,
    SystemError: From<F>,
{
    settle_unwind_output(AssertUnwindSafe(operation).catch_unwind().await)
}
