//! Method-call form of the adapters, for use at the end of a future chain.

use std::any::Any;
use std::error::Error as StdError;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::future::{CatchUnwind, InspectErr, Map, MapErr};
use futures_util::{FutureExt, TryFutureExt};
use settle_types::{Settled, SystemError};

use crate::settle::{log_failure, settle_output, settle_system_output, settle_unwind_output};

/// Future returned by [`SettleExt::settle`].
pub type Settle<Fut, T, F, E> = Map<Fut, fn(Result<T, F>) -> Settled<T, E>>;

/// Future returned by [`SettleExt::settle_with`].
pub type SettleWith<Fut, F, M> = MapErr<InspectErr<Fut, fn(&F)>, M>;

/// Future returned by [`SettleExt::settle_system`].
pub type SettleSystem<Fut, T, F> = Map<Fut, fn(Result<T, F>) -> Settled<T, SystemError>>;

/// Future returned by [`SettleExt::settle_unwind`].
pub type SettleUnwind<Fut, T, F> = Map<
    CatchUnwind<AssertUnwindSafe<Fut>>,
    fn(Result<Result<T, F>, Box<dyn Any + Send>>) -> Settled<T, SystemError>,
>;

/// Adapters over any future that completes with a `Result`.
///
/// The returned futures are named types, so they stay `Send`/`Unpin`
/// whenever the wrapped future is.
pub trait SettleExt<T, F>: Future<Output = Result<T, F>> + Sized {
    /// See [`settle`](crate::settle()).
    fn settle<E>(self) -> Settle<Self, T, F, E>
    where
        E: From<F>,
    {
        self.map(settle_output::<T, F, E> as fn(Result<T, F>) -> Settled<T, E>)
    }

    /// See [`settle_with`](crate::settle_with).
    fn settle_with<E, M>(self, map: M) -> SettleWith<Self, F, M>
    where
        M: FnOnce(F) -> E,
    {
        let logged = TryFutureExt::inspect_err(self, log_failure::<F> as fn(&F));
        TryFutureExt::map_err(logged, map)
    }

    /// See [`settle_system`](crate::settle_system).
    fn settle_system(self) -> SettleSystem<Self, T, F>
    where
        F: StdError + 'static,
    {
        self.map(settle_system_output::<T, F> as fn(Result<T, F>) -> Settled<T, SystemError>)
    }

    /// See [`settle_unwind`](crate::settle_unwind).
    fn settle_unwind(self) -> SettleUnwind<Self, T, F>
    where
        SystemError: From<F>,
    {
        AssertUnwindSafe(self).catch_unwind().map(
            settle_unwind_output::<T, F>
                as fn(Result<Result<T, F>, Box<dyn Any + Send>>) -> Settled<T, SystemError>,
        )
    }
}

impl<Fut, T, F> SettleExt<T, F> for Fut where Fut: Future<Output = Result<T, F>> {}
