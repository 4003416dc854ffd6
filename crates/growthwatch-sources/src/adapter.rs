//! The uniform seam every external service is called through.

use std::time::Instant;

use futures::future::BoxFuture;

use crate::attempt::{AcquisitionAttempt, Payload};
use crate::error::SourceError;

/// One way of acquiring a `T` for a `Req`.
///
/// Implementors provide [`fetch`](SourceAdapter::fetch); callers use
/// [`call`](SourceAdapter::call), which never fails and always yields a
/// classified [`AcquisitionAttempt`].
pub trait SourceAdapter<Req, T>: Send + Sync
where
    Req: Sync + ?Sized,
    T: Payload + Send + 'static,
{
    /// Stable tier id, as used in configuration toggles and logs.
    fn tier_id(&self) -> &'static str;

    /// Human-readable name of the underlying method.
    fn method(&self) -> &'static str;

    fn fetch<'a>(&'a self, req: &'a Req) -> BoxFuture<'a, Result<T, SourceError>>;

    fn call<'a>(&'a self, req: &'a Req) -> BoxFuture<'a, AcquisitionAttempt<T>> {
        Box::pin(async move {
            let started = Instant::now();
            let result = self.fetch(req).await;
            AcquisitionAttempt::from_result(self.tier_id(), self.method(), result, started.elapsed())
        })
    }
}
