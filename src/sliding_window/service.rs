use std::{
    sync::Arc,
    task::{Context, Poll},
};

use tower::Service;

use super::{Admission, RateGate, future::ResponseFuture};

/// Rejects requests the gate denies instead of waiting for capacity.
///
/// Readiness is the inner service's readiness; the gate is consulted in `call`
/// and a denied request resolves to [`Admission::RateLimited`] without the
/// inner service ever seeing it.
#[derive(Clone, Debug)]
pub struct RateGateService<S> {
    inner: S,
    gate: Arc<RateGate>,
}

impl<S> RateGateService<S> {
    pub fn new(inner: S, gate: Arc<RateGate>) -> Self {
        Self { inner, gate }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, Request> Service<Request> for RateGateService<S>
where
    S: Service<Request>,
{
    type Response = Admission<S::Response>;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        if self.gate.try_acquire() {
            ResponseFuture::admitted(self.inner.call(request))
        } else {
            ResponseFuture::rate_limited()
        }
    }
}
