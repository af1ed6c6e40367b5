//! Future types

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use pin_project::pin_project;

use super::Admission;

/// Future for [`RateGateService`](super::RateGateService) responses.
#[pin_project(project = ResponseFutureProj)]
#[derive(Debug)]
pub enum ResponseFuture<F> {
    /// Denied by the gate; resolves immediately.
    RateLimited,
    Admitted {
        #[pin]
        future: F,
    },
}

impl<F> ResponseFuture<F> {
    pub(super) const fn rate_limited() -> Self {
        ResponseFuture::RateLimited
    }

    pub(super) const fn admitted(future: F) -> Self {
        ResponseFuture::Admitted { future }
    }
}

impl<F, T, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<T, E>>,
{
    type Output = Result<Admission<T>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            ResponseFutureProj::RateLimited => Poll::Ready(Ok(Admission::RateLimited)),
            ResponseFutureProj::Admitted { future } => future.poll(cx).map_ok(Admission::Admitted),
        }
    }
}
