use futures::future::BoxFuture;
use http::StatusCode;

use super::http::HttpError;

/// What the downstream API made of one submitted document.
#[derive(Debug)]
pub enum Outcome {
    /// The server answered; this holds its status code, success or not.
    Status(StatusCode),
    /// No response was obtained.
    TransportFailure(HttpError),
}

impl Outcome {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Outcome::Status(status) => Some(*status),
            Outcome::TransportFailure(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status().is_some_and(|status| status.is_success())
    }

    pub const fn is_transport_failure(&self) -> bool {
        matches!(self, Outcome::TransportFailure(_))
    }
}

/// Performs the network call for a single document.
///
/// Implementations must not retry on their own; the caller decides what to do
/// with a failed [`Outcome`].
pub trait DocumentSubmitter<D>: Send + Sync {
    fn submit(&self, document: D) -> BoxFuture<'static, Outcome>;
}

impl<D, S> DocumentSubmitter<D> for std::sync::Arc<S>
where
    S: DocumentSubmitter<D> + ?Sized,
{
    fn submit(&self, document: D) -> BoxFuture<'static, Outcome> {
        (**self).submit(document)
    }
}
