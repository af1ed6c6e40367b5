use crate::Error as CrateError;
use snafu::Snafu;

/// Why a document never got an HTTP response.
///
/// Responses with an error status are not `HttpError`s; they are reported as
/// [`Outcome::Status`](super::Outcome::Status).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum HttpError {
    /// The document could not be encoded as a request body.
    #[snafu(display("Failed to serialize document: {}", source))]
    Serialization { source: serde_json::Error },

    /// Connecting to the endpoint failed (DNS, refused connection, TLS).
    #[snafu(display("HTTP transport error: {}", source))]
    Transport { source: CrateError },

    #[snafu(display("HTTP request timed out"))]
    Timeout,

    #[snafu(display("Invalid endpoint: {}", details))]
    InvalidEndpoint { details: String },

    /// The HTTP client could not be constructed.
    #[snafu(display("Failed to build HTTP client: {}", source))]
    Build { source: reqwest::Error },

    /// Other, unspecified HTTP client errors.
    #[snafu(display("Generic HTTP client error: {}", source))]
    Client { source: CrateError },
}
