use std::time::Duration;

use bon::Builder;
use bytes::Bytes;
use futures::{FutureExt, future::BoxFuture};
use http::{HeaderValue, StatusCode, header};
use serde::Serialize;
use snafu::ResultExt;

use super::{
    DocumentSubmitter, Outcome,
    http::{BuildSnafu, HttpError, SerializationSnafu},
};

/// Document creation endpoint of the downstream API.
pub const DEFAULT_ENDPOINT: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Settings for [`ReqwestSubmitter`].
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `endpoint` | [`DEFAULT_ENDPOINT`] |
/// | `timeout` | 30 s, whole request |
/// | `connect_timeout` | 10 s |
/// | `user_agent` | `request_gate/<version>` |
/// | `reqwest_client` | none; a client is built from the values above |
///
/// A supplied `reqwest_client` is used as is and the timeouts and user agent
/// here are ignored.
#[derive(Clone, Debug, Builder)]
pub struct SubmitterConfig {
    #[builder(into, default = DEFAULT_ENDPOINT.to_string())]
    endpoint: String,

    #[builder(default = Duration::from_secs(30))]
    timeout: Duration,

    #[builder(default = Duration::from_secs(10))]
    connect_timeout: Duration,

    #[builder(into, default = DEFAULT_USER_AGENT.to_string())]
    user_agent: String,

    reqwest_client: Option<reqwest::Client>,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// POSTs each document as JSON and reports the response status.
///
/// Every response, including 4xx and 5xx, is an [`Outcome::Status`]. Only
/// failures that leave no response become [`Outcome::TransportFailure`].
#[derive(Clone, Debug)]
pub struct ReqwestSubmitter {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl ReqwestSubmitter {
    pub fn new(config: SubmitterConfig) -> Result<Self, HttpError> {
        let endpoint = reqwest::Url::parse(&config.endpoint).map_err(|parse_err| {
            HttpError::InvalidEndpoint {
                details: format!("Invalid URL '{}': {}", config.endpoint, parse_err),
            }
        })?;

        let client = match config.reqwest_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(config.timeout)
                .connect_timeout(config.connect_timeout)
                .user_agent(config.user_agent)
                .build()
                .context(BuildSnafu)?,
        };

        info!(target: "request_gate::submit", endpoint = %endpoint, "Document submitter initialized.");

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }
}

impl<D: Serialize> DocumentSubmitter<D> for ReqwestSubmitter {
    fn submit(&self, document: D) -> BoxFuture<'static, Outcome> {
        let body = match serde_json::to_vec(&document).context(SerializationSnafu) {
            Ok(body) => Bytes::from(body),
            Err(error) => return futures::future::ready(Outcome::TransportFailure(error)).boxed(),
        };

        let request_future = self
            .client
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send();

        Box::pin(async move {
            match request_future.await {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        let error_body = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Could not read error body".to_string());
                        log_error_status(status, &error_body);
                    }
                    Outcome::Status(status)
                }
                Err(e) => Outcome::TransportFailure(classify(e)),
            }
        })
    }
}

fn log_error_status(status: StatusCode, error_body: &str) {
    let error_body: String = error_body.chars().take(200).collect();
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        warn!(target: "request_gate::submit", %status, %error_body, "Server error or rate limited.");
    } else if status.is_client_error() {
        error!(target: "request_gate::submit", %status, %error_body, "Document rejected.");
    }
}

fn classify(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_connect() {
        HttpError::Transport {
            source: Box::new(e),
        }
    } else {
        HttpError::Client {
            source: Box::new(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, net::SocketAddr};

    use serde_json::json;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        task::JoinHandle,
    };

    use super::*;

    fn local_client() -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_millis(300))
            .build()
            .unwrap()
    }

    fn submitter(addr: SocketAddr) -> ReqwestSubmitter {
        ReqwestSubmitter::new(
            SubmitterConfig::builder()
                .endpoint(format!("http://{addr}/api/v3/lk/documents/create"))
                .reqwest_client(local_client())
                .build(),
        )
        .unwrap()
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).into_owned();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        line.to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .map(|value| value.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    /// Answers a single request with `status_line` and hands back the raw request.
    async fn respond_once(status_line: &'static str) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response =
                format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });
        (addr, server)
    }

    #[tokio::test]
    async fn posts_json_and_reports_status() {
        let (addr, server) = respond_once("201 Created").await;

        let outcome = submitter(addr)
            .submit(json!({"doc_id": "abc", "doc_type": "LP_INTRODUCE_GOODS"}))
            .await;
        assert_eq!(outcome.status(), Some(StatusCode::CREATED));
        assert!(outcome.is_success());

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/v3/lk/documents/create HTTP/1.1\r\n"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"doc_id":"abc","doc_type":"LP_INTRODUCE_GOODS"}"#));
    }

    #[tokio::test]
    async fn error_status_is_an_outcome() {
        let (addr, server) = respond_once("429 Too Many Requests").await;

        let outcome = submitter(addr).submit(json!({})).await;
        assert_eq!(outcome.status(), Some(StatusCode::TOO_MANY_REQUESTS));
        assert!(!outcome.is_transport_failure());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = submitter(addr).submit(json!({})).await;
        assert!(matches!(
            outcome,
            Outcome::TransportFailure(HttpError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let outcome = submitter(addr).submit(json!({})).await;
        assert!(matches!(outcome, Outcome::TransportFailure(HttpError::Timeout)));
        server.abort();
    }

    #[tokio::test]
    async fn unserializable_document_fails_before_sending() {
        let mut document = HashMap::new();
        document.insert((1u8, 2u8), "non-string keys are not valid JSON");

        let outcome = ReqwestSubmitter::new(SubmitterConfig::default())
            .unwrap()
            .submit(document)
            .await;
        assert!(matches!(
            outcome,
            Outcome::TransportFailure(HttpError::Serialization { .. })
        ));
    }

    #[test]
    fn defaults_point_at_document_endpoint() {
        let submitter = ReqwestSubmitter::new(SubmitterConfig::default()).unwrap();
        assert_eq!(submitter.endpoint().as_str(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let config = SubmitterConfig::builder().endpoint("not a url").build();
        assert!(matches!(
            ReqwestSubmitter::new(config),
            Err(HttpError::InvalidEndpoint { .. })
        ));
    }
}
