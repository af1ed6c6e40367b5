// demos/submit_documents.rs
//
// Submits the same document ten times, 200 ms apart, through a gate that
// admits three per second. Expect bursts of three admitted calls followed by
// rate-limited ones.
//
//   REQUEST_GATE_ENDPOINT=http://localhost:8080/documents \
//   cargo run --example submit_documents -- demos/request.json

use request_gate::{
    Error as CrateError,
    sliding_window::{
        Admission, Outcome, RateGate, RequestGuard, TimeUnit, WindowSettings,
        reqwest_integration::{DEFAULT_ENDPOINT, ReqwestSubmitter, SubmitterConfig},
    },
};
use serde_json::Value;
use std::{env, sync::Arc, time::Duration};
use tokio::time::{Instant, sleep};
use tracing::{info, warn};

const ENDPOINT_ENV_VAR: &str = "REQUEST_GATE_ENDPOINT";
const DEFAULT_DOCUMENT_PATH: &str = "demos/request.json";

const NUM_SUBMISSIONS: usize = 10;
const PAUSE_BETWEEN_SUBMISSIONS_MS: u64 = 200;

#[tokio::main]
async fn main() -> Result<(), CrateError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();
    let endpoint = env::var(ENDPOINT_ENV_VAR).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    let document_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DOCUMENT_PATH.to_string());

    let document: Value = serde_json::from_str(&tokio::fs::read_to_string(&document_path).await?)?;

    let settings = WindowSettings::builder()
        .unit(TimeUnit::Seconds)
        .limit(3)
        .build();
    let gate = Arc::new(RateGate::from_settings(&settings)?);
    let submitter = ReqwestSubmitter::new(SubmitterConfig::builder().endpoint(endpoint).build())?;
    let guard = RequestGuard::new(gate, submitter);

    info!(document = %document_path, limit = settings.limit(), unit = ?settings.unit(), "Starting submissions");

    for i in 0..NUM_SUBMISSIONS {
        let start = Instant::now();
        let result = guard.submit(document.clone()).await;
        sleep(Duration::from_millis(PAUSE_BETWEEN_SUBMISSIONS_MS)).await;
        let elapsed_ms = start.elapsed().as_millis();

        match result {
            Admission::RateLimited => {
                info!(iteration = i, elapsed_ms, "429 Too Many Requests (rejected locally)");
            }
            Admission::Admitted(Outcome::Status(status)) => {
                info!(iteration = i, elapsed_ms, %status, "Submitted");
            }
            Admission::Admitted(Outcome::TransportFailure(error)) => {
                warn!(iteration = i, elapsed_ms, %error, "Transport failure");
            }
        }
    }

    Ok(())
}
