use metrics::{Counter, Histogram, counter, histogram};

use crate::registered_event;
use crate::sliding_window::Outcome;

#[derive(Clone, Copy, Debug)]
pub struct RateGateDecisionData {
    pub granted: bool,
    /// Live entries in the window after the decision.
    pub in_window: usize,
    pub limit: usize,
}

registered_event! {
    RateGateDecision => {
        granted: Counter = counter!("rate_gate_granted_total"),
        denied: Counter = counter!("rate_gate_denied_total"),
        in_window: Histogram = histogram!("rate_gate_in_window"),
    }

    fn emit(&self, data: RateGateDecisionData) {
        self.in_window.record(data.in_window as f64);
        if data.granted {
            self.granted.increment(1);
            trace!(
                target: "request_gate::gate",
                in_window = data.in_window,
                limit = data.limit,
                "Granted."
            );
        } else {
            self.denied.increment(1);
            debug!(
                target: "request_gate::gate",
                in_window = data.in_window,
                limit = data.limit,
                "Denied, window is full."
            );
        }
    }
}

registered_event! {
    DocumentSubmission => {
        submissions: Counter = counter!("document_submissions_total"),
        transport_failures: Counter = counter!("document_transport_failures_total"),
    }

    fn emit(&self, outcome: &Outcome) {
        self.submissions.increment(1);
        match outcome {
            Outcome::Status(status) => {
                debug!(target: "request_gate::submit", status = %status, "Document submitted.");
            }
            Outcome::TransportFailure(error) => {
                self.transport_failures.increment(1);
                warn!(target: "request_gate::submit", %error, "Document submission failed in transport.");
            }
        }
    }
}
