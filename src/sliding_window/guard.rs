use std::{marker::PhantomData, sync::Arc};

use super::{
    Admission, DocumentSubmitter, Outcome, RateGate, internal_event::DocumentSubmission,
};

/// Submits documents through a [`RateGate`].
///
/// A document is handed to the submitter only when the gate grants a slot, and
/// exactly once per grant. The slot stays consumed whatever the submitter
/// reports, including transport failures and timeouts. The gate lock is
/// released before the network call starts.
pub struct RequestGuard<S, D> {
    gate: Arc<RateGate>,
    submitter: S,
    events: DocumentSubmission,
    _document: PhantomData<fn(D)>,
}

impl<S, D> RequestGuard<S, D>
where
    S: DocumentSubmitter<D>,
{
    pub fn new(gate: Arc<RateGate>, submitter: S) -> Self {
        Self {
            gate,
            submitter,
            events: DocumentSubmission::register(),
            _document: PhantomData,
        }
    }

    pub fn gate(&self) -> &Arc<RateGate> {
        &self.gate
    }

    pub async fn submit(&self, document: D) -> Admission<Outcome> {
        if !self.gate.try_acquire() {
            return Admission::RateLimited;
        }

        let outcome = self.submitter.submit(document).await;
        self.events.emit(&outcome);
        Admission::Admitted(outcome)
    }
}

impl<S: Clone, D> Clone for RequestGuard<S, D> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            submitter: self.submitter.clone(),
            events: self.events.clone(),
            _document: PhantomData,
        }
    }
}
