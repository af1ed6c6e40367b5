use std::sync::Arc;

use tower::Layer;

use super::{InvalidConfiguration, RateGate, RateGateService, WindowSettings};

/// Applies a shared [`RateGate`] to a service.
///
/// Every service produced by one layer draws from the same window, so clones
/// of the stack together stay under the limit.
#[derive(Clone, Debug)]
pub struct RateGateLayer {
    gate: Arc<RateGate>,
}

impl RateGateLayer {
    pub fn new(gate: Arc<RateGate>) -> Self {
        Self { gate }
    }

    pub fn from_settings(settings: &WindowSettings) -> Result<Self, InvalidConfiguration> {
        RateGate::from_settings(settings).map(|gate| Self::new(Arc::new(gate)))
    }

    pub fn gate(&self) -> &Arc<RateGate> {
        &self.gate
    }
}

impl<S> Layer<S> for RateGateLayer {
    type Service = RateGateService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RateGateService::new(service, Arc::clone(&self.gate))
    }
}
