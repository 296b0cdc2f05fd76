// Network reachability probe.
//
// Sync operations are gated on connectivity: commit-and-sync short-circuits
// and clone becomes a silent no-op while offline. The probe is a trait so
// the orchestrator can be tested without touching the network.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

pub trait NetworkProbe: Send + Sync + 'static {
    fn is_online(&self) -> impl Future<Output = bool> + Send;
}

/// Probes connectivity with a HEAD request against a configurable URL.
/// Any HTTP response counts as online; only transport errors count as
/// offline.
pub struct HttpNetworkProbe {
    client: reqwest::Client,
    probe_url: String,
}

impl HttpNetworkProbe {
    pub fn new(probe_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, probe_url: probe_url.into() }
    }
}

impl NetworkProbe for HttpNetworkProbe {
    async fn is_online(&self) -> bool {
        match self.client.head(&self.probe_url).send().await {
            Ok(_) => true,
            Err(error) => {
                debug!(error = %error, probe_url = %self.probe_url, "connectivity probe failed");
                false
            }
        }
    }
}

/// Fixed-answer probe for tests and offline-first setups.
#[derive(Debug, Clone, Copy)]
pub struct StaticNetworkProbe(pub bool);

impl NetworkProbe for StaticNetworkProbe {
    async fn is_online(&self) -> bool {
        self.0
    }
}
