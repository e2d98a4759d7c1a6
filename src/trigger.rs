use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::instrument;

use crate::{
    api::{Transport, PEERS_PATH},
    diagnostics::{Diagnostic, DiagnosticSink},
};

/// Turns one activation into one `POST /api/peers`.
///
/// Activations are independent: nothing is tracked between them, so
/// overlapping activations each send their own request.
#[derive(Clone)]
pub struct PeerCreationTrigger {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn DiagnosticSink>,
}

impl PeerCreationTrigger {
    pub fn new(transport: Arc<dyn Transport>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { transport, sink }
    }

    pub fn activate(&self) -> JoinHandle<()> {
        let trigger = self.clone();
        tokio::spawn(async move { trigger.run_once().await })
    }

    /// Every outcome ends up in the sink; nothing is returned or retried.
    #[instrument(skip(self))]
    pub async fn run_once(&self) {
        // sent without a body
        let reply = match self.transport.post(PEERS_PATH, None).await {
            Ok(reply) => reply,
            Err(e) => {
                self.sink.record(Diagnostic::Error(e.to_string()));
                return;
            }
        };

        // non-2xx is not special-cased
        self.sink.record(Diagnostic::Status(reply.status_code()));

        match reply.parse_json().await {
            Ok(data) => self.sink.record(Diagnostic::Data(data)),
            Err(e) => self.sink.record(Diagnostic::Error(e.to_string())),
        }
    }
}
