use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    Status(u16),
    Data(Value),
    Error(String),
}

/// Developer-facing sink for request outcomes.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);
}

pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::Status(code) => tracing::info!(status = code, "response status"),
            Diagnostic::Data(data) => tracing::info!("response data: {data}"),
            Diagnostic::Error(e) => tracing::warn!("request failed: {e}"),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<Diagnostic>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<Diagnostic> {
            self.events.lock().unwrap().clone()
        }
    }

    impl DiagnosticSink for RecordingSink {
        fn record(&self, diagnostic: Diagnostic) {
            self.events.lock().unwrap().push(diagnostic);
        }
    }
}
