use clarity_core::TriageProcessor;

/// Shared application state
pub struct AppState {
    processor: TriageProcessor,
}

impl AppState {
    pub fn new(processor: TriageProcessor) -> Self {
        Self { processor }
    }

    pub fn processor(&self) -> &TriageProcessor {
        &self.processor
    }
}
