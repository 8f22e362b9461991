use std::fmt;

/// Failure inside the model tier, tagged with the stage that failed.
#[derive(Debug, Clone)]
pub struct ModelDiagnosticsError {
    pub model: String,
    pub stage: &'static str,
    pub detail: String,
}

impl ModelDiagnosticsError {
    pub fn new(model: impl Into<String>, stage: &'static str, detail: impl fmt::Display) -> Self {
        Self {
            model: model.into(),
            stage,
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for ModelDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sentiment model error (model={}, stage={}): {}",
            self.model, self.stage, self.detail
        )
    }
}

impl std::error::Error for ModelDiagnosticsError {}
