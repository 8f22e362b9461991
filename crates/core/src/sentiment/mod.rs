pub mod error;
#[cfg(feature = "onnx")]
pub mod finbert;
pub mod lexicon;

use std::path::Path;

use tracing::{info, warn};

use crate::config::Settings;
use crate::domain::Sentiment;

pub use error::ModelDiagnosticsError;

enum Tier {
    #[cfg(feature = "onnx")]
    ModelBacked(finbert::FinbertModel),
    HeuristicOnly,
}

/// Three-way headline classifier.
///
/// The tier is chosen once at construction. When the model loads, every call
/// goes through it; a failing call is answered by the keyword heuristic and the
/// model stays active for the next one.
pub struct SentimentScorer {
    tier: Tier,
    init_error: Option<String>,
}

impl SentimentScorer {
    pub fn from_settings(settings: &Settings) -> Self {
        Self::load(&settings.model_dir)
    }

    pub fn load(model_dir: &Path) -> Self {
        match load_model(model_dir) {
            Ok(tier) => {
                info!(model_dir = %model_dir.display(), "sentiment model tier active");
                Self {
                    tier,
                    init_error: None,
                }
            }
            Err(err) => {
                warn!(
                    model_dir = %model_dir.display(),
                    error = %err,
                    "sentiment model unavailable, using keyword heuristic"
                );
                Self {
                    tier: Tier::HeuristicOnly,
                    init_error: Some(format!("{err:#}")),
                }
            }
        }
    }

    pub fn heuristic_only() -> Self {
        Self {
            tier: Tier::HeuristicOnly,
            init_error: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.tier, Tier::HeuristicOnly)
    }

    /// Why the model tier could not be loaded, if it was attempted and failed.
    pub fn init_error(&self) -> Option<&str> {
        self.init_error.as_deref()
    }

    /// Never fails. Absent text is classified as empty text.
    pub fn predict(&mut self, text: Option<&str>) -> Sentiment {
        let text = text.unwrap_or_default();
        match &mut self.tier {
            #[cfg(feature = "onnx")]
            Tier::ModelBacked(model) => match model.predict(text) {
                Ok(label) => label,
                Err(err) => {
                    warn!(error = %err, "model inference failed, falling back to heuristic");
                    lexicon::classify(text)
                }
            },
            Tier::HeuristicOnly => lexicon::classify(text),
        }
    }
}

#[cfg(feature = "onnx")]
fn load_model(model_dir: &Path) -> anyhow::Result<Tier> {
    finbert::FinbertModel::load(model_dir).map(Tier::ModelBacked)
}

#[cfg(not(feature = "onnx"))]
fn load_model(_model_dir: &Path) -> anyhow::Result<Tier> {
    anyhow::bail!("built without the `onnx` feature")
}
