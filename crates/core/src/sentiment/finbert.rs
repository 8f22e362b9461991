//! ONNX Runtime FinBERT classifier.
//!
//! The model directory must contain `model.onnx` (a sequence-classification
//! export of `yiyanghkust/finbert-tone`) and `tokenizer.json`.

use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use crate::domain::Sentiment;
use crate::sentiment::error::ModelDiagnosticsError;

const MAX_SEQ_LEN: usize = 512;

pub struct FinbertModel {
    name: String,
    session: Session,
    tokenizer: Tokenizer,
}

impl FinbertModel {
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        let name = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| model_dir.display().to_string());

        info!(model = %model_path.display(), "loaded FinBERT model");
        Ok(Self {
            name,
            session,
            tokenizer,
        })
    }

    /// Arg-max label of the softmaxed logits for a single text.
    pub fn predict(&mut self, text: &str) -> Result<Sentiment, ModelDiagnosticsError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| self.error("tokenize", e))?;

        let seq_len = encoding.get_ids().len();
        let shape = [1i64, seq_len as i64];
        let to_i64 = |v: &[u32]| v.iter().map(|&x| i64::from(x)).collect::<Vec<_>>();

        let ids = Tensor::from_array((shape, to_i64(encoding.get_ids()).into_boxed_slice()))
            .map_err(|e| self.error("tensor", e))?;
        let mask = Tensor::from_array((
            shape,
            to_i64(encoding.get_attention_mask()).into_boxed_slice(),
        ))
        .map_err(|e| self.error("tensor", e))?;
        let type_ids = Tensor::from_array((shape, to_i64(encoding.get_type_ids()).into_boxed_slice()))
            .map_err(|e| self.error("tensor", e))?;

        let logits = {
            let outputs = self
                .session
                .run(ort::inputs![
                    "input_ids" => ids,
                    "attention_mask" => mask,
                    "token_type_ids" => type_ids,
                ])
                .map_err(|e| ModelDiagnosticsError::new(self.name.clone(), "inference", e))?;

            let (dims, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| ModelDiagnosticsError::new(self.name.clone(), "extract", e))?;
            let dims: &[i64] = dims;
            if dims.last().copied() != Some(Sentiment::MODEL_LABELS.len() as i64) {
                return Err(ModelDiagnosticsError::new(
                    self.name.clone(),
                    "extract",
                    format!("unexpected logits shape {dims:?}"),
                ));
            }
            data[..Sentiment::MODEL_LABELS.len()].to_vec()
        };

        let probs = softmax(&logits);
        argmax(&probs)
            .and_then(Sentiment::from_model_index)
            .ok_or_else(|| self.error("argmax", "no finite probabilities"))
    }

    fn error(&self, stage: &'static str, detail: impl std::fmt::Display) -> ModelDiagnosticsError {
        ModelDiagnosticsError::new(self.name.clone(), stage, detail)
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn softmax_sums_to_one_and_keeps_order() {
        let probs = softmax(&[1.0, 3.0, 2.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert_eq!(argmax(&probs), Some(1));
    }

    #[test]
    fn argmax_ignores_nan() {
        assert_eq!(argmax(&[f32::NAN, 0.2, 0.7]), Some(2));
        assert_eq!(argmax(&[f32::NAN]), None);
    }

    #[test]
    fn load_fails_for_missing_files() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("does-not-exist");
        let err = FinbertModel::load(&dir).err().unwrap();
        assert!(err.to_string().contains("model.onnx"));
    }
}
