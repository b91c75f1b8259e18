//! Local sentence encoder on ONNX Runtime.
//!
//! Expects a model directory holding `model.onnx` (a BERT-family sentence
//! transformer such as all-MiniLM-L6-v2, inputs `input_ids`,
//! `attention_mask`, `token_type_ids`) and its `vocab.txt`. Output is the
//! mean-pooled last hidden state, L2-normalized.

use askdesk_core::error::{AskDeskError, Result};
use askdesk_core::traits::Encoder;
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::wordpiece::WordPiece;

struct Model {
    /// `run` takes `&mut self`.
    session: Mutex<Session>,
    tokenizer: WordPiece,
}

pub struct OnnxEncoder {
    model: Arc<Model>,
    dims: usize,
    name: String,
}

impl OnnxEncoder {
    /// Load the model and check it produces `dims`-wide vectors.
    pub fn load(dir: &Path, dims: usize) -> Result<Self> {
        let model_path = dir.join("model.onnx");
        if !model_path.exists() {
            return Err(AskDeskError::Encoder(format!(
                "{} not found",
                model_path.display()
            )));
        }
        let tokenizer = WordPiece::from_vocab_file(&dir.join("vocab.txt"))?;

        let session = Session::builder()
            .map_err(|e| AskDeskError::Encoder(format!("{}: {e}", model_path.display())))?
            .with_intra_threads(2)
            .map_err(|e| AskDeskError::Encoder(format!("{}: {e}", model_path.display())))?
            .commit_from_file(&model_path)
            .map_err(|e| AskDeskError::Encoder(format!("{}: {e}", model_path.display())))?;

        let model = Model {
            session: Mutex::new(session),
            tokenizer,
        };
        let sample = model.infer("ping")?;
        if sample.len() != dims {
            return Err(AskDeskError::Encoder(format!(
                "model produces {} dimensions, config expects {dims}",
                sample.len()
            )));
        }

        let name = dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx")
            .to_string();
        tracing::debug!("🧠 ONNX model loaded: {name} ({dims} dims)");
        Ok(Self {
            model: Arc::new(model),
            dims,
            name,
        })
    }
}

impl Model {
    fn infer(&self, text: &str) -> Result<Vec<f32>> {
        let input_ids = self.tokenizer.encode(text);
        let seq_len = input_ids.len() as i64;
        let attention_mask = vec![1i64; input_ids.len()];
        let token_type_ids = vec![0i64; input_ids.len()];

        let tensor = |data: Vec<i64>| {
            Tensor::from_array((vec![1i64, seq_len], data))
                .map_err(|e| AskDeskError::Encoder(format!("tensor creation failed: {e}")))
        };
        let ids = tensor(input_ids)?;
        let mask = tensor(attention_mask)?;
        let types = tensor(token_type_ids)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| AskDeskError::Encoder(format!("session lock poisoned: {e}")))?;
        let outputs = session
            .run(ort::inputs![ids, mask, types])
            .map_err(|e| AskDeskError::Encoder(format!("inference failed: {e}")))?;

        let (_name, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| AskDeskError::Encoder("model returned no outputs".into()))?;
        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| AskDeskError::Encoder(format!("unexpected output: {e}")))?;

        let pooled = match shape.len() {
            // [1, seq, hidden]
            3 if shape[2] > 0 => {
                let seq = shape[1] as usize;
                let hidden = shape[2] as usize;
                let mut pooled = vec![0.0f32; hidden];
                for row in data.chunks_exact(hidden).take(seq) {
                    for (p, v) in pooled.iter_mut().zip(row) {
                        *p += v;
                    }
                }
                pooled.iter_mut().for_each(|p| *p /= seq.max(1) as f32);
                pooled
            }
            // [1, hidden], already pooled
            2 => data[..shape[1] as usize].to_vec(),
            _ => {
                return Err(AskDeskError::Encoder(format!(
                    "unexpected output shape {shape:?}"
                )));
            }
        };
        Ok(l2_normalize(pooled))
    }
}

fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

#[async_trait]
impl Encoder for OnnxEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let model = Arc::clone(&self.model);
        let text = text.to_string();
        tokio::task::spawn_blocking(move || model.infer(&text))
            .await
            .map_err(|e| AskDeskError::Encoder(format!("inference task failed: {e}")))?
    }
}
