use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module};
use tokenizers::Tokenizer;

use crate::error::ModelError;
use crate::genres::GENRES;

pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";

/// A loaded multi-label classifier.
///
/// Takes a batch of texts and returns one probability row per text, each row
/// aligned with `GENRES`.
#[async_trait]
pub trait GenreClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn predict_proba(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// TF-IDF features followed by one logistic regression per genre.
///
/// Artifact layout:
/// - `tokenizer.json`: word-level vocabulary (term -> column)
/// - `model.safetensors`: `idf` `[V]`, `weight` `[24, V]`, `bias` `[24]`
pub struct TfidfEngine {
    model_name: String,
    device: Device,
    tokenizer: Tokenizer,
    vocab_size: usize,
    // (1, V)
    idf: Tensor,
    linear: Linear,
}

impl TfidfEngine {
    pub fn load(dir: &Path) -> Result<Arc<Self>, ModelError> {
        if !dir.is_dir() {
            return Err(ModelError::Missing {
                path: dir.to_path_buf(),
            });
        }

        let device = Device::Cpu;
        let start = Instant::now();

        let tokenizer_path = dir.join(TOKENIZER_FILE);
        let tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| ModelError::Tokenizer {
                path: tokenizer_path.clone(),
                message: e.to_string(),
            })?;
        let vocab_size = tokenizer.get_vocab_size(false);

        let weights_path = dir.join(WEIGHTS_FILE);
        let weights_err = |source| ModelError::Weights {
            path: weights_path.clone(),
            source,
        };
        let mut tensors = candle_core::safetensors::load(&weights_path, &device).map_err(weights_err)?;

        let total_size_in_bytes: usize = tensors
            .values()
            .map(|t| t.elem_count() * t.dtype().size_in_bytes())
            .sum();

        let idf = take_tensor(&mut tensors, "idf", &[vocab_size])?;
        let weight = take_tensor(&mut tensors, "weight", &[GENRES.len(), vocab_size])?;
        let bias = take_tensor(&mut tensors, "bias", &[GENRES.len()])?;

        let idf = idf
            .to_dtype(DType::F32)
            .and_then(|t| t.reshape((1, vocab_size)))
            .map_err(weights_err)?;
        let weight = weight.to_dtype(DType::F32).map_err(weights_err)?;
        let bias = bias.to_dtype(DType::F32).map_err(weights_err)?;

        let model_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());

        tracing::info!(
            model = %model_name,
            vocab_size,
            labels = GENRES.len(),
            weights_bytes = total_size_in_bytes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "genre model loaded"
        );

        Ok(Arc::new(Self {
            model_name,
            device,
            tokenizer,
            vocab_size,
            idf,
            linear: Linear::new(weight, Some(bias)),
        }))
    }

    fn predict_inner(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // 原始词频，每个文本一行
        let mut counts = vec![0f32; texts.len() * self.vocab_size];
        for (row, text) in texts.iter().enumerate() {
            let encoding = self
                .tokenizer
                .encode(text.as_str(), false)
                .map_err(|e| anyhow::anyhow!("Error encoding text: {e}"))?;
            let offset = row * self.vocab_size;
            for &id in encoding.get_ids() {
                let id = id as usize;
                if id < self.vocab_size {
                    counts[offset + id] += 1.0;
                }
            }
        }

        let tf = Tensor::from_vec(counts, (texts.len(), self.vocab_size), &self.device)?;
        let tfidf = tf.broadcast_mul(&self.idf)?;

        // L2 归一化；没有已知词的行保持全 0
        let norm = tfidf.sqr()?.sum_keepdim(1)?.sqrt()?.affine(1.0, 1e-12)?;
        let features = tfidf.broadcast_div(&norm)?;

        let logits = self.linear.forward(&features)?;
        let probs = sigmoid(&logits)?;

        Ok(probs.to_vec2::<f32>()?)
    }
}

#[async_trait]
impl GenreClassifier for TfidfEngine {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn predict_proba(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let out = self.predict_inner(texts)?;
        Ok(out)
    }
}

fn take_tensor(
    tensors: &mut HashMap<String, Tensor>,
    name: &'static str,
    expected: &[usize],
) -> Result<Tensor, ModelError> {
    let tensor = tensors
        .remove(name)
        .ok_or(ModelError::MissingTensor { name })?;

    if tensor.dims() != expected {
        return Err(ModelError::Shape {
            name,
            expected: expected.to_vec(),
            actual: tensor.dims().to_vec(),
        });
    }
    Ok(tensor)
}

fn sigmoid(xs: &Tensor) -> candle_core::Result<Tensor> {
    xs.neg()?.exp()?.affine(1.0, 1.0)?.recip()
}


#[cfg(test)]
mod tests {
    use super::fixtures::{write_artifact, write_reference_artifact};
    use super::*;

    fn reference_engine() -> (tempfile::TempDir, Arc<TfidfEngine>) {
        let dir = tempfile::tempdir().unwrap();
        write_reference_artifact(dir.path());
        let engine = TfidfEngine::load(dir.path()).unwrap();
        (dir, engine)
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = TfidfEngine::load(&dir.path().join("nope")).err().unwrap();
        assert!(matches!(err, ModelError::Missing { .. }));
    }

    #[test]
    fn missing_tokenizer_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_reference_artifact(dir.path());
        std::fs::remove_file(dir.path().join(TOKENIZER_FILE)).unwrap();

        let err = TfidfEngine::load(dir.path()).err().unwrap();
        assert!(matches!(err, ModelError::Tokenizer { .. }));
    }

    #[test]
    fn corrupted_weights_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_reference_artifact(dir.path());
        std::fs::write(dir.path().join(WEIGHTS_FILE), b"not a safetensors file").unwrap();

        let err = TfidfEngine::load(dir.path()).err().unwrap();
        assert!(matches!(err, ModelError::Weights { .. }));
    }

    #[test]
    fn label_count_mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_reference_artifact(dir.path());

        // 用 23 行的矩阵覆盖权重
        let device = Device::Cpu;
        let vocab_size = 12;
        let mut tensors = HashMap::new();
        tensors.insert("idf".to_string(), Tensor::ones(vocab_size, DType::F32, &device).unwrap());
        tensors.insert(
            "weight".to_string(),
            Tensor::zeros((23, vocab_size), DType::F32, &device).unwrap(),
        );
        tensors.insert("bias".to_string(), Tensor::zeros(23, DType::F32, &device).unwrap());
        candle_core::safetensors::save(&tensors, dir.path().join(WEIGHTS_FILE)).unwrap();

        let err = TfidfEngine::load(dir.path()).err().unwrap();
        match err {
            ModelError::Shape { name, expected, actual } => {
                assert_eq!(name, "weight");
                assert_eq!(expected, vec![24, vocab_size]);
                assert_eq!(actual, vec![23, vocab_size]);
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn missing_tensor_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_reference_artifact(dir.path());

        let device = Device::Cpu;
        let mut tensors = HashMap::new();
        tensors.insert("idf".to_string(), Tensor::ones(12, DType::F32, &device).unwrap());
        candle_core::safetensors::save(&tensors, dir.path().join(WEIGHTS_FILE)).unwrap();

        let err = TfidfEngine::load(dir.path()).err().unwrap();
        assert!(matches!(err, ModelError::MissingTensor { name: "weight" }));
    }

    #[tokio::test]
    async fn one_row_of_probabilities_per_text() {
        let (_dir, engine) = reference_engine();
        let texts = vec![
            "Alien A crew fights a creature".to_string(),
            "nothing known here".to_string(),
            String::new(),
        ];

        let rows = engine.predict_proba(&texts).await.unwrap();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.len(), GENRES.len());
            assert!(row.iter().all(|p| (0.0..=1.0).contains(p)));
        }

        // no known terms: every genre sits at sigmoid(bias)
        let expected = 1.0 / (1.0 + 2f32.exp());
        for p in &rows[1] {
            assert!((p - expected).abs() < 1e-5);
        }
        assert_eq!(rows[1], rows[2]);
    }

    #[tokio::test]
    async fn features_are_case_insensitive_and_normalised() {
        let (_dir, engine) = reference_engine();
        let texts = vec!["COWBOY".to_string(), "cowboy cowboy cowboy".to_string()];

        let rows = engine.predict_proba(&texts).await.unwrap();
        let western = GENRES.iter().position(|g| *g == "Western").unwrap();

        // repeated terms give the same unit vector after L2 normalisation
        assert!((rows[0][western] - rows[1][western]).abs() < 1e-6);
        let expected = 1.0 / (1.0 + (-4f32).exp());
        assert!((rows[0][western] - expected).abs() < 1e-5);
    }

    #[tokio::test]
    async fn single_term_uses_its_weight() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), &["war"], &[("War", &[("war", 3.0)])], 0.0);
        let engine = TfidfEngine::load(dir.path()).unwrap();

        let rows = engine.predict_proba(&["war".to_string()]).await.unwrap();
        let war = GENRES.iter().position(|g| *g == "War").unwrap();
        let expected = 1.0 / (1.0 + (-3f32).exp());
        assert!((rows[0][war] - expected).abs() < 1e-5);
        assert!((rows[0][0] - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn empty_batch_is_empty() {
        let (_dir, engine) = reference_engine();
        let rows = engine.predict_proba(&[]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn name_comes_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("modelo_prediccion_genero_pelicula");
        std::fs::create_dir(&model_dir).unwrap();
        write_reference_artifact(&model_dir);

        let engine = TfidfEngine::load(&model_dir).unwrap();
        assert_eq!(engine.name(), "modelo_prediccion_genero_pelicula");
    }
}
