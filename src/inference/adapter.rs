use crate::error::PredictionError;
use crate::image_classifier::interface::ImageClassifier;
use crate::image_classifier::models::model_config::ModelConfig;
use crate::image_classifier::preprocess::resize_image_to_tensor;
use crate::inference::decision::{softmax, top_class};
use crate::inference::source::ImageSource;
use crate::label_table::LabelTable;
use crate::library::logger::interface::Logger;
use image::{DynamicImage, ImageReader};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

pub type Prediction = Result<Classification, PredictionError>;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub index: usize,
    pub class_key: String,
    pub label: String,
    /// Probability of `index`, in [0, 1].
    pub confidence: f32,
    pub probabilities: Vec<f32>,
}

impl Classification {
    pub fn confidence_percent(&self) -> f32 {
        self.confidence * 100.0
    }
}

/// The loaded model and its label table. Immutable once built and shared
/// between callers without locking.
pub struct InferenceAdapter {
    model: Option<Arc<dyn ImageClassifier + Send + Sync>>,
    labels: LabelTable,
    model_config: ModelConfig,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl InferenceAdapter {
    pub fn new(
        model: Arc<dyn ImageClassifier + Send + Sync>,
        labels: LabelTable,
        model_config: ModelConfig,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            model: Some(model),
            labels,
            model_config,
            logger,
        }
    }

    pub fn unavailable(
        labels: LabelTable,
        model_config: ModelConfig,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            model: None,
            labels,
            model_config,
            logger,
        }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn classify(&self, source: &ImageSource<'_>) -> Prediction {
        let model = match &self.model {
            Some(model) => model,
            None => return Err(PredictionError::ModelUnavailable),
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.run(model.as_ref(), source)))
            .unwrap_or_else(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "panic during inference".to_string());
                Err(PredictionError::Failed(message))
            });

        match &result {
            Ok(classification) => {
                let _ = self.logger.info(&format!(
                    "{} (class {}) - {:.4}",
                    classification.label, classification.class_key, classification.confidence
                ));
            }
            Err(e) => {
                let _ = self.logger.error(&e.to_string());
            }
        }

        result
    }

    /// `classify` for callers holding an optional path and an optional
    /// pixel buffer, exactly one of which must be set.
    pub fn classify_parts(
        &self,
        path: Option<&Path>,
        pixels: Option<&DynamicImage>,
    ) -> Prediction {
        if !self.is_available() {
            return Err(PredictionError::ModelUnavailable);
        }
        let source = ImageSource::from_parts(path, pixels)?;
        self.classify(&source)
    }

    fn run(&self, model: &dyn ImageClassifier, source: &ImageSource<'_>) -> Prediction {
        let decoded;
        let image = match *source {
            ImageSource::Pixels(image) => image,
            ImageSource::Path(path) => {
                decoded = decode_path(path)?;
                &decoded
            }
            ImageSource::Bytes(bytes) => {
                decoded = decode_bytes(bytes)?;
                &decoded
            }
        };

        let tensor = resize_image_to_tensor(image, &self.model_config)
            .map_err(|e| PredictionError::DecodeFailed(e.to_string()))?;

        let scores = model
            .forward(&tensor)
            .map_err(|e| PredictionError::Failed(e.to_string()))?;

        let probabilities = if self.model_config.apply_softmax {
            softmax(&scores)
        } else {
            scores
        };

        let (index, confidence) = top_class(&probabilities).ok_or_else(|| {
            PredictionError::Failed("model output has no comparable scores".to_string())
        })?;

        let (class_key, label) = self.labels.label_for_index(index);

        Ok(Classification {
            index,
            class_key,
            label,
            confidence: confidence.clamp(0.0, 1.0),
            probabilities,
        })
    }
}

fn decode_path(path: &Path) -> Result<DynamicImage, PredictionError> {
    let unreadable =
        |e: std::io::Error| PredictionError::Failed(format!("cannot read {}: {}", path.display(), e));

    ImageReader::open(path)
        .map_err(unreadable)?
        .with_guessed_format()
        .map_err(unreadable)?
        .decode()
        .map_err(|e| PredictionError::DecodeFailed(e.to_string()))
}

fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage, PredictionError> {
    if bytes.is_empty() {
        return Err(PredictionError::DecodeFailed("empty buffer".to_string()));
    }
    image::load_from_memory(bytes).map_err(|e| PredictionError::DecodeFailed(e.to_string()))
}
