use crate::config::{ClassKeySource, Config};
use crate::error::InitError;
use crate::image_classifier::impl_tract_onnx::ImageClassifierTractOnnx;
use crate::image_classifier::interface::ImageClassifier;
use crate::image_classifier::models::model_config::ModelConfig;
use crate::inference::adapter::InferenceAdapter;
use crate::label_table::{ClassKeys, LabelTable};
use crate::library::logger::interface::Logger;
use std::sync::Arc;

pub type ModelLoader = fn(
    &ModelConfig,
    Arc<dyn Logger + Send + Sync>,
) -> Result<Arc<dyn ImageClassifier + Send + Sync>, Box<dyn std::error::Error + Send + Sync>>;

pub fn initialize(
    config: &Config,
    logger: &Arc<dyn Logger + Send + Sync>,
) -> Result<InferenceAdapter, InitError> {
    initialize_with(config, logger, load_tract_onnx)
}

pub fn initialize_with(
    config: &Config,
    logger: &Arc<dyn Logger + Send + Sync>,
    load_model: ModelLoader,
) -> Result<InferenceAdapter, InitError> {
    let logger = logger.with_namespace("inference");

    let labels = load_labels(config, &logger)?;

    let model = load_model(&config.model, logger.clone()).map_err(|source| InitError::Model {
        path: config.model.onnx_model_path.clone(),
        source,
    })?;
    let _ = logger.info(&format!("Model {} loaded", config.model.onnx_model_path));

    Ok(InferenceAdapter::new(
        model,
        labels,
        config.model.clone(),
        logger,
    ))
}

/// Like `initialize_with`, but a failure is logged and yields an adapter that
/// answers every request with `ModelUnavailable`.
pub fn initialize_or_degrade(
    config: &Config,
    logger: &Arc<dyn Logger + Send + Sync>,
    load_model: ModelLoader,
) -> InferenceAdapter {
    match initialize_with(config, logger, load_model) {
        Ok(adapter) => adapter,
        Err(e) => {
            let logger = logger.with_namespace("inference");
            let _ = logger.error(&format!("{}; classification is unavailable", e));

            let labels = load_labels(config, &logger).unwrap_or_else(|_| {
                LabelTable::placeholder(config.class_count, ClassKeys::default())
            });
            InferenceAdapter::unavailable(labels, config.model.clone(), logger)
        }
    }
}

pub fn load_tract_onnx(
    model_config: &ModelConfig,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Result<Arc<dyn ImageClassifier + Send + Sync>, Box<dyn std::error::Error + Send + Sync>> {
    let model: Arc<dyn ImageClassifier + Send + Sync> =
        Arc::new(ImageClassifierTractOnnx::new(model_config, logger)?);
    Ok(model)
}

fn load_labels(
    config: &Config,
    logger: &Arc<dyn Logger + Send + Sync>,
) -> Result<LabelTable, InitError> {
    let keys = match &config.class_keys {
        ClassKeySource::Offset(offset) => ClassKeys::Offset(*offset),
        ClassKeySource::TrainingDir(dir) => ClassKeys::from_training_dir(dir)?,
    };

    LabelTable::load(&config.label_table_path, config.class_count, keys, logger)
}
