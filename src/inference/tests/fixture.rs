use crate::image_classifier::impl_fake::ImageClassifierFake;
use crate::image_classifier::interface::ImageClassifier;
use crate::image_classifier::models::model_config::ModelConfig;
use crate::inference::adapter::InferenceAdapter;
use crate::label_table::{ClassKeys, LabelTable};
use crate::library::logger::impl_fake::LoggerFake;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use std::io::Cursor;
use std::sync::Arc;

pub const FLOWER_NAMES: &str = r#"{"1": "pink primrose", "2": "hard-leaved pocket orchid"}"#;

pub struct Fixture {
    pub logger: LoggerFake,
    pub model: Arc<ImageClassifierFake>,
    pub adapter: InferenceAdapter,
}

impl Fixture {
    pub fn new(model: ImageClassifierFake) -> Self {
        Self::with_config(model, ModelConfig::default())
    }

    pub fn with_config(model: ImageClassifierFake, model_config: ModelConfig) -> Self {
        let logger = LoggerFake::new();
        let model = Arc::new(model);
        let handle: Arc<dyn ImageClassifier + Send + Sync> = model.clone();
        let adapter = InferenceAdapter::new(
            handle,
            flower_labels(),
            model_config,
            Arc::new(logger.clone()),
        );

        Self {
            logger,
            model,
            adapter,
        }
    }

    pub fn unavailable() -> Self {
        let logger = LoggerFake::new();
        let adapter = InferenceAdapter::unavailable(
            flower_labels(),
            ModelConfig::default(),
            Arc::new(logger.clone()),
        );

        Self {
            logger,
            model: Arc::new(ImageClassifierFake::fixed(vec![1.0])),
            adapter,
        }
    }
}

pub fn flower_labels() -> LabelTable {
    LabelTable::from_json(FLOWER_NAMES, ClassKeys::default()).unwrap()
}

pub fn gradient(width: u32, height: u32) -> DynamicImage {
    let mut img = ImageBuffer::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ]);
    }
    DynamicImage::ImageRgb8(img)
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}
