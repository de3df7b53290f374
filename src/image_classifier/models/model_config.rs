use crate::image_classifier::preprocess::TensorLayout;
use image::imageops::FilterType;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub onnx_model_path: String,
    /// (height, width)
    pub input_shape: (u32, u32),
    pub layout: TensorLayout,
    pub filter: FilterType,
    /// Set for exports whose last layer emits logits instead of probabilities.
    pub apply_softmax: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            onnx_model_path: "model/flower_classification_model_MobileNetV2.onnx".to_string(),
            input_shape: (224, 224),
            layout: TensorLayout::Nhwc,
            filter: FilterType::Triangle,
            apply_softmax: false,
        }
    }
}
