use crate::image_classifier::interface::ImageClassifier;
use crate::image_classifier::models::model_config::ModelConfig;
use crate::image_classifier::preprocess::{ImageTensor, TensorLayout};
use crate::library::logger::interface::Logger;
use std::sync::Arc;
use tract_onnx::prelude::*;

pub struct ImageClassifierTractOnnx {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    input_shape: [usize; 4],
}

impl ImageClassifierTractOnnx {
    pub fn new(
        config: &ModelConfig,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let logger = logger.with_namespace("tract_onnx");
        let (height, width) = (config.input_shape.0 as usize, config.input_shape.1 as usize);
        let input_shape = match config.layout {
            TensorLayout::Nhwc => [1, height, width, 3],
            TensorLayout::Nchw => [1, 3, height, width],
        };

        let _ = logger.info(&format!(
            "Loading {} with input {:?}",
            config.onnx_model_path, input_shape
        ));

        let model = tract_onnx::onnx()
            .model_for_path(&config.onnx_model_path)?
            .with_input_fact(0, f32::fact(input_shape).into())?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model, input_shape })
    }
}

impl ImageClassifier for ImageClassifierTractOnnx {
    fn forward(
        &self,
        input: &ImageTensor,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>> {
        if input.shape() != self.input_shape {
            return Err(format!(
                "input tensor shape {:?} does not match model input {:?}",
                input.shape(),
                self.input_shape
            )
            .into());
        }

        let tensor = Tensor::from_shape(&input.shape(), input.data())?;
        let outputs = self.model.run(tvec!(tensor.into()))?;

        let output = outputs
            .first()
            .ok_or("model produced no outputs")?
            .to_array_view::<f32>()?;

        // [1, classes] or a flat [classes]
        Ok(output.iter().copied().collect())
    }
}
