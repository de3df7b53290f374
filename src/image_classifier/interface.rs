use crate::image_classifier::preprocess::ImageTensor;

/// A loaded network. Implementations must be safe to call concurrently.
pub trait ImageClassifier: Send + Sync {
    fn forward(
        &self,
        input: &ImageTensor,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>>;
}
