use crate::error::Result;
use image::DynamicImage;

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub predicted_label: String,
    /// One score per class, in label codec order.
    pub scores: Vec<f32>,
}

/// Classifies a single unlabelled image. Implementations hold no per-call
/// state, so repeated calls with the same image give the same result.
pub trait ImageClassifier: Send + Sync {
    fn classify(&self, image: &DynamicImage) -> Result<PredictionResult>;
}
