use crate::classifier::label_codec::LabelCodec;
use crate::classifier::maxent::MaximumEntropyClassifier;
use crate::error::Result;
use crate::feature_extractor::interface::FeatureExtractorDescriptor;
use crate::image_classifier::interface::PredictionResult;
use crate::preprocess::settings::PreprocessSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub samples: usize,
    pub iterations: usize,
    pub final_loss: f64,
    pub training_accuracy: f64,
    pub trained_at: String,
}

/// Everything needed to classify an image: how to preprocess it, which
/// network produced the embeddings, the classifier, and its labels.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    pub preprocess: PreprocessSettings,
    pub feature_extractor: FeatureExtractorDescriptor,
    pub classifier: MaximumEntropyClassifier,
    pub label_codec: LabelCodec,
    pub summary: TrainingSummary,
}

impl TrainedModel {
    pub fn predict(&self, embedding: &[f32]) -> Result<PredictionResult> {
        let (key, scores) = self.classifier.predict(embedding)?;
        let predicted_label = self.label_codec.decode(key)?.to_string();

        Ok(PredictionResult {
            predicted_label,
            scores,
        })
    }
}
