use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Embedding layer of the Inception graph that the classifier is trained on.
pub const EMBEDDING_LAYER: &str = "softmax2_pre_activation";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureExtractorConfig {
    pub model_path: PathBuf,
    pub output_layer: String,
    /// Channel count the network expects; the grey plane is repeated into each.
    pub input_channels: usize,
}

impl Default for FeatureExtractorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/inception.onnx"),
            output_layer: EMBEDDING_LAYER.to_string(),
            input_channels: 3,
        }
    }
}
