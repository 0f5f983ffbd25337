use crate::error::Result;
use crate::preprocess::tensor::PreprocessedTensor;
use serde::{Deserialize, Serialize};

pub type EmbeddingVector = Vec<f32>;

/// Identifies the network an embedding came from. Stored in the model so a
/// classifier is never paired with embeddings from a different extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureExtractorDescriptor {
    pub output_layer: String,
    pub embedding_len: usize,
    /// SHA-256 of the network artifact, when the scorer is file backed.
    pub fingerprint: Option<String>,
}

impl FeatureExtractorDescriptor {
    /// Whether embeddings from `other` can feed a classifier trained on `self`.
    pub fn check_compatible(&self, other: &FeatureExtractorDescriptor) -> std::result::Result<(), String> {
        if self.output_layer != other.output_layer {
            return Err(format!(
                "output layer {:?} does not match {:?}",
                other.output_layer, self.output_layer
            ));
        }
        if self.embedding_len != other.embedding_len {
            return Err(format!(
                "embedding length {} does not match {}",
                other.embedding_len, self.embedding_len
            ));
        }
        if let (Some(expected), Some(actual)) = (&self.fingerprint, &other.fingerprint) {
            if expected != actual {
                return Err(format!(
                    "feature extractor fingerprint {} does not match {}",
                    actual, expected
                ));
            }
        }
        Ok(())
    }
}

/// Frozen pretrained network turning a preprocessed image into an embedding.
pub trait Scorer: Send + Sync {
    fn descriptor(&self) -> FeatureExtractorDescriptor;
    fn score(&self, tensor: &PreprocessedTensor) -> Result<EmbeddingVector>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(fingerprint: Option<&str>) -> FeatureExtractorDescriptor {
        FeatureExtractorDescriptor {
            output_layer: "softmax2_pre_activation".to_string(),
            embedding_len: 1008,
            fingerprint: fingerprint.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_fingerprint_is_compatible() {
        assert!(descriptor(Some("abc")).check_compatible(&descriptor(None)).is_ok());
    }

    #[test]
    fn test_different_fingerprint_is_incompatible() {
        assert!(descriptor(Some("abc"))
            .check_compatible(&descriptor(Some("def")))
            .is_err());
    }

    #[test]
    fn test_different_length_is_incompatible() {
        let mut other = descriptor(None);
        other.embedding_len = 2048;

        assert!(descriptor(None).check_compatible(&other).is_err());
    }
}
