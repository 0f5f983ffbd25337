//! Self-describing header of a saved model.

use crate::classifier::label_codec::LabelCodec;
use crate::classifier::trained_model::{TrainedModel, TrainingSummary};
use crate::error::{ClassifierError, Result};
use crate::feature_extractor::interface::FeatureExtractorDescriptor;
use crate::preprocess::settings::{PreprocessSettings, IMAGE_HEIGHT, IMAGE_WIDTH};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub schema_version: u32,
    pub preprocess: PreprocessSettings,
    pub feature_extractor: FeatureExtractorDescriptor,
    pub labels: LabelCodec,
    pub num_classes: usize,
    pub embedding_len: usize,
    pub training: TrainingSummary,
}

impl ModelMetadata {
    pub fn from_model(model: &TrainedModel) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            preprocess: model.preprocess.clone(),
            feature_extractor: model.feature_extractor.clone(),
            labels: model.label_codec.clone(),
            num_classes: model.classifier.num_classes,
            embedding_len: model.classifier.embedding_len,
            training: model.summary.clone(),
        }
    }

    /// Rejects metadata this build cannot pair with its preprocessing and
    /// feature extraction.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ClassifierError::ModelCorrupt(format!(
                "schema version {} is not supported (expected {})",
                self.schema_version, SCHEMA_VERSION
            )));
        }

        let shape = self
            .preprocess
            .validate()
            .map_err(ClassifierError::ModelCorrupt)?;
        if shape != (IMAGE_WIDTH as usize, IMAGE_HEIGHT as usize, 1) {
            return Err(ClassifierError::ModelCorrupt(format!(
                "preprocessing produces {:?}, feature extractor takes {}x{}x1",
                shape, IMAGE_WIDTH, IMAGE_HEIGHT
            )));
        }

        if self.labels.len() != self.num_classes || self.num_classes < 2 {
            return Err(ClassifierError::ModelCorrupt(format!(
                "{} labels for {} classes",
                self.labels.len(),
                self.num_classes
            )));
        }

        if self.feature_extractor.embedding_len != self.embedding_len {
            return Err(ClassifierError::ModelCorrupt(format!(
                "classifier takes {} features, feature extractor produces {}",
                self.embedding_len, self.feature_extractor.embedding_len
            )));
        }

        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ClassifierError::ModelCorrupt(format!("metadata: {}", e)))
    }

    pub fn from_json_string(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ClassifierError::ModelCorrupt(format!("metadata.json: {}", e)))
    }
}
