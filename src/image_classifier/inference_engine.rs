use crate::classifier::trained_model::TrainedModel;
use crate::error::{ClassifierError, Result};
use crate::feature_extractor::interface::Scorer;
use crate::image_classifier::interface::{ImageClassifier, PredictionResult};
use crate::library::logger::interface::Logger;
use crate::model_store::model_storage::ModelStore;
use crate::preprocess::pipeline::preprocess;
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;

/// A loaded model bound to the network it was trained against. Loaded once,
/// then shared read-only by every `classify` call.
pub struct InferenceEngine {
    model: TrainedModel,
    scorer: Arc<dyn Scorer>,
}

impl InferenceEngine {
    pub fn load_model(
        path: &Path,
        scorer: Arc<dyn Scorer>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self> {
        let logger = logger.with_namespace("inference");
        let model = ModelStore::new(logger.clone()).load(path)?;
        let engine = Self::new(model, scorer)?;

        let _ = logger.info(&format!(
            "Inference engine ready for labels {:?}",
            engine.model.label_codec.labels()
        ));

        Ok(engine)
    }

    pub fn new(model: TrainedModel, scorer: Arc<dyn Scorer>) -> Result<Self> {
        model
            .feature_extractor
            .check_compatible(&scorer.descriptor())
            .map_err(ClassifierError::ModelCorrupt)?;

        Ok(Self { model, scorer })
    }

    #[allow(dead_code)]
    pub fn labels(&self) -> &[String] {
        self.model.label_codec.labels()
    }
}

impl ImageClassifier for InferenceEngine {
    fn classify(&self, image: &DynamicImage) -> Result<PredictionResult> {
        let tensor = preprocess(image, &self.model.preprocess).map_err(ClassifierError::Preprocess)?;
        let embedding = self.scorer.score(&tensor)?;
        self.model.predict(&embedding)
    }
}
