use crate::classifier::label_codec::LabelCodec;
use crate::classifier::lbfgs::{minimize_l1, L1Penalty, LbfgsSettings};
use crate::classifier::maxent::{MaximumEntropyClassifier, MaximumEntropyObjective};
use crate::classifier::trained_model::{TrainedModel, TrainingSummary};
use crate::dataset::sample::Dataset;
use crate::error::{ClassifierError, Result};
use crate::feature_extractor::interface::Scorer;
use crate::library::logger::interface::Logger;
use crate::preprocess::pipeline::preprocess;
use crate::preprocess::settings::PreprocessSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Applies to weights only, like the L2 term.
    pub l1_regularization: f64,
    pub l2_regularization: f64,
    pub optimization_tolerance: f64,
    pub history_size: usize,
    pub max_iterations: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            l1_regularization: 1.0,
            l2_regularization: 1.0,
            optimization_tolerance: 1e-7,
            history_size: 20,
            max_iterations: 1000,
        }
    }
}

impl TrainerConfig {
    fn lbfgs(&self) -> LbfgsSettings {
        LbfgsSettings {
            history_size: self.history_size,
            tolerance: self.optimization_tolerance,
            max_iterations: self.max_iterations,
        }
    }
}

pub struct Trainer {
    preprocess: PreprocessSettings,
    scorer: Arc<dyn Scorer>,
    config: TrainerConfig,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl Trainer {
    pub fn new(
        preprocess: PreprocessSettings,
        scorer: Arc<dyn Scorer>,
        config: TrainerConfig,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            preprocess,
            scorer,
            config,
            logger: logger.with_namespace("trainer"),
        }
    }

    pub fn train(&self, dataset: &Dataset) -> Result<TrainedModel> {
        self.preprocess
            .validate()
            .map_err(ClassifierError::Preprocess)?;

        let label_codec = LabelCodec::from_labels(dataset.labels());
        if dataset.is_empty() {
            return Err(ClassifierError::Dataset("dataset has no samples".to_string()));
        }
        if label_codec.len() < 2 {
            return Err(ClassifierError::Dataset(format!(
                "need at least two labels to train, found {:?}",
                label_codec.labels()
            )));
        }

        let descriptor = self.scorer.descriptor();
        let embedding_len = descriptor.embedding_len;

        let _ = self.logger.info(&format!(
            "Extracting {} features from {} samples...",
            embedding_len,
            dataset.len()
        ));

        // Embeddings are computed once and reused by every optimiser pass.
        let mut features = Vec::with_capacity(dataset.len() * embedding_len);
        let mut targets = Vec::with_capacity(dataset.len());
        for sample in &dataset.samples {
            let tensor =
                preprocess(&sample.image, &self.preprocess).map_err(ClassifierError::Preprocess)?;
            let embedding = self.scorer.score(&tensor)?;
            if embedding.len() != embedding_len {
                return Err(ClassifierError::FeatureExtraction(format!(
                    "embedding has {} features, expected {}",
                    embedding.len(),
                    embedding_len
                )));
            }
            features.extend(embedding.iter().map(|v| *v as f64));
            targets.push(
                label_codec
                    .encode(&sample.label)
                    .ok_or_else(|| ClassifierError::Dataset(format!("unknown label {}", sample.label)))?,
            );
        }

        let num_classes = label_codec.len();
        let objective = MaximumEntropyObjective {
            features: &features,
            targets: &targets,
            num_classes,
            embedding_len,
            l2: self.config.l2_regularization,
        };

        let _ = self.logger.info(&format!(
            "Fitting {} classes with L-BFGS (tolerance {}, at most {} iterations)...",
            num_classes, self.config.optimization_tolerance, self.config.max_iterations
        ));

        let parameters = MaximumEntropyClassifier::parameter_count(num_classes, embedding_len)
            .ok_or_else(|| {
                ClassifierError::FeatureExtraction(format!(
                    "embedding of {} features is too large for {} classes",
                    embedding_len, num_classes
                ))
            })?;
        let x0 = vec![0.0; parameters];
        let penalty = L1Penalty {
            weight: self.config.l1_regularization,
            count: num_classes * embedding_len,
        };
        let minimum = minimize_l1(&objective, x0, &self.config.lbfgs(), penalty).map_err(|e| {
            let _ = self.logger.error(&format!("Training diverged: {}", e));
            ClassifierError::TrainingDiverged {
                iterations: e.iterations(),
                reason: e.to_string(),
            }
        })?;

        let classifier =
            MaximumEntropyClassifier::from_parameters(num_classes, embedding_len, minimum.x);

        let mut correct = 0;
        for (i, target) in targets.iter().enumerate() {
            let row: Vec<f32> = features[i * embedding_len..(i + 1) * embedding_len]
                .iter()
                .map(|v| *v as f32)
                .collect();
            if classifier.predict(&row)?.0 == *target {
                correct += 1;
            }
        }
        let training_accuracy = correct as f64 / targets.len() as f64;

        let _ = self.logger.info(&format!(
            "Converged after {} iterations, loss {:.6}, training accuracy {:.1}%",
            minimum.iterations,
            minimum.value,
            training_accuracy * 100.0
        ));

        Ok(TrainedModel {
            preprocess: self.preprocess.clone(),
            feature_extractor: descriptor,
            classifier,
            label_codec,
            summary: TrainingSummary {
                samples: targets.len(),
                iterations: minimum.iterations,
                final_loss: minimum.value,
                training_accuracy,
                trained_at: chrono::Local::now().to_rfc3339(),
            },
        })
    }
}
