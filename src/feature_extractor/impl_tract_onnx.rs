use crate::error::{ClassifierError, Result};
use crate::feature_extractor::interface::{EmbeddingVector, FeatureExtractorDescriptor, Scorer};
use crate::feature_extractor::model_config::FeatureExtractorConfig;
use crate::library::logger::interface::Logger;
use crate::preprocess::tensor::PreprocessedTensor;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tract_onnx::prelude::*;

/// Pretrained network loaded from an ONNX file, run on the CPU by tract.
pub struct ScorerTractOnnx {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    descriptor: FeatureExtractorDescriptor,
    input_width: usize,
    input_height: usize,
    input_channels: usize,
}

impl ScorerTractOnnx {
    pub fn new(
        config: &FeatureExtractorConfig,
        input_shape: (usize, usize),
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self> {
        let logger = logger.with_namespace("feature_extractor").with_namespace("tract");
        let (input_width, input_height) = input_shape;

        if !config.model_path.is_file() {
            return Err(ClassifierError::FeatureExtraction(format!(
                "network artifact {:?} not found",
                config.model_path
            )));
        }

        let _ = logger.info(&format!("Loading network {:?}...", config.model_path));

        let model = tract_onnx::onnx()
            .model_for_path(&config.model_path)
            .and_then(|model| {
                model.with_input_fact(
                    0,
                    f32::fact([1, input_height, input_width, config.input_channels]).into(),
                )
            })
            .and_then(|model| model.with_output_names([config.output_layer.as_str()]))
            .and_then(|model| model.into_optimized())
            .map_err(tract_error)?;

        let embedding_len = model
            .output_fact(0)
            .map_err(tract_error)?
            .shape
            .as_concrete()
            .map(|dims| dims.iter().skip(1).product::<usize>())
            .ok_or_else(|| {
                ClassifierError::FeatureExtraction(format!(
                    "output {} has no concrete shape",
                    config.output_layer
                ))
            })?;

        let model = model.into_runnable().map_err(tract_error)?;

        let descriptor = FeatureExtractorDescriptor {
            output_layer: config.output_layer.clone(),
            embedding_len,
            fingerprint: Some(fingerprint(&config.model_path)?),
        };

        let _ = logger.info(&format!(
            "Network loaded, {} produces {} features",
            descriptor.output_layer, embedding_len
        ));

        Ok(Self {
            model,
            descriptor,
            input_width,
            input_height,
            input_channels: config.input_channels,
        })
    }

    fn to_input(&self, tensor: &PreprocessedTensor) -> Result<Tensor> {
        if (tensor.width, tensor.height) != (self.input_width, self.input_height)
            || tensor.channels != 1
        {
            return Err(ClassifierError::FeatureExtraction(format!(
                "expected a {}x{}x1 tensor, got {:?}",
                self.input_width,
                self.input_height,
                tensor.shape()
            )));
        }

        // NHWC, grey plane repeated into every channel.
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, self.input_height, self.input_width, self.input_channels),
            |(_, y, x, _)| tensor.at(x, y, 0),
        );

        Ok(input.into_tensor())
    }
}

impl Scorer for ScorerTractOnnx {
    fn descriptor(&self) -> FeatureExtractorDescriptor {
        self.descriptor.clone()
    }

    fn score(&self, tensor: &PreprocessedTensor) -> Result<EmbeddingVector> {
        let input = self.to_input(tensor)?;
        let outputs = self.model.run(tvec!(input.into_tvalue())).map_err(tract_error)?;
        let output = outputs[0].to_array_view::<f32>().map_err(tract_error)?;

        Ok(output.iter().copied().collect())
    }
}

fn tract_error(error: TractError) -> ClassifierError {
    ClassifierError::FeatureExtraction(error.to_string())
}

fn fingerprint(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path).map_err(|e| ClassifierError::io(path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| ClassifierError::io(path, e))?;
    Ok(format!("{:x}", hasher.finalize()))
}
