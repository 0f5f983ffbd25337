//! Single-file model artifact (tar.gz):
//! - metadata.json  - preprocessing, feature extractor, labels, training summary
//! - classifier.bin - little-endian f64 weights, then biases

use crate::classifier::maxent::MaximumEntropyClassifier;
use crate::classifier::trained_model::TrainedModel;
use crate::error::{ClassifierError, Result};
use crate::library::logger::interface::Logger;
use crate::model_store::model_metadata::ModelMetadata;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tar::{Archive, Builder};

const METADATA_ENTRY: &str = "metadata.json";
const CLASSIFIER_ENTRY: &str = "classifier.bin";

pub struct ModelStore {
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ModelStore {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("model_store"),
        }
    }

    pub fn save(&self, model: &TrainedModel, path: &Path) -> Result<()> {
        let metadata = ModelMetadata::from_model(model);
        let json = metadata.to_json_string()?;
        let binary = encode_classifier(&model.classifier);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ClassifierError::io(parent, e))?;
        }

        // A failed save leaves any previous model at `path` untouched.
        let partial = partial_path(path);
        let written = write_archive(&partial, json.as_bytes(), &binary)
            .and_then(|()| std::fs::rename(&partial, path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&partial);
            return Err(ClassifierError::io(path, e));
        }

        let _ = self.logger.info(&format!(
            "Saved {} class model to {:?}",
            model.label_codec.len(),
            path
        ));

        Ok(())
    }

    pub fn load(&self, path: &Path) -> Result<TrainedModel> {
        if !path.is_file() {
            return Err(ClassifierError::ModelNotFound(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|e| ClassifierError::io(path, e))?;
        let mut archive = Archive::new(GzDecoder::new(file));

        let mut metadata: Option<ModelMetadata> = None;
        let mut binary: Option<Vec<u8>> = None;

        let entries = archive.entries().map_err(corrupt)?;
        for entry in entries {
            let mut entry = entry.map_err(corrupt)?;
            let name = entry.path().map_err(corrupt)?.to_string_lossy().to_string();

            match name.as_str() {
                METADATA_ENTRY => {
                    let mut json = String::new();
                    entry.read_to_string(&mut json).map_err(corrupt)?;
                    metadata = Some(ModelMetadata::from_json_string(&json)?);
                }
                CLASSIFIER_ENTRY => {
                    let mut buffer = Vec::new();
                    entry.read_to_end(&mut buffer).map_err(corrupt)?;
                    binary = Some(buffer);
                }
                _ => {}
            }
        }

        let metadata = metadata.ok_or_else(|| {
            ClassifierError::ModelCorrupt(format!("{} not found in archive", METADATA_ENTRY))
        })?;
        let binary = binary.ok_or_else(|| {
            ClassifierError::ModelCorrupt(format!("{} not found in archive", CLASSIFIER_ENTRY))
        })?;

        metadata.validate()?;
        let classifier = decode_classifier(&binary, metadata.num_classes, metadata.embedding_len)?;

        let _ = self.logger.info(&format!(
            "Loaded model from {:?}: labels {:?}, trained {}",
            path,
            metadata.labels.labels(),
            metadata.training.trained_at
        ));

        Ok(TrainedModel {
            preprocess: metadata.preprocess,
            feature_extractor: metadata.feature_extractor,
            classifier,
            label_codec: metadata.labels,
            summary: metadata.training,
        })
    }
}

/// `model.tar.gz` -> `model.tar.gz.partial`, in the same directory.
pub(crate) fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn write_archive(path: &Path, metadata: &[u8], classifier: &[u8]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
    append(&mut builder, METADATA_ENTRY, metadata)?;
    append(&mut builder, CLASSIFIER_ENTRY, classifier)?;
    builder.into_inner()?.finish()?.sync_all()
}

fn append<W: std::io::Write>(builder: &mut Builder<W>, name: &str, bytes: &[u8]) -> std::io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_path(name)?;
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append(&header, bytes)
}

fn corrupt(error: std::io::Error) -> ClassifierError {
    ClassifierError::ModelCorrupt(error.to_string())
}

fn encode_classifier(classifier: &MaximumEntropyClassifier) -> Vec<u8> {
    classifier
        .weights
        .iter()
        .chain(&classifier.biases)
        .flat_map(|v| v.to_le_bytes())
        .collect()
}

fn decode_classifier(
    binary: &[u8],
    num_classes: usize,
    embedding_len: usize,
) -> Result<MaximumEntropyClassifier> {
    let expected = MaximumEntropyClassifier::parameter_count(num_classes, embedding_len)
        .filter(|count| count.checked_mul(8).is_some())
        .ok_or_else(|| {
            ClassifierError::ModelCorrupt(format!(
                "{} classes of {} features cannot be addressed",
                num_classes, embedding_len
            ))
        })?;
    if binary.len() != expected * 8 {
        return Err(ClassifierError::ModelCorrupt(format!(
            "{} holds {} bytes, expected {} parameters",
            CLASSIFIER_ENTRY,
            binary.len(),
            expected
        )));
    }

    let mut parameters = Vec::with_capacity(expected);
    for chunk in binary.chunks_exact(8) {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(chunk);
        let value = f64::from_le_bytes(bytes);
        if !value.is_finite() {
            return Err(ClassifierError::ModelCorrupt(
                "classifier contains non-finite weights".to_string(),
            ));
        }
        parameters.push(value);
    }

    Ok(MaximumEntropyClassifier::from_parameters(
        num_classes,
        embedding_len,
        parameters,
    ))
}
