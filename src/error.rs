use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("training did not converge after {iterations} iterations: {reason}")]
    TrainingDiverged { iterations: usize, reason: String },

    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model not found at {0:?}")]
    ModelNotFound(PathBuf),

    #[error("model is corrupt: {0}")]
    ModelCorrupt(String),

    #[error("capture device {device_index} unavailable: {reason}")]
    DeviceUnavailable { device_index: i32, reason: String },

    #[error("preprocessing failed: {0}")]
    Preprocess(String),

    #[error("feature extraction failed: {0}")]
    FeatureExtraction(String),

    #[error("label key {0} is not in the label codec")]
    UnknownLabelKey(usize),

    #[error("frame error: {0}")]
    Frame(String),

    #[error("display error: {0}")]
    Display(String),
}

impl ClassifierError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
