use crate::classifier::trainer::TrainerConfig;
use crate::error::{ClassifierError, Result};
use crate::feature_extractor::model_config::FeatureExtractorConfig;
use chrono::{Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorColor {
    Green,
    Red,
    Yellow,
    White,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub label: String,
    pub text: String,
    pub color: IndicatorColor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model_path: PathBuf,
    pub feature_extractor: FeatureExtractorConfig,
    pub device_index: i32,
    pub frame_delay_ms: u64,
    pub frames_directory: PathBuf,
    pub dataset_extensions: Vec<String>,
    pub trainer: TrainerConfig,
    pub indicators: Vec<IndicatorConfig>,
    pub logger_utc_offset_hours: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/model.tar.gz"),
            feature_extractor: FeatureExtractorConfig::default(),
            device_index: 0,
            frame_delay_ms: 200,
            frames_directory: PathBuf::from("frames"),
            dataset_extensions: vec!["jpg".to_string()],
            trainer: TrainerConfig::default(),
            indicators: vec![
                IndicatorConfig {
                    label: "standing".to_string(),
                    text: "Standing".to_string(),
                    color: IndicatorColor::Green,
                },
                IndicatorConfig {
                    label: "falling".to_string(),
                    text: "Falling".to_string(),
                    color: IndicatorColor::Red,
                },
                IndicatorConfig {
                    label: "empty".to_string(),
                    text: "Empty".to_string(),
                    color: IndicatorColor::Yellow,
                },
            ],
            logger_utc_offset_hours: 0,
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing fields fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| ClassifierError::io(path, e))?;
        serde_json::from_str(&json).map_err(|e| {
            ClassifierError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
            )
        })
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    pub fn logger_timezone(&self) -> chrono::FixedOffset {
        chrono::FixedOffset::east_opt(self.logger_utc_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix())
    }
}
