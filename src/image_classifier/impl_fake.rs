use crate::error::{ClassifierError, Result};
use crate::image_classifier::interface::{ImageClassifier, PredictionResult};
use image::DynamicImage;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers with a scripted sequence of labels, one per call, cycling.
pub struct ImageClassifierFake {
    labels: Vec<String>,
    script: Vec<String>,
    calls: AtomicUsize,
}

impl ImageClassifierFake {
    pub fn new(labels: &[&str], script: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            script: script.iter().map(|l| l.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn classify(&self, _image: &DynamicImage) -> Result<PredictionResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let predicted_label = self
            .script
            .get(call % self.script.len().max(1))
            .cloned()
            .ok_or_else(|| ClassifierError::FeatureExtraction("empty script".to_string()))?;

        let scores = self
            .labels
            .iter()
            .map(|l| if *l == predicted_label { 1.0 } else { 0.0 })
            .collect();

        Ok(PredictionResult {
            predicted_label,
            scores,
        })
    }
}
