use crate::error::{ClassifierError, Result};
use crate::feature_extractor::interface::{EmbeddingVector, FeatureExtractorDescriptor, Scorer};
use crate::preprocess::tensor::PreprocessedTensor;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Stand-in network: the embedding is the mean of each cell of a
/// `grid` x `grid` partition of the tensor, scaled down to roughly [-1, 1].
pub struct ScorerFake {
    grid: usize,
    output_layer: String,
    calls: AtomicUsize,
}

impl ScorerFake {
    pub fn new(grid: usize) -> Self {
        Self {
            grid: grid.max(1),
            output_layer: "fake_grid_mean".to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_output_layer(mut self, output_layer: &str) -> Self {
        self.output_layer = output_layer.to_string();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Scorer for ScorerFake {
    fn descriptor(&self) -> FeatureExtractorDescriptor {
        FeatureExtractorDescriptor {
            output_layer: self.output_layer.clone(),
            embedding_len: self.grid * self.grid,
            fingerprint: None,
        }
    }

    fn score(&self, tensor: &PreprocessedTensor) -> Result<EmbeddingVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if tensor.width < self.grid || tensor.height < self.grid {
            return Err(ClassifierError::FeatureExtraction(format!(
                "tensor {:?} smaller than grid {}",
                tensor.shape(),
                self.grid
            )));
        }

        let mut sums = vec![0.0f64; self.grid * self.grid];
        let mut counts = vec![0usize; self.grid * self.grid];

        for y in 0..tensor.height {
            for x in 0..tensor.width {
                let cell = (y * self.grid / tensor.height) * self.grid + x * self.grid / tensor.width;
                for c in 0..tensor.channels {
                    sums[cell] += tensor.at(x, y, c) as f64;
                    counts[cell] += 1;
                }
            }
        }

        Ok(sums
            .iter()
            .zip(counts.iter())
            .map(|(sum, count)| (sum / *count as f64 / 128.0) as f32)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_means() {
        let mut data = vec![-117.0f32; 4 * 4];
        // top-left cell bright
        for y in 0..2 {
            for x in 0..2 {
                data[y * 4 + x] = 139.0;
            }
        }
        let tensor = PreprocessedTensor {
            width: 4,
            height: 4,
            channels: 1,
            data,
        };

        let embedding = ScorerFake::new(2).score(&tensor).unwrap();

        assert_eq!(embedding.len(), 4);
        assert!(embedding[0] > 1.0);
        assert!(embedding[1..].iter().all(|v| *v < -0.9));
    }
}
