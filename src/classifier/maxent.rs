use crate::classifier::lbfgs::Objective;
use crate::error::{ClassifierError, Result};

/// Multiclass logistic regression: one weight row and one bias per class,
/// scores are the softmax of the class logits.
#[derive(Debug, Clone, PartialEq)]
pub struct MaximumEntropyClassifier {
    pub num_classes: usize,
    pub embedding_len: usize,
    /// Row-major `num_classes x embedding_len`.
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
}

impl MaximumEntropyClassifier {
    /// Splits an optimiser parameter vector laid out as all weights, then all biases.
    pub fn from_parameters(num_classes: usize, embedding_len: usize, mut parameters: Vec<f64>) -> Self {
        let biases = parameters.split_off(num_classes * embedding_len);
        Self {
            num_classes,
            embedding_len,
            weights: parameters,
            biases,
        }
    }

    /// `None` when the count does not fit in `usize`.
    pub fn parameter_count(num_classes: usize, embedding_len: usize) -> Option<usize> {
        embedding_len
            .checked_add(1)
            .and_then(|row| row.checked_mul(num_classes))
    }

    /// Probability per class, in key order.
    pub fn scores(&self, embedding: &[f32]) -> Result<Vec<f32>> {
        if embedding.len() != self.embedding_len {
            return Err(ClassifierError::FeatureExtraction(format!(
                "embedding has {} features, classifier expects {}",
                embedding.len(),
                self.embedding_len
            )));
        }

        let mut logits = vec![0.0; self.num_classes];
        for (k, logit) in logits.iter_mut().enumerate() {
            let row = &self.weights[k * self.embedding_len..(k + 1) * self.embedding_len];
            *logit = self.biases[k]
                + row
                    .iter()
                    .zip(embedding)
                    .map(|(w, x)| w * *x as f64)
                    .sum::<f64>();
        }

        Ok(softmax(&logits).into_iter().map(|p| p as f32).collect())
    }

    /// Key of the highest score; ties go to the lowest key.
    pub fn predict(&self, embedding: &[f32]) -> Result<(usize, Vec<f32>)> {
        let scores = self.scores(embedding)?;
        let key = argmax(&scores);
        Ok((key, scores))
    }
}

pub fn argmax(scores: &[f32]) -> usize {
    let mut best = 0;
    for (i, score) in scores.iter().enumerate() {
        if *score > scores[best] {
            best = i;
        }
    }
    best
}

fn log_sum_exp(logits: &[f64]) -> f64 {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    max + logits.iter().map(|z| (z - max).exp()).sum::<f64>().ln()
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let lse = log_sum_exp(logits);
    logits.iter().map(|z| (z - lse).exp()).collect()
}

/// Summed negative log-likelihood plus `l2 / 2 * |W|^2` (biases are not
/// regularised) over a cached embedding matrix.
pub struct MaximumEntropyObjective<'a> {
    pub features: &'a [f64],
    pub targets: &'a [usize],
    pub num_classes: usize,
    pub embedding_len: usize,
    pub l2: f64,
}

impl Objective for MaximumEntropyObjective<'_> {
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let (k_count, d) = (self.num_classes, self.embedding_len);
        let (weights, biases) = x.split_at(k_count * d);
        grad.iter_mut().for_each(|g| *g = 0.0);

        let mut loss = 0.0;
        let mut logits = vec![0.0; k_count];

        for (i, target) in self.targets.iter().enumerate() {
            let row = &self.features[i * d..(i + 1) * d];

            for k in 0..k_count {
                let w = &weights[k * d..(k + 1) * d];
                logits[k] = biases[k] + w.iter().zip(row).map(|(a, b)| a * b).sum::<f64>();
            }

            let lse = log_sum_exp(&logits);
            loss += lse - logits[*target];

            for k in 0..k_count {
                let indicator = if k == *target { 1.0 } else { 0.0 };
                let coefficient = (logits[k] - lse).exp() - indicator;
                let g = &mut grad[k * d..(k + 1) * d];
                for (gj, xj) in g.iter_mut().zip(row) {
                    *gj += coefficient * xj;
                }
                grad[k_count * d + k] += coefficient;
            }
        }

        for (j, w) in weights.iter().enumerate() {
            loss += 0.5 * self.l2 * w * w;
            grad[j] += self.l2 * w;
        }

        loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_count_overflow_is_none() {
        assert_eq!(MaximumEntropyClassifier::parameter_count(3, 2), Some(9));
        assert_eq!(MaximumEntropyClassifier::parameter_count(3, usize::MAX), None);
        assert_eq!(MaximumEntropyClassifier::parameter_count(usize::MAX, 1), None);
    }

    #[test]
    fn test_scores_sum_to_one() {
        let classifier = MaximumEntropyClassifier::from_parameters(
            3,
            2,
            vec![1.0, 0.0, 0.0, 1.0, -1.0, -1.0, 0.1, 0.2, 0.3],
        );

        let scores = classifier.scores(&[0.5, -0.5]).unwrap();

        assert_eq!(scores.len(), 3);
        assert!((scores.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_wrong_embedding_length_fails() {
        let classifier = MaximumEntropyClassifier::from_parameters(2, 2, vec![0.0; 6]);

        assert!(classifier.scores(&[1.0]).is_err());
    }

    #[test]
    fn test_ties_resolve_to_lowest_key() {
        assert_eq!(argmax(&[0.25, 0.5, 0.5]), 1);
        assert_eq!(argmax(&[1.0 / 3.0; 3]), 0);
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let features = vec![0.5, -1.0, 1.5, 0.25, -0.75, 2.0];
        let targets = vec![0, 2, 1];
        let objective = MaximumEntropyObjective {
            features: &features,
            targets: &targets,
            num_classes: 3,
            embedding_len: 2,
            l2: 0.5,
        };
        let x: Vec<f64> = (0..9).map(|i| (i as f64 - 4.0) * 0.1).collect();
        let mut grad = vec![0.0; 9];
        objective.evaluate(&x, &mut grad);

        let h = 1e-6;
        let mut scratch = vec![0.0; 9];
        for j in 0..9 {
            let mut plus = x.clone();
            let mut minus = x.clone();
            plus[j] += h;
            minus[j] -= h;
            let numeric = (objective.evaluate(&plus, &mut scratch)
                - objective.evaluate(&minus, &mut scratch))
                / (2.0 * h);
            assert!((numeric - grad[j]).abs() < 1e-5, "parameter {}", j);
        }
    }
}
