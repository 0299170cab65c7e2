//! Margin loss
//!
//! Gantree: L5_Train → MarginLoss
//!
//! `loss(x) = max(p_other(x) - p_label(x) + λ, 0)^η`, averaged over a batch.
//! An image whose correct class leads by at least `λ` costs nothing.

use crate::config::TrainConfig;
use qtree_core::constants::tree::NUM_CLASSES;
use qtree_core::{ClassProbabilities, Label, QtreeError, QtreeResult};
use serde::{Deserialize, Serialize};

/// Hinge-style margin loss on class probabilities
/// Gantree: MarginLoss // 마진 손실
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginLoss {
    /// Required lead of the correct class
    pub lambda: f64,

    /// Curvature exponent
    pub eta: f64,
}

impl MarginLoss {
    /// Create loss with margin `lambda` and exponent `eta`
    pub fn new(lambda: f64, eta: f64) -> Self {
        Self { lambda, eta }
    }

    /// Loss configured by `lmda` and `eta`
    pub fn from_config(config: &TrainConfig) -> Self {
        Self::new(config.lmda, config.eta)
    }

    /// Loss of one image
    /// Gantree: image_loss(probs, label) -> Result<f64> // 이미지 손실
    pub fn image_loss(&self, probs: &ClassProbabilities, label: Label) -> QtreeResult<f64> {
        if label >= NUM_CLASSES {
            return Err(QtreeError::InvalidLabel(label));
        }

        let other_best = probs
            .iter()
            .enumerate()
            .filter(|(k, _)| *k != label)
            .map(|(_, &p)| p)
            .fold(f64::NEG_INFINITY, f64::max);

        let violation = other_best - probs[label] + self.lambda;
        if violation <= 0.0 {
            Ok(0.0)
        } else {
            Ok(violation.powf(self.eta))
        }
    }

    /// Mean loss over a batch
    /// Gantree: batch_loss(probs, labels) -> Result<f64> // 배치 평균
    pub fn batch_loss(&self, probs: &[ClassProbabilities], labels: &[Label]) -> QtreeResult<f64> {
        if probs.len() != labels.len() {
            return Err(QtreeError::LabelMismatch {
                labels: labels.len(),
                probabilities: probs.len(),
            });
        }
        if probs.is_empty() {
            return Err(QtreeError::EmptyBatch);
        }

        let mut total = 0.0;
        for (p, &label) in probs.iter().zip(labels) {
            total += self.image_loss(p, label)?;
        }
        Ok(total / probs.len() as f64)
    }
}

impl Default for MarginLoss {
    fn default() -> Self {
        Self::from_config(&TrainConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_inside_margin() {
        let loss = MarginLoss::new(0.2, 1.0);
        // Correct class leads by 0.4 >= 0.2
        assert_eq!(loss.image_loss(&[0.7, 0.3], 0).unwrap(), 0.0);
        // Exactly on the margin
        let wide = MarginLoss::new(0.5, 1.0);
        assert_eq!(wide.image_loss(&[0.25, 0.75], 1).unwrap(), 0.0);
    }

    #[test]
    fn test_violation_value() {
        let loss = MarginLoss::new(0.2, 2.0);
        // 0.6 - 0.4 + 0.2 = 0.4, squared
        assert_relative_eq!(loss.image_loss(&[0.4, 0.6], 0).unwrap(), 0.16, epsilon = 1e-12);
    }

    #[test]
    fn test_monotone_in_correct_probability() {
        let loss = MarginLoss::new(0.2, 1.5);
        let values: Vec<f64> = (0..=20)
            .map(|i| {
                let p_correct = 1.0 - i as f64 / 20.0;
                loss.image_loss(&[p_correct, 1.0 - p_correct], 0).unwrap()
            })
            .collect();

        assert!(values.windows(2).all(|w| w[1] >= w[0]));
        assert!(values[20] > 0.0);
    }

    #[test]
    fn test_batch_mean() {
        let loss = MarginLoss::new(0.0, 1.0);
        let probs = [[0.9, 0.1], [0.3, 0.7]];
        // Second image: 0.7 - 0.3 = 0.4
        assert_relative_eq!(loss.batch_loss(&probs, &[0, 0]).unwrap(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_preconditions() {
        let loss = MarginLoss::default();
        assert!(matches!(
            loss.batch_loss(&[[0.5, 0.5]], &[0, 1]),
            Err(QtreeError::LabelMismatch { labels: 2, probabilities: 1 })
        ));
        assert!(matches!(loss.batch_loss(&[], &[]), Err(QtreeError::EmptyBatch)));
        assert!(matches!(
            loss.batch_loss(&[[0.5, 0.5]], &[2]),
            Err(QtreeError::InvalidLabel(2))
        ));
    }
}
