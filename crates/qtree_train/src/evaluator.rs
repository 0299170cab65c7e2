//! Classification accuracy
//!
//! Gantree: L5_Train → Evaluator

use log::warn;
use qtree_core::constants::tree::NUM_CLASSES;
use qtree_core::{predicted_label, ClassProbabilities, Label, QtreeError, QtreeResult};

/// Percentage of rows whose argmax matches the label.
/// An empty batch scores 0.0.
/// Gantree: accuracy(probs, labels) -> Result<f64> // 정확도 (%)
pub fn accuracy(probs: &[ClassProbabilities], labels: &[Label]) -> QtreeResult<f64> {
    if probs.len() != labels.len() {
        return Err(QtreeError::LabelMismatch {
            labels: labels.len(),
            probabilities: probs.len(),
        });
    }
    if let Some(&bad) = labels.iter().find(|&&l| l >= NUM_CLASSES) {
        return Err(QtreeError::InvalidLabel(bad));
    }
    if probs.is_empty() {
        warn!("accuracy requested on an empty set, reporting 0.0");
        return Ok(0.0);
    }

    let correct = probs
        .iter()
        .zip(labels)
        .filter(|&(p, &l)| predicted_label(p) == l)
        .count();
    Ok(100.0 * correct as f64 / probs.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_correct() {
        let probs = [[0.9, 0.1], [0.2, 0.8], [0.6, 0.4]];
        assert_eq!(accuracy(&probs, &[0, 1, 0]).unwrap(), 100.0);
    }

    #[test]
    fn test_all_wrong() {
        let probs = [[0.9, 0.1], [0.2, 0.8], [0.6, 0.4]];
        assert_eq!(accuracy(&probs, &[1, 0, 1]).unwrap(), 0.0);
    }

    #[test]
    fn test_partial_and_ties() {
        // Ties predict label 0
        let probs = [[0.5, 0.5], [0.5, 0.5], [0.1, 0.9], [0.9, 0.1]];
        assert_eq!(accuracy(&probs, &[0, 1, 1, 1]).unwrap(), 50.0);
    }

    #[test]
    fn test_empty_and_mismatch() {
        assert_eq!(accuracy(&[], &[]).unwrap(), 0.0);
        assert!(matches!(
            accuracy(&[[1.0, 0.0]], &[]),
            Err(QtreeError::LabelMismatch { .. })
        ));
        assert!(matches!(
            accuracy(&[[1.0, 0.0]], &[5]),
            Err(QtreeError::InvalidLabel(5))
        ));
    }
}
