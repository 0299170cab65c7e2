//! # QTREE Train
//!
//! Margin loss, SPSA with momentum and the epoch loop that fits a tree
//! classifier to labelled images.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qtree_train // L5: Training (완료)
//!     TrainConfig // 하이퍼파라미터 (완료)
//!         batch_size, num_epoch, a, A, s, b, t
//!         gamma, lmda, eta, num_samples, seed, tree
//!     MarginLoss // max(p_other - p_label + λ, 0)^η (완료)
//!     SpsaOptimizer // 2회 평가 + 모멘텀 (완료)
//!     Dataset // 검증된 샘플 + 배치 (완료)
//!     Evaluator // 정확도 (%) (완료)
//!     Trainer // 에폭 루프 (완료)
//!         step() - 배치 1회 갱신
//!         train() - 메인 루프
//!         TrainResult, EpochRecord - 결과
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qtree_backend::StateVectorSimulator;
//! use qtree_train::prelude::*;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(1);
//! let data = Dataset::stripes(2, 12, &mut rng).unwrap();
//! let (training, validation) = data.split(8);
//!
//! let config = TrainConfig::quick().with_seed(42);
//! let mut trainer = Trainer::new(config, 4, StateVectorSimulator::new()).unwrap();
//! let result = trainer.train(&training, &validation).unwrap();
//!
//! println!("accuracy: {:.1}%", result.final_accuracy);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Training configuration (Gantree: L5_Train → TrainConfig)
pub mod config;

/// Margin loss (Gantree: L5_Train → MarginLoss)
pub mod loss;

/// SPSA optimizer (Gantree: L5_Train → SpsaOptimizer)
pub mod spsa;

/// Datasets (Gantree: L5_Train → Dataset)
pub mod dataset;

/// Accuracy (Gantree: L5_Train → Evaluator)
pub mod evaluator;

/// Training loop (Gantree: L5_Train → Trainer)
pub mod trainer;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::TrainConfig;
pub use dataset::{DataSource, Dataset, Sample};
pub use evaluator::accuracy;
pub use loss::MarginLoss;
pub use spsa::{SpsaOptimizer, SpsaStep};
pub use trainer::{EpochRecord, TrainResult, Trainer};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qtree_train::prelude::*;
    //! ```

    pub use crate::config::TrainConfig;
    pub use crate::dataset::{DataSource, Dataset, Sample};
    pub use crate::evaluator::accuracy;
    pub use crate::loss::MarginLoss;
    pub use crate::spsa::{SpsaOptimizer, SpsaStep};
    pub use crate::trainer::{EpochRecord, TrainResult, Trainer};
    pub use qtree_core::TreeKind;
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use qtree_backend::{Simulator, StateVectorSimulator};
    use qtree_core::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_loss_on_simulated_probabilities() {
        // Identity nodes: readout follows pixel 0
        let mut tree = CompositeTree::new(4).unwrap();
        let circuit = tree.build(&vec![0.0; 48]).unwrap().clone();
        let images = [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 1.0, 1.0]];
        let bindings: Vec<_> = images.iter().map(|x| tree.bind(x).unwrap()).collect();
        let probs = StateVectorSimulator::new()
            .evaluate(&circuit, &bindings, 0)
            .unwrap();

        let loss = MarginLoss::new(0.2, 1.0);
        assert!(loss.batch_loss(&probs, &[1, 0]).unwrap() < 1e-12);
        // Swapped labels: each image violates by 1 + 0.2
        assert!((loss.batch_loss(&probs, &[0, 1]).unwrap() - 1.2).abs() < 1e-9);

        assert_eq!(accuracy(&probs, &[1, 0]).unwrap(), 100.0);
        assert_eq!(accuracy(&probs, &[0, 1]).unwrap(), 0.0);
    }

    #[test]
    fn test_trainer_loss_matches_probabilities() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let data = Dataset::stripes(2, 6, &mut rng).unwrap();

        let config = TrainConfig::default().with_loss(0.3, 2.0).with_seed(3);
        let mut trainer = Trainer::new(config, 4, StateVectorSimulator::new()).unwrap();

        let probs = trainer.probabilities(data.samples()).unwrap();
        let expected = MarginLoss::new(0.3, 2.0)
            .batch_loss(&probs, &data.labels())
            .unwrap();
        assert!((trainer.batch_loss(data.samples()).unwrap() - expected).abs() < 1e-12);

        let expected_accuracy = accuracy(&probs, &data.labels()).unwrap();
        assert_eq!(trainer.accuracy(data.samples()).unwrap(), expected_accuracy);
    }

    #[test]
    fn test_variants_train_end_to_end() {
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let data = Dataset::stripes(2, 12, &mut rng).unwrap();
        let (training, validation) = data.split(8);

        for kind in [TreeKind::Composite, TreeKind::Decomposition] {
            let config = TrainConfig::quick().with_tree(kind).with_seed(8);
            let mut trainer = Trainer::new(config, 4, StateVectorSimulator::new()).unwrap();
            let result = trainer.train(&training, &validation).unwrap();

            assert_eq!(result.kind, kind);
            assert_eq!(result.params.len(), kind.param_count(4));
            assert_eq!(result.history.len(), 2);
        }
    }

    #[test]
    fn test_config_from_json_drives_trainer() {
        let json = r#"{
            "batch_size": 4, "num_epoch": 1,
            "a": 0.2, "A": 0.0, "s": 0.101, "b": 0.5, "t": 0.602,
            "gamma": 0.5, "lmda": 0.2, "eta": 1.0,
            "num_samples": 0, "seed": 5, "tree": "decomposition"
        }"#;
        let config = TrainConfig::from_json(json).unwrap();
        assert_eq!(config.tree, TreeKind::Decomposition);

        let trainer = Trainer::new(config, 8, StateVectorSimulator::new()).unwrap();
        assert_eq!(trainer.params().len(), 7 * 24);
        assert_eq!(trainer.tree().circuit().count_2q(), 7 * 3);
    }
}
