//! Training loop
//!
//! Gantree: L5_Train → Trainer
//!
//! Each epoch walks the training set in consecutive batches and takes one
//! SPSA step per batch, then scores the validation set. The loop always
//! runs `num_epoch` epochs.

use crate::config::TrainConfig;
use crate::dataset::{DataSource, Sample};
use crate::evaluator;
use crate::loss::MarginLoss;
use crate::spsa::{SpsaOptimizer, SpsaStep};
use log::{debug, info};
use qtree_backend::Simulator;
use qtree_core::{
    predicted_label, AnyTree, ClassProbabilities, Label, ParamVec, QtreeError, QtreeResult,
    TreeCircuit, TreeKind,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// Results
// ============================================================================

/// Summary of one epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// Epoch index
    pub epoch: usize,

    /// Perturbation size used in this epoch
    pub epsilon: f64,

    /// Learning rate used in this epoch
    pub learning_rate: f64,

    /// Mean of the probe losses over the epoch's steps
    pub mean_loss: f64,

    /// Validation accuracy after the epoch (%)
    pub validation_accuracy: f64,
}

/// Training result
/// Gantree: TrainResult // 학습 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainResult {
    /// Tree variant the parameters belong to
    pub kind: TreeKind,

    /// Final parameters
    pub params: ParamVec,

    /// Per-epoch history
    pub history: Vec<EpochRecord>,

    /// Validation accuracy after the last epoch (%)
    pub final_accuracy: f64,
}

impl TrainResult {
    /// Highest validation accuracy seen
    pub fn best_accuracy(&self) -> f64 {
        self.history
            .iter()
            .map(|r| r.validation_accuracy)
            .fold(0.0, f64::max)
    }

    /// Mean loss of the last epoch
    pub fn final_loss(&self) -> Option<f64> {
        self.history.last().map(|r| r.mean_loss)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> QtreeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Trainer
// ============================================================================

/// Tree classifier trained with SPSA
/// Gantree: Trainer // 학습 루프
pub struct Trainer<S: Simulator> {
    config: TrainConfig,
    simulator: S,
    tree: AnyTree,
    loss: MarginLoss,
    optimizer: SpsaOptimizer,
    params: ParamVec,
    velocity: ParamVec,
}

impl<S: Simulator> Trainer<S> {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Trainer for `num_pixels`-pixel images with random starting parameters.
    /// The seeded generator draws the initial parameters first and then
    /// the SPSA perturbations.
    pub fn new(config: TrainConfig, num_pixels: usize, simulator: S) -> QtreeResult<Self> {
        config.check()?;
        let tree = AnyTree::new(config.tree, num_pixels)?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let params = config.tree.init_params(num_pixels, &mut rng)?;
        let velocity = vec![0.0; params.len()];

        info!(
            "trainer: {} tree over {} pixels, {} parameters, simulator {}",
            config.tree,
            num_pixels,
            params.len(),
            simulator.name()
        );

        Ok(Self {
            loss: MarginLoss::from_config(&config),
            optimizer: SpsaOptimizer::with_rng(&config, rng),
            config,
            simulator,
            tree,
            params,
            velocity,
        })
    }

    /// Replace the parameters and reset the velocity
    pub fn with_params(mut self, params: ParamVec) -> QtreeResult<Self> {
        let expected = self.tree.param_count();
        if params.len() != expected {
            return Err(QtreeError::ParamLengthMismatch {
                expected,
                actual: params.len(),
            });
        }
        self.velocity = vec![0.0; params.len()];
        self.params = params;
        Ok(self)
    }

    // ========================================================================
    // Inference
    // ========================================================================

    /// Class probabilities of each sample under the current parameters
    pub fn probabilities(&mut self, samples: &[Sample]) -> QtreeResult<Vec<ClassProbabilities>> {
        forward(
            &mut self.tree,
            &self.simulator,
            &self.params,
            samples.iter().map(|s| s.pixels.as_slice()),
            self.config.num_samples,
        )
    }

    /// Predicted label of one image
    /// Gantree: predict(pixels) -> Result<Label> // argmax
    pub fn predict(&mut self, pixels: &[f64]) -> QtreeResult<Label> {
        let probs = forward(
            &mut self.tree,
            &self.simulator,
            &self.params,
            std::iter::once(pixels),
            self.config.num_samples,
        )?;
        probs
            .first()
            .map(predicted_label)
            .ok_or_else(|| QtreeError::SimulationError("no probabilities returned".to_string()))
    }

    /// Margin loss of a batch under the current parameters
    pub fn batch_loss(&mut self, samples: &[Sample]) -> QtreeResult<f64> {
        let probs = self.probabilities(samples)?;
        let labels: Vec<Label> = samples.iter().map(|s| s.label).collect();
        self.loss.batch_loss(&probs, &labels)
    }

    /// Accuracy (%) on `samples`; an empty set scores 0.0
    pub fn accuracy(&mut self, samples: &[Sample]) -> QtreeResult<f64> {
        if samples.is_empty() {
            return evaluator::accuracy(&[], &[]);
        }
        let probs = self.probabilities(samples)?;
        let labels: Vec<Label> = samples.iter().map(|s| s.label).collect();
        evaluator::accuracy(&probs, &labels)
    }

    // ========================================================================
    // Training
    // ========================================================================

    /// One SPSA step on `batch` at epoch `epoch`
    /// Gantree: step(batch, k) -> Result<SpsaStep> // 배치 1회 갱신
    pub fn step(&mut self, batch: &[Sample], epoch: usize) -> QtreeResult<SpsaStep> {
        let labels: Vec<Label> = batch.iter().map(|s| s.label).collect();
        let Self {
            config,
            simulator,
            tree,
            loss,
            optimizer,
            params,
            velocity,
        } = self;
        let reps = config.num_samples;

        optimizer.step(params, velocity, epoch, |p: &[f64]| {
            let probs = forward(
                tree,
                &*simulator,
                p,
                batch.iter().map(|s| s.pixels.as_slice()),
                reps,
            )?;
            loss.batch_loss(&probs, &labels)
        })
    }

    /// Run `num_epoch` epochs and score `validation` after each
    /// Gantree: train(training, validation) -> Result<TrainResult> // 메인 루프
    pub fn train<T, V>(&mut self, training: &T, validation: &V) -> QtreeResult<TrainResult>
    where
        T: DataSource + ?Sized,
        V: DataSource + ?Sized,
    {
        let num_pixels = self.tree.num_pixels();
        for source in [training.num_pixels(), validation.num_pixels()] {
            if source != num_pixels {
                return Err(QtreeError::PixelLengthMismatch {
                    expected: num_pixels,
                    actual: source,
                });
            }
        }
        if training.is_empty() {
            return Err(QtreeError::EmptyBatch);
        }

        let batch_size = self.config.batch_size;
        let mut history = Vec::with_capacity(self.config.num_epoch);

        for epoch in 0..self.config.num_epoch {
            let mut total = 0.0;
            let mut steps = 0;
            for (i, batch) in training.samples().chunks(batch_size).enumerate() {
                let step = self.step(batch, epoch)?;
                debug!("epoch {} batch {}: mean probe loss {:.6}", epoch, i, step.mean_loss());
                total += step.mean_loss();
                steps += 1;
            }

            let record = EpochRecord {
                epoch,
                epsilon: self.config.epsilon(epoch),
                learning_rate: self.config.learning_rate(epoch),
                mean_loss: total / steps as f64,
                validation_accuracy: self.accuracy(validation.samples())?,
            };
            info!(
                "epoch {}/{}: loss={:.6}, accuracy={:.2}%, epsilon={:.4}, lr={:.4}",
                epoch + 1,
                self.config.num_epoch,
                record.mean_loss,
                record.validation_accuracy,
                record.epsilon,
                record.learning_rate
            );
            history.push(record);
        }

        let final_accuracy = history
            .last()
            .map(|r| r.validation_accuracy)
            .unwrap_or(0.0);

        Ok(TrainResult {
            kind: self.config.tree,
            params: self.params.clone(),
            history,
            final_accuracy,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current parameters
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Current velocity
    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    /// Configuration
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Simulator
    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    /// Tree circuit
    pub fn tree(&self) -> &AnyTree {
        &self.tree
    }
}

/// Build the tree for `params`, bind every image and evaluate the batch
fn forward<'a, S, I>(
    tree: &mut AnyTree,
    simulator: &S,
    params: &[f64],
    images: I,
    reps: u64,
) -> QtreeResult<Vec<ClassProbabilities>>
where
    S: Simulator + ?Sized,
    I: IntoIterator<Item = &'a [f64]>,
{
    tree.build(params)?;
    let bindings = images
        .into_iter()
        .map(|pixels| tree.bind(pixels))
        .collect::<QtreeResult<Vec<_>>>()?;
    simulator.evaluate(tree.circuit(), &bindings, reps)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use qtree_backend::StateVectorSimulator;

    fn stripes(count: usize, seed: u64) -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Dataset::stripes(2, count, &mut rng).unwrap()
    }

    fn trainer(config: TrainConfig) -> Trainer<StateVectorSimulator> {
        Trainer::new(config, 4, StateVectorSimulator::new().with_seed(5)).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = TrainConfig::default().with_batch_size(0);
        let err = Trainer::new(config, 4, StateVectorSimulator::new())
            .err()
            .unwrap();
        assert!(matches!(err, QtreeError::InvalidConfig(_)));

        let err = Trainer::new(TrainConfig::default(), 5, StateVectorSimulator::new())
            .err()
            .unwrap();
        assert!(matches!(err, QtreeError::InvalidPixelCount(5)));
    }

    #[test]
    fn test_param_counts() {
        let composite = trainer(TrainConfig::quick().with_seed(1));
        assert_eq!(composite.params().len(), 48);

        let decomposition = trainer(
            TrainConfig::quick()
                .with_seed(1)
                .with_tree(TreeKind::Decomposition),
        );
        assert_eq!(decomposition.params().len(), 72);
        assert!(decomposition.velocity().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_identity_params_read_first_pixel() {
        let mut t = trainer(TrainConfig::quick().with_seed(1))
            .with_params(vec![0.0; 48])
            .unwrap();

        assert_eq!(t.predict(&[0.9, 0.0, 0.0, 0.0]).unwrap(), 1);
        assert_eq!(t.predict(&[0.1, 1.0, 1.0, 1.0]).unwrap(), 0);

        let samples = vec![
            Sample::new(vec![1.0, 0.0, 0.0, 0.0], 1),
            Sample::new(vec![0.0, 1.0, 1.0, 1.0], 0),
        ];
        assert_eq!(t.accuracy(&samples).unwrap(), 100.0);
        assert!(t.batch_loss(&samples).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_with_params_checks_length() {
        let err = trainer(TrainConfig::quick().with_seed(1))
            .with_params(vec![0.0; 47])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            QtreeError::ParamLengthMismatch { expected: 48, actual: 47 }
        ));
    }

    #[test]
    fn test_step_moves_params() {
        let mut t = trainer(TrainConfig::quick().with_seed(3));
        let data = stripes(4, 0);
        let before = t.params().to_vec();

        let step = t.step(data.samples(), 0).unwrap();
        assert!(step.loss_plus.is_finite() && step.loss_minus.is_finite());
        assert_eq!(step.epsilon, t.config().epsilon(0));
        if step.loss_plus != step.loss_minus {
            assert_ne!(t.params(), before.as_slice());
        }
    }

    #[test]
    fn test_short_training_run() {
        let data = stripes(24, 10);
        let (training, validation) = data.split(16);
        let mut t = trainer(TrainConfig::quick().with_seed(42));

        let result = t.train(&training, &validation).unwrap();
        assert_eq!(result.kind, TreeKind::Composite);
        assert_eq!(result.history.len(), 2);
        assert_eq!(result.params, t.params());
        assert_eq!(result.final_accuracy, result.history[1].validation_accuracy);
        for record in &result.history {
            assert!(record.mean_loss.is_finite() && record.mean_loss >= 0.0);
            assert!((0.0..=100.0).contains(&record.validation_accuracy));
        }
        assert!(result.best_accuracy() >= result.final_accuracy);
        assert!(result.to_json().unwrap().contains("\"history\""));
    }

    #[test]
    fn test_training_is_reproducible() {
        let data = stripes(12, 4);
        let (training, validation) = data.split(8);
        let config = TrainConfig::quick()
            .with_seed(9)
            .with_tree(TreeKind::Decomposition);

        let a = trainer(config.clone()).train(&training, &validation).unwrap();
        let b = trainer(config).train(&training, &validation).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sampled_training() {
        let data = stripes(8, 2);
        let (training, validation) = data.split(4);
        let mut t = trainer(
            TrainConfig::quick()
                .with_seed(6)
                .with_epochs(1)
                .with_num_samples(64),
        );

        let result = t.train(&training, &validation).unwrap();
        assert_eq!(result.history.len(), 1);
        assert!(result.final_loss().unwrap().is_finite());
    }

    #[test]
    fn test_empty_validation_scores_zero() {
        let data = stripes(4, 1);
        let (training, validation) = data.split(4);
        let mut t = trainer(TrainConfig::quick().with_seed(2).with_epochs(1));

        let result = t.train(&training, &validation).unwrap();
        assert_eq!(result.final_accuracy, 0.0);
    }

    #[test]
    fn test_train_rejects_mismatched_data() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let wide = Dataset::stripes(4, 4, &mut rng).unwrap();
        let mut t = trainer(TrainConfig::quick().with_seed(2));

        assert!(matches!(
            t.train(&wide, &wide),
            Err(QtreeError::PixelLengthMismatch { expected: 4, actual: 16 })
        ));

        let empty = Dataset::new(4).unwrap();
        assert!(matches!(
            t.train(&empty, &empty),
            Err(QtreeError::EmptyBatch)
        ));
    }
}
