//! SPSA optimizer with momentum
//!
//! Gantree: L5_Train → SpsaOptimizer
//!
//! One step perturbs every parameter by `±epsilon` (independent Rademacher
//! signs), evaluates the loss on both sides and moves along the resulting
//! two-point gradient estimate:
//!
//! ```text
//! g_i      = (loss_plus - loss_minus) / (2 * perturbation_i)
//! velocity = gamma * velocity - learning_rate * g
//! params  += velocity
//! ```

use crate::config::TrainConfig;
use log::debug;
use qtree_core::{QtreeError, QtreeResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Outcome of one SPSA step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpsaStep {
    /// Perturbation size used
    pub epsilon: f64,

    /// Learning rate used
    pub learning_rate: f64,

    /// Loss at `params + perturbation`
    pub loss_plus: f64,

    /// Loss at `params - perturbation`
    pub loss_minus: f64,
}

impl SpsaStep {
    /// Average of the two probe losses
    pub fn mean_loss(&self) -> f64 {
        0.5 * (self.loss_plus + self.loss_minus)
    }
}

/// SPSA optimizer
/// Gantree: SpsaOptimizer // SPSA + 모멘텀
#[derive(Debug, Clone)]
pub struct SpsaOptimizer {
    a: f64,
    big_a: f64,
    s: f64,
    b: f64,
    t: f64,
    gamma: f64,

    /// Perturbation source
    rng: ChaCha8Rng,
}

impl SpsaOptimizer {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Optimizer with the schedules of `config`, seeded from `config.seed`
    pub fn new(config: &TrainConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Optimizer drawing perturbations from `rng`
    pub fn with_rng(config: &TrainConfig, rng: ChaCha8Rng) -> Self {
        Self {
            a: config.a,
            big_a: config.big_a,
            s: config.s,
            b: config.b,
            t: config.t,
            gamma: config.gamma,
            rng,
        }
    }

    // ========================================================================
    // Schedules
    // ========================================================================

    /// Perturbation size at epoch `k`
    pub fn epsilon(&self, k: usize) -> f64 {
        qtree_core::spsa::epsilon(self.a, self.big_a, self.s, k)
    }

    /// Learning rate at epoch `k`
    pub fn learning_rate(&self, k: usize) -> f64 {
        qtree_core::spsa::learning_rate(self.b, self.t, k)
    }

    // ========================================================================
    // Step
    // ========================================================================

    /// Draw one Rademacher perturbation of size `epsilon`
    fn perturbation(&mut self, len: usize, epsilon: f64) -> Vec<f64> {
        (0..len)
            .map(|_| if self.rng.gen::<bool>() { epsilon } else { -epsilon })
            .collect()
    }

    /// Perform one step, updating `params` and `velocity` in place
    /// Gantree: step(params, velocity, k, loss) -> Result<SpsaStep> // 2회 평가
    pub fn step<F>(
        &mut self,
        params: &mut [f64],
        velocity: &mut [f64],
        epoch: usize,
        mut loss: F,
    ) -> QtreeResult<SpsaStep>
    where
        F: FnMut(&[f64]) -> QtreeResult<f64>,
    {
        if velocity.len() != params.len() {
            return Err(QtreeError::ParamLengthMismatch {
                expected: params.len(),
                actual: velocity.len(),
            });
        }

        let epsilon = self.epsilon(epoch);
        let learning_rate = self.learning_rate(epoch);
        let delta = self.perturbation(params.len(), epsilon);

        let plus: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + d).collect();
        let minus: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p - d).collect();
        let loss_plus = loss(&plus)?;
        let loss_minus = loss(&minus)?;

        let diff = loss_plus - loss_minus;
        for ((p, v), d) in params.iter_mut().zip(velocity.iter_mut()).zip(&delta) {
            let gradient = diff / (2.0 * d);
            *v = self.gamma * *v - learning_rate * gradient;
            *p += *v;
        }

        debug!(
            "spsa step k={}: epsilon={:.4}, lr={:.4}, loss+={:.6}, loss-={:.6}",
            epoch, epsilon, learning_rate, loss_plus, loss_minus
        );

        Ok(SpsaStep {
            epsilon,
            learning_rate,
            loss_plus,
            loss_minus,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
