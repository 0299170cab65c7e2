//! Training configuration
//!
//! Gantree: L5_Train → TrainConfig
//!
//! Hyperparameters of the SPSA training loop. Serialized field names follow
//! the conventional SPSA notation (`a`, `A`, `s`, `b`, `t`).

use qtree_core::{spsa, QtreeError, QtreeResult, TreeKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Training configuration
/// Gantree: TrainConfig // 학습 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Images per SPSA step
    /// Gantree: batch_size: usize // 배치 크기 (16)
    pub batch_size: usize,

    /// Passes over the training set
    /// Gantree: num_epoch: usize // 에폭 수 (10)
    pub num_epoch: usize,

    /// Perturbation scale
    pub a: f64,

    /// Perturbation stability offset
    #[serde(rename = "A")]
    pub big_a: f64,

    /// Perturbation decay exponent
    pub s: f64,

    /// Learning-rate scale
    pub b: f64,

    /// Learning-rate decay exponent
    pub t: f64,

    /// Momentum decay in [0, 1)
    /// Gantree: gamma: f64 // 모멘텀
    pub gamma: f64,

    /// Loss margin
    /// Gantree: lmda: f64 // 마진 λ
    pub lmda: f64,

    /// Loss exponent
    /// Gantree: eta: f64 // 지수 η
    pub eta: f64,

    /// Shots per image, `0` for exact simulation
    /// Gantree: num_samples: u64 // 0 = exact
    pub num_samples: u64,

    /// Random seed for initial parameters and perturbations
    /// Gantree: seed: Option<u64> // 시드
    pub seed: Option<u64>,

    /// Tree variant
    /// Gantree: tree: TreeKind // composite/decomposition
    pub tree: TreeKind,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            batch_size: spsa::BATCH_SIZE,
            num_epoch: spsa::NUM_EPOCH,
            a: spsa::A,
            big_a: spsa::BIG_A,
            s: spsa::S,
            b: spsa::B,
            t: spsa::T,
            gamma: spsa::GAMMA,
            lmda: spsa::LAMBDA,
            eta: spsa::ETA,
            num_samples: 0,
            seed: None,
            tree: TreeKind::Composite,
        }
    }
}

impl TrainConfig {
    // ========================================================================
    // Presets
    // ========================================================================

    /// Small batches and few epochs, for smoke runs
    pub fn quick() -> Self {
        Self {
            batch_size: 4,
            num_epoch: 2,
            ..Self::default()
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set number of epochs
    pub fn with_epochs(mut self, num_epoch: usize) -> Self {
        self.num_epoch = num_epoch;
        self
    }

    /// Set perturbation schedule `a / (k + 1 + A)^s`
    pub fn with_perturbation(mut self, a: f64, big_a: f64, s: f64) -> Self {
        self.a = a;
        self.big_a = big_a;
        self.s = s;
        self
    }

    /// Set learning-rate schedule `b / (k + 1)^t`
    pub fn with_learning_rate(mut self, b: f64, t: f64) -> Self {
        self.b = b;
        self.t = t;
        self
    }

    /// Set momentum decay
    pub fn with_momentum(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set loss margin and exponent
    pub fn with_loss(mut self, lmda: f64, eta: f64) -> Self {
        self.lmda = lmda;
        self.eta = eta;
        self
    }

    /// Set shots per image (`0` = exact)
    pub fn with_num_samples(mut self, num_samples: u64) -> Self {
        self.num_samples = num_samples;
        self
    }

    /// Set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set tree variant
    pub fn with_tree(mut self, tree: TreeKind) -> Self {
        self.tree = tree;
        self
    }

    // ========================================================================
    // Derived Values
    // ========================================================================

    /// Perturbation size at epoch `k`
    /// Gantree: epsilon(k) -> f64 // a/(k+1+A)^s
    pub fn epsilon(&self, k: usize) -> f64 {
        spsa::epsilon(self.a, self.big_a, self.s, k)
    }

    /// Learning rate at epoch `k`
    /// Gantree: learning_rate(k) -> f64 // b/(k+1)^t
    pub fn learning_rate(&self, k: usize) -> f64 {
        spsa::learning_rate(self.b, self.t, k)
    }

    /// Check if simulation is exact
    pub fn is_exact(&self) -> bool {
        self.num_samples == 0
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    /// Gantree: validate(&self) -> Result // 검증
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be > 0".to_string());
        }

        if self.num_epoch == 0 {
            return Err("num_epoch must be > 0".to_string());
        }

        if !(self.a > 0.0) {
            return Err(format!("a must be > 0, got {}", self.a));
        }

        if !(self.big_a >= 0.0) || !(self.s >= 0.0) || !(self.t >= 0.0) {
            return Err("A, s and t must be >= 0".to_string());
        }

        if !(self.b > 0.0) {
            return Err(format!("b must be > 0, got {}", self.b));
        }

        if !(0.0..1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1), got {}", self.gamma));
        }

        if !(self.lmda >= 0.0) {
            return Err(format!("lmda must be >= 0, got {}", self.lmda));
        }

        if !(self.eta > 0.0) {
            return Err(format!("eta must be > 0, got {}", self.eta));
        }

        Ok(())
    }

    /// Validate, wrapping the message into a configuration error
    pub fn check(&self) -> QtreeResult<()> {
        self.validate().map_err(QtreeError::InvalidConfig)
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> QtreeResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> QtreeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for TrainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TrainConfig:")?;
        writeln!(f, "  Tree: {}", self.tree)?;
        writeln!(
            f,
            "  Batches: {} images x {} epochs",
            self.batch_size, self.num_epoch
        )?;
        writeln!(
            f,
            "  Perturbation: a={}, A={}, s={}",
            self.a, self.big_a, self.s
        )?;
        writeln!(f, "  Learning rate: b={}, t={}", self.b, self.t)?;
        writeln!(f, "  Momentum: {}", self.gamma)?;
        writeln!(f, "  Loss: lambda={}, eta={}", self.lmda, self.eta)?;
        if self.is_exact() {
            writeln!(f, "  Simulation: exact")?;
        } else {
            writeln!(f, "  Simulation: {} shots", self.num_samples)?;
        }
        if let Some(seed) = self.seed {
            writeln!(f, "  Seed: {}", seed)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
