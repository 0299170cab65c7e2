//! Constants for QTREE
//!
//! Gantree: L0_Foundation → Constants
//!
//! Tree layout, numerical tolerances and default training hyperparameters.

// ============================================================================
// Tree Constants
// Gantree: tree // 트리 상수
// ============================================================================

pub mod tree {
    //! Tree layout constants

    /// Readout (root) qubit
    /// Gantree: READOUT_QUBIT: usize = 0
    pub const READOUT_QUBIT: usize = 0;

    /// Number of class labels
    pub const NUM_CLASSES: usize = 2;

    /// Generator entries per composite node (4 diagonal + 6 complex)
    /// Gantree: COMPOSITE_NODE_PARAMS: usize = 16
    pub const COMPOSITE_NODE_PARAMS: usize = 16;

    /// Angles per single-qubit ZYZ triple
    pub const ZYZ_PARAMS: usize = 3;

    /// Single-qubit unitaries per decomposed node (4 layers x 2 qubits)
    pub const SINGLE_QUBIT_UNITARIES_PER_NODE: usize = 8;

    /// Entangling gates per decomposed node
    pub const CNOTS_PER_NODE: usize = 3;

    /// Angles per decomposed node
    /// Gantree: DECOMPOSED_NODE_PARAMS: usize = 24
    pub const DECOMPOSED_NODE_PARAMS: usize = SINGLE_QUBIT_UNITARIES_PER_NODE * ZYZ_PARAMS;

    /// Symbol prefix for encoder slots
    pub const PIXEL_SYMBOL_PREFIX: &str = "pixel";

    /// Composite parameter count for a tree over `num_pixels` qubits
    #[inline]
    pub const fn composite_param_count(num_pixels: usize) -> usize {
        num_pixels.saturating_sub(1) * COMPOSITE_NODE_PARAMS
    }

    /// Decomposition parameter count for a tree over `num_pixels` qubits
    #[inline]
    pub const fn decomposed_param_count(num_pixels: usize) -> usize {
        num_pixels.saturating_sub(1) * DECOMPOSED_NODE_PARAMS
    }
}

// ============================================================================
// Numerical Constants
// Gantree: numerics // 수치 상수
// ============================================================================

pub mod numerics {
    //! Tolerances for matrix algebra

    /// Maximum entry-wise deviation of U·Uᴴ from identity
    /// Gantree: UNITARY_TOLERANCE: f64 = 1e-9
    pub const UNITARY_TOLERANCE: f64 = 1e-9;

    /// Tolerance accepted on user-supplied targets for decomposition
    pub const TARGET_UNITARY_TOLERANCE: f64 = 1e-8;

    /// Minimum phase-insensitive fidelity a decomposition must reach
    pub const DECOMPOSITION_FIDELITY: f64 = 1.0 - 1e-9;

    /// Convergence threshold of the symmetric eigensolver
    pub const EIGEN_EPS: f64 = 1e-15;

    /// Iteration cap of the symmetric eigensolver
    pub const EIGEN_MAX_ITER: usize = 10_000;

    /// Residual accepted when checking a simultaneous diagonalization
    pub const DIAGONAL_TOLERANCE: f64 = 1e-9;

    /// Smallest block determinant root accepted when splitting `a ⊗ b`
    pub const TENSOR_FACTOR_TOLERANCE: f64 = 1e-12;
}

// ============================================================================
// SPSA Defaults
// Gantree: spsa // SPSA 기본값
// ============================================================================

pub mod spsa {
    //! Default SPSA hyperparameters

    /// Perturbation scale `a`
    pub const A: f64 = 0.2;

    /// Perturbation stability offset `A`
    pub const BIG_A: f64 = 0.0;

    /// Perturbation decay exponent `s`
    pub const S: f64 = 0.101;

    /// Learning-rate scale `b`
    pub const B: f64 = 0.5;

    /// Learning-rate decay exponent `t`
    pub const T: f64 = 0.602;

    /// Momentum decay `gamma`
    pub const GAMMA: f64 = 0.5;

    /// Loss margin `lambda`
    pub const LAMBDA: f64 = 0.2;

    /// Loss exponent `eta`
    pub const ETA: f64 = 1.0;

    /// Default batch size
    pub const BATCH_SIZE: usize = 16;

    /// Default number of epochs
    pub const NUM_EPOCH: usize = 10;

    /// Perturbation size at epoch `k`: `a / (k + 1 + A)^s`
    #[inline]
    pub fn epsilon(a: f64, big_a: f64, s: f64, k: usize) -> f64 {
        a / (k as f64 + 1.0 + big_a).powf(s)
    }

    /// Learning rate at epoch `k`: `b / (k + 1)^t`
    #[inline]
    pub fn learning_rate(b: f64, t: f64, k: usize) -> f64 {
        b / (k as f64 + 1.0).powf(t)
    }
}

// ============================================================================
// Simulation Constants
// ============================================================================

pub mod sim {
    //! Simulator limits

    /// Largest register the state-vector simulator accepts by default
    pub const DEFAULT_MAX_QUBITS: usize = 20;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_param_counts() {
        assert_eq!(tree::composite_param_count(4), 48);
        assert_eq!(tree::decomposed_param_count(4), 72);
        assert_eq!(tree::composite_param_count(16), 240);
        assert_eq!(tree::decomposed_param_count(16), 360);
    }

    #[test]
    fn test_schedules() {
        // k = 0 with A = 0 gives the raw coefficients
        assert_relative_eq!(spsa::epsilon(0.2, 0.0, 0.101, 0), 0.2);
        assert_relative_eq!(spsa::learning_rate(0.5, 0.602, 0), 0.5);

        // a / (k + 1 + A)^s with k = 3, A = 4, s = 1
        assert_relative_eq!(spsa::epsilon(1.0, 4.0, 1.0, 3), 0.125);
        // b / (k + 1)^t with k = 3, t = 2
        assert_relative_eq!(spsa::learning_rate(1.0, 2.0, 3), 1.0 / 16.0);
    }

    #[test]
    fn test_schedules_decay() {
        let e: Vec<f64> = (0..5).map(|k| spsa::epsilon(spsa::A, 1.0, spsa::S, k)).collect();
        assert!(e.windows(2).all(|w| w[1] < w[0]));

        let lr: Vec<f64> = (0..5).map(|k| spsa::learning_rate(spsa::B, spsa::T, k)).collect();
        assert!(lr.windows(2).all(|w| w[1] < w[0]));
    }
}
