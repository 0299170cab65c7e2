//! Error types for QTREE
//!
//! Gantree: L0_Foundation → Errors
//!
//! Every failure in the workspace is one of four kinds: configuration,
//! numerical, simulation, or precondition. None of them is retried.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for QTREE
/// Gantree: QtreeError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QtreeError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Pixel count is not a power of two >= 2
    /// Gantree: InvalidPixelCount(usize) // 2의 거듭제곱
    #[error("Invalid pixel count {0}: must be a power of two >= 2")]
    InvalidPixelCount(usize),

    /// Parameter vector length does not match the tree variant
    /// Gantree: ParamLengthMismatch{{expected,actual}} // 파라미터 길이
    #[error("Parameter vector has length {actual}, expected {expected}")]
    ParamLengthMismatch { expected: usize, actual: usize },

    /// Image length does not match the number of pixels
    #[error("Image has {actual} pixels, expected {expected}")]
    PixelLengthMismatch { expected: usize, actual: usize },

    /// Pixel value outside [0, 1]
    #[error("Invalid pixel value {value} at index {index}: must be in range [0, 1]")]
    InvalidPixelValue { index: usize, value: f64 },

    /// Binding does not cover every symbol of the circuit
    #[error("Binding has {actual} values but circuit declares {expected} symbols")]
    BindingLengthMismatch { expected: usize, actual: usize },

    /// Gate on non-existent qubit
    #[error("Gate references qubit {qubit} but circuit has only {num_qubits} qubits")]
    GateQubitMismatch { qubit: usize, num_qubits: usize },

    /// Gate references an undeclared parameter slot
    #[error("Gate references parameter slot {slot} but circuit declares {num_slots}")]
    UnknownSlot { slot: usize, num_slots: usize },

    /// Two-qubit gate acting twice on the same qubit
    #[error("Two-qubit gate on ({0}, {1}): qubits must be different")]
    DuplicateQubit(usize, usize),

    /// Invalid hyperparameter configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Numerical Errors
    // ========================================================================
    /// Hermitian eigensolver did not converge
    /// Gantree: EigenDecompositionFailed // 고유분해 실패
    #[error("Eigendecomposition failed: {0}")]
    EigenDecompositionFailed(String),

    /// Matrix is not unitary within tolerance
    #[error("Matrix is not unitary: deviation {deviation:.3e} exceeds tolerance {tolerance:.3e}")]
    NonUnitary { deviation: f64, tolerance: f64 },

    /// Two-qubit decomposition could not reproduce the target
    #[error("Two-qubit decomposition failed: {0}")]
    DecompositionFailed(String),

    // ========================================================================
    // Simulation Errors
    // ========================================================================
    /// Failure reported by a simulator
    /// Gantree: SimulationError(String) // 시뮬레이터
    #[error("Simulation error: {0}")]
    SimulationError(String),

    // ========================================================================
    // Precondition Errors
    // ========================================================================
    /// Number of labels differs from number of probability rows
    #[error("Got {labels} labels for {probabilities} probability rows")]
    LabelMismatch { labels: usize, probabilities: usize },

    /// Label outside the binary label set
    #[error("Invalid label {0}: must be 0 or 1")]
    InvalidLabel(usize),

    /// Loss or accuracy requested on an empty batch
    #[error("Batch is empty")]
    EmptyBatch,

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),
}

/// Result type alias for QTREE operations
/// Gantree: QtreeResult<T> // type alias
pub type QtreeResult<T> = Result<T, QtreeError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QtreeError {
    fn from(err: serde_json::Error) -> Self {
        QtreeError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for QtreeError {
    fn from(err: std::io::Error) -> Self {
        QtreeError::FileError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl QtreeError {
    /// Check if error is a configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            QtreeError::InvalidPixelCount(_)
                | QtreeError::ParamLengthMismatch { .. }
                | QtreeError::PixelLengthMismatch { .. }
                | QtreeError::InvalidPixelValue { .. }
                | QtreeError::BindingLengthMismatch { .. }
                | QtreeError::GateQubitMismatch { .. }
                | QtreeError::UnknownSlot { .. }
                | QtreeError::DuplicateQubit(_, _)
                | QtreeError::InvalidConfig(_)
        )
    }

    /// Check if error is a numerical error
    pub fn is_numerical_error(&self) -> bool {
        matches!(
            self,
            QtreeError::EigenDecompositionFailed(_)
                | QtreeError::NonUnitary { .. }
                | QtreeError::DecompositionFailed(_)
        )
    }

    /// Check if error is a precondition violation
    pub fn is_precondition_error(&self) -> bool {
        matches!(
            self,
            QtreeError::LabelMismatch { .. } | QtreeError::InvalidLabel(_) | QtreeError::EmptyBatch
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
