//! Simulator contract
//!
//! Gantree: L4_Backend → SimulatorTrait
//!
//! A simulator turns one circuit plus a batch of per-image bindings into
//! readout-qubit class probabilities, either exactly (`reps = 0`) or from
//! `reps` sampled measurements.

use qtree_core::{Circuit, ClassProbabilities, ParameterBinding, QtreeError, QtreeResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Evaluation Mode
// ============================================================================

/// How class probabilities are obtained
/// Gantree: EvaluationMode // 정확/샘플링
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationMode {
    /// Readout marginal of the final state
    Exact,
    /// Frequencies over repeated measurements
    Sampled {
        /// Measurements per image
        shots: u64,
    },
}

impl EvaluationMode {
    /// Mode for a repetition count, `0` meaning exact
    pub fn from_reps(reps: u64) -> Self {
        if reps == 0 {
            EvaluationMode::Exact
        } else {
            EvaluationMode::Sampled { shots: reps }
        }
    }

    /// Repetition count, `0` for exact
    pub fn reps(&self) -> u64 {
        match self {
            EvaluationMode::Exact => 0,
            EvaluationMode::Sampled { shots } => *shots,
        }
    }

    /// Check if exact
    pub fn is_exact(&self) -> bool {
        matches!(self, EvaluationMode::Exact)
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationMode::Exact => write!(f, "exact"),
            EvaluationMode::Sampled { shots } => write!(f, "sampled({} shots)", shots),
        }
    }
}

// ============================================================================
// Readout Counts
// ============================================================================

/// Measurement tallies of the readout qubit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadoutCounts {
    /// Outcomes `0`
    pub zeros: u64,
    /// Outcomes `1`
    pub ones: u64,
}

impl ReadoutCounts {
    /// Total shots
    pub fn total(&self) -> u64 {
        self.zeros + self.ones
    }

    /// Record one outcome
    pub fn record(&mut self, outcome: bool) {
        if outcome {
            self.ones += 1;
        } else {
            self.zeros += 1;
        }
    }

    /// Empirical `[p(0), p(1)]`
    /// Gantree: probabilities(&self) -> ClassProbabilities // count / reps
    pub fn probabilities(&self) -> ClassProbabilities {
        let total = self.total();
        if total == 0 {
            return [0.0, 0.0];
        }
        [
            self.zeros as f64 / total as f64,
            self.ones as f64 / total as f64,
        ]
    }
}

// ============================================================================
// Simulator Trait
// ============================================================================

/// Quantum simulator consumed by the classifier
/// Gantree: Simulator // 시뮬레이터 인터페이스
pub trait Simulator: Send + Sync {
    /// Simulator name
    fn name(&self) -> &str;

    /// Largest register accepted
    fn max_qubits(&self) -> usize;

    /// Class probabilities of `circuit` for every binding
    /// Gantree: evaluate(circuit, bindings, reps) -> Result<Vec<[f64; 2]>>
    fn evaluate(
        &self,
        circuit: &Circuit,
        bindings: &[ParameterBinding],
        reps: u64,
    ) -> QtreeResult<Vec<ClassProbabilities>>;

    /// Class probabilities for a single binding
    fn evaluate_one(
        &self,
        circuit: &Circuit,
        binding: &ParameterBinding,
        reps: u64,
    ) -> QtreeResult<ClassProbabilities> {
        self.evaluate(circuit, std::slice::from_ref(binding), reps)?
            .pop()
            .ok_or_else(|| QtreeError::SimulationError(format!("{} returned no result", self.name())))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_mode() {
        assert_eq!(EvaluationMode::from_reps(0), EvaluationMode::Exact);
        assert_eq!(
            EvaluationMode::from_reps(500),
            EvaluationMode::Sampled { shots: 500 }
        );
        assert_eq!(EvaluationMode::from_reps(500).reps(), 500);
        assert!(EvaluationMode::Exact.is_exact());
        assert_eq!(EvaluationMode::from_reps(8).to_string(), "sampled(8 shots)");
    }

    #[test]
    fn test_readout_counts() {
        let mut counts = ReadoutCounts::default();
        for outcome in [false, false, false, true] {
            counts.record(outcome);
        }

        assert_eq!(counts.total(), 4);
        assert_eq!(counts.probabilities(), [0.75, 0.25]);
        assert_eq!(ReadoutCounts::default().probabilities(), [0.0, 0.0]);
    }
}
