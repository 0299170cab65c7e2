//! Quantum gate definitions for QTREE
//!
//! Gantree: L1_Circuit → Gate
//!
//! The gate set needed by tree classifiers: Y-power pixel encoding, Y and Z
//! rotations for decomposed nodes, CNOT, dense two-qubit unitaries for
//! composite nodes, and the terminal readout measurement.

use crate::error::QtreeResult;
use crate::linalg::{self, Matrix2c, Matrix4c};
use crate::types::{Param, ParameterBinding, QubitId, Slot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantum gate enumeration
/// Gantree: Gate // 게이트 enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    // ========================================================================
    // Single-Qubit Rotations
    // ========================================================================
    /// Y-power gate `Y^x`, rotation `Ry(πx)`
    /// Gantree: YPow(QubitId, Param) // 픽셀 인코딩
    YPow(QubitId, Param),

    /// Rotation around Y-axis
    /// Gantree: Ry(QubitId, Param) // Y 회전
    Ry(QubitId, Param),

    /// Rotation around Z-axis
    /// Gantree: Rz(QubitId, Param) // Z 회전
    Rz(QubitId, Param),

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================
    /// Controlled-NOT (control, target)
    /// Gantree: CNOT(QubitId, QubitId) // ctrl, tgt
    Cnot(QubitId, QubitId),

    /// Dense two-qubit unitary; the first qubit is the most significant
    /// index of the matrix
    /// Gantree: Unitary(QubitId, QubitId, Matrix4c) // 조밀 유니터리
    Unitary(QubitId, QubitId, Box<Matrix4c>),

    // ========================================================================
    // Measurement
    // ========================================================================
    /// Single qubit measurement
    /// Gantree: Measure(QubitId) // 단일 측정
    Measure(QubitId),
}

impl Gate {
    // ========================================================================
    // Gate Properties
    // ========================================================================

    /// Get qubits involved in this gate
    /// Gantree: qubits(&self) -> Vec<QubitId> // 관련 큐비트
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Gate::YPow(q, _) | Gate::Ry(q, _) | Gate::Rz(q, _) | Gate::Measure(q) => vec![*q],
            Gate::Cnot(a, b) | Gate::Unitary(a, b, _) => vec![*a, *b],
        }
    }

    /// Check if gate is single-qubit
    /// Gantree: is_single_qubit(&self) -> bool // 1Q 판별
    pub fn is_single_qubit(&self) -> bool {
        matches!(self, Gate::YPow(_, _) | Gate::Ry(_, _) | Gate::Rz(_, _))
    }

    /// Check if gate is two-qubit
    /// Gantree: is_two_qubit(&self) -> bool // 2Q 판별
    pub fn is_two_qubit(&self) -> bool {
        matches!(self, Gate::Cnot(_, _) | Gate::Unitary(_, _, _))
    }

    /// Check if gate is parameterized
    pub fn is_parameterized(&self) -> bool {
        self.is_single_qubit()
    }

    /// Check if gate is measurement
    pub fn is_measurement(&self) -> bool {
        matches!(self, Gate::Measure(_))
    }

    /// Rotation parameter, if any
    pub fn param(&self) -> Option<Param> {
        match self {
            Gate::YPow(_, p) | Gate::Ry(_, p) | Gate::Rz(_, p) => Some(*p),
            _ => None,
        }
    }

    /// Symbol slot the gate reads, if any
    pub fn slot(&self) -> Option<Slot> {
        self.param().and_then(|p| p.slot())
    }

    /// Get gate name
    pub fn name(&self) -> &'static str {
        match self {
            Gate::YPow(_, _) => "ypow",
            Gate::Ry(_, _) => "ry",
            Gate::Rz(_, _) => "rz",
            Gate::Cnot(_, _) => "cx",
            Gate::Unitary(_, _, _) => "unitary",
            Gate::Measure(_) => "measure",
        }
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    /// 2x2 matrix of a single-qubit gate under `binding`
    pub fn single_qubit_matrix(&self, binding: &ParameterBinding) -> QtreeResult<Option<Matrix2c>> {
        let matrix = match self {
            Gate::YPow(_, p) => linalg::ypow(p.resolve(binding)?),
            Gate::Ry(_, p) => linalg::ry(p.resolve(binding)?),
            Gate::Rz(_, p) => linalg::rz(p.resolve(binding)?),
            _ => return Ok(None),
        };
        Ok(Some(matrix))
    }

    /// 4x4 matrix of a two-qubit gate, first qubit most significant
    pub fn two_qubit_matrix(&self) -> Option<Matrix4c> {
        match self {
            Gate::Cnot(_, _) => Some(linalg::cnot()),
            Gate::Unitary(_, _, m) => Some(**m),
            _ => None,
        }
    }

    /// Render the gate with symbol names in place of slots
    pub fn describe(&self, symbols: &[String]) -> String {
        let param = |p: &Param| match p {
            Param::Fixed(v) => format!("{}", v),
            Param::Symbol(s) => symbols.get(*s).cloned().unwrap_or_else(|| format!("${}", s)),
        };
        match self {
            Gate::YPow(q, p) | Gate::Ry(q, p) | Gate::Rz(q, p) => {
                format!("{}({}) q[{}]", self.name(), param(p), q)
            }
            Gate::Cnot(a, b) | Gate::Unitary(a, b, _) => {
                format!("{} q[{}],q[{}]", self.name(), a, b)
            }
            Gate::Measure(q) => format!("measure q[{}]", q),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe(&[]))
    }
}

// ============================================================================
// Tests
// ============================================================================
