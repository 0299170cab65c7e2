//! Circuit builder for QTREE
//!
//! Gantree: L1_Circuit → CircuitBuilder
//!
//! Fluent construction of tree circuits. Symbolic rotations declare their
//! slot on the fly; the first invalid gate is remembered and reported by
//! [`CircuitBuilder::build`].

use crate::circuit::Circuit;
use crate::error::{QtreeError, QtreeResult};
use crate::gate::Gate;
use crate::linalg::Matrix4c;
use crate::types::{Angle, Param, QubitId};

/// Fluent circuit builder (consuming self pattern)
/// Gantree: CircuitBuilder // 빌더 패턴
pub struct CircuitBuilder {
    /// Internal circuit being built
    /// Gantree: circuit: Circuit // 내부 회로
    circuit: Circuit,

    /// First error raised while adding gates
    error: Option<QtreeError>,
}

impl CircuitBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a new circuit builder
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits),
            error: None,
        }
    }

    /// Create with circuit name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            circuit: Circuit::with_name(num_qubits, name),
            error: None,
        }
    }

    fn push(mut self, gate: Gate) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.circuit.add_gate(gate) {
                self.error = Some(err);
            }
        }
        self
    }

    fn symbol(&mut self, name: impl Into<String>) -> Param {
        Param::Symbol(self.circuit.declare_symbol(name))
    }

    // ========================================================================
    // Symbolic Rotations
    // ========================================================================

    /// Add `Y^x` bound to a new symbol
    /// Gantree: ypow_sym(self, q, name) -> Self // 픽셀 인코딩
    pub fn ypow_sym(mut self, qubit: QubitId, name: impl Into<String>) -> Self {
        let param = self.symbol(name);
        self.push(Gate::YPow(qubit, param))
    }

    /// Add Ry bound to a new symbol
    pub fn ry_sym(mut self, qubit: QubitId, name: impl Into<String>) -> Self {
        let param = self.symbol(name);
        self.push(Gate::Ry(qubit, param))
    }

    /// Add Rz bound to a new symbol
    pub fn rz_sym(mut self, qubit: QubitId, name: impl Into<String>) -> Self {
        let param = self.symbol(name);
        self.push(Gate::Rz(qubit, param))
    }

    /// Add the ZYZ triple `Rz(z1) Ry(y) Rz(z2)` in time order, with symbols
    /// `{prefix}_z1`, `{prefix}_y`, `{prefix}_z2`
    /// Gantree: zyz_sym(self, q, prefix) -> Self // ZYZ 삼중항
    pub fn zyz_sym(self, qubit: QubitId, prefix: &str) -> Self {
        self.rz_sym(qubit, format!("{}_z1", prefix))
            .ry_sym(qubit, format!("{}_y", prefix))
            .rz_sym(qubit, format!("{}_z2", prefix))
    }

    // ========================================================================
    // Fixed Gates
    // ========================================================================

    /// Add Ry rotation
    /// Gantree: ry(self, q, a) -> Self // Ry 추가
    pub fn ry(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(Gate::Ry(qubit, Param::Fixed(angle)))
    }

    /// Add Rz rotation
    /// Gantree: rz(self, q, a) -> Self // Rz 추가
    pub fn rz(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(Gate::Rz(qubit, Param::Fixed(angle)))
    }

    /// Add CNOT gate
    /// Gantree: cnot(self, c, t) -> Self // CNOT 추가
    pub fn cnot(self, control: QubitId, target: QubitId) -> Self {
        self.push(Gate::Cnot(control, target))
    }

    /// Add a dense two-qubit unitary; `first` is the most significant index
    pub fn unitary(self, first: QubitId, second: QubitId, matrix: Matrix4c) -> Self {
        self.push(Gate::Unitary(first, second, Box::new(matrix)))
    }

    /// Add measurement
    /// Gantree: measure(self, q) -> Self // 측정 추가
    pub fn measure(self, qubit: QubitId) -> Self {
        self.push(Gate::Measure(qubit))
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Finish the circuit, reporting the first invalid gate
    /// Gantree: build(self) -> Result<Circuit> // 빌드
    pub fn build(self) -> QtreeResult<Circuit> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.circuit),
        }
    }

    /// Get reference to the circuit being built
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }
}

// ============================================================================
// Tests
// ============================================================================
