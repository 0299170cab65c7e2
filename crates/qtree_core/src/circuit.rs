//! Quantum circuit structure for QTREE
//!
//! Gantree: L1_Circuit → Circuit
//!
//! A circuit owns its gate sequence and a symbol table mapping parameter
//! slots to logical names. Gates refer to slots; per-image values arrive
//! later as a [`ParameterBinding`].

use crate::error::{QtreeError, QtreeResult};
use crate::gate::Gate;
use crate::types::{ParameterBinding, QubitId, Slot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantum circuit
/// Gantree: Circuit // 회로 구조체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Number of qubits
    /// Gantree: num_qubits: usize // 큐비트 수
    num_qubits: usize,

    /// Gate sequence
    /// Gantree: gates: Vec<Gate> // 게이트 목록
    gates: Vec<Gate>,

    /// Slot → symbol name
    /// Gantree: symbols: Vec<String> // 심볼 테이블
    symbols: Vec<String>,

    /// Optional circuit name
    name: Option<String>,
}

impl Circuit {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a new empty circuit
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
            symbols: Vec::new(),
            name: None,
        }
    }

    /// Create a circuit with a name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(num_qubits)
        }
    }

    // ========================================================================
    // Basic Operations
    // ========================================================================

    /// Declare a symbol and return its slot
    /// Gantree: declare_symbol(&mut, name) -> Slot // 심볼 선언
    pub fn declare_symbol(&mut self, name: impl Into<String>) -> Slot {
        self.symbols.push(name.into());
        self.symbols.len() - 1
    }

    /// Add a gate to the circuit
    /// Gantree: add_gate(&mut, Gate) -> Result // 게이트 추가
    pub fn add_gate(&mut self, gate: Gate) -> QtreeResult<()> {
        let qubits = gate.qubits();
        for &qubit in &qubits {
            if qubit >= self.num_qubits {
                return Err(QtreeError::GateQubitMismatch {
                    qubit,
                    num_qubits: self.num_qubits,
                });
            }
        }
        if qubits.len() == 2 && qubits[0] == qubits[1] {
            return Err(QtreeError::DuplicateQubit(qubits[0], qubits[1]));
        }
        if let Some(slot) = gate.slot() {
            if slot >= self.symbols.len() {
                return Err(QtreeError::UnknownSlot {
                    slot,
                    num_slots: self.symbols.len(),
                });
            }
        }
        self.gates.push(gate);
        Ok(())
    }

    /// Add multiple gates
    pub fn add_gates(&mut self, gates: impl IntoIterator<Item = Gate>) -> QtreeResult<()> {
        for gate in gates {
            self.add_gate(gate)?;
        }
        Ok(())
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get gates
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Symbol names indexed by slot
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Number of declared slots
    pub fn num_slots(&self) -> usize {
        self.symbols.len()
    }

    /// Slot of a symbol name
    pub fn slot_of(&self, name: &str) -> Option<Slot> {
        self.symbols.iter().position(|s| s == name)
    }

    /// Get circuit name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set circuit name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Check if circuit is empty
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    // ========================================================================
    // Circuit Analysis
    // ========================================================================

    /// Calculate circuit depth (longest path)
    /// Gantree: depth(&self) -> usize // 깊이 계산
    pub fn depth(&self) -> usize {
        let mut qubit_depths = vec![0usize; self.num_qubits];

        for gate in &self.gates {
            let qubits = gate.qubits();
            let max_depth = qubits
                .iter()
                .filter_map(|&q| qubit_depths.get(q))
                .max()
                .copied()
                .unwrap_or(0);
            for &q in &qubits {
                qubit_depths[q] = max_depth + 1;
            }
        }

        qubit_depths.into_iter().max().unwrap_or(0)
    }

    /// Get total gate count
    /// Gantree: gate_count(&self) -> usize // 게이트 수
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Count single-qubit gates
    /// Gantree: count_1q(&self) -> usize // 1Q 수
    pub fn count_1q(&self) -> usize {
        self.gates.iter().filter(|g| g.is_single_qubit()).count()
    }

    /// Count two-qubit gates
    /// Gantree: count_2q(&self) -> usize // 2Q 수
    pub fn count_2q(&self) -> usize {
        self.gates.iter().filter(|g| g.is_two_qubit()).count()
    }

    /// Count measurement operations
    pub fn count_measurements(&self) -> usize {
        self.gates.iter().filter(|g| g.is_measurement()).count()
    }

    /// Count parameterized gates
    pub fn count_parameterized(&self) -> usize {
        self.gates.iter().filter(|g| g.is_parameterized()).count()
    }

    /// Qubits carrying a measurement, in gate order
    pub fn measured_qubits(&self) -> Vec<QubitId> {
        self.gates
            .iter()
            .filter_map(|g| match g {
                Gate::Measure(q) => Some(*q),
                _ => None,
            })
            .collect()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check that a binding supplies a value for every declared slot
    /// Gantree: validate_binding(&self, binding) -> Result // 바인딩 검증
    pub fn validate_binding(&self, binding: &ParameterBinding) -> QtreeResult<()> {
        if binding.len() != self.symbols.len() {
            return Err(QtreeError::BindingLengthMismatch {
                expected: self.symbols.len(),
                actual: binding.len(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Circuit({} qubits, {} gates, {} symbols)",
            self.num_qubits,
            self.gates.len(),
            self.symbols.len()
        )?;
        writeln!(f, "  Depth: {}", self.depth())?;
        writeln!(f, "  1Q gates: {}", self.count_1q())?;
        writeln!(f, "  2Q gates: {}", self.count_2q())?;
        for gate in &self.gates {
            writeln!(f, "  {}", gate.describe(&self.symbols))?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Param;

    #[test]
    fn test_circuit_new() {
        let circuit = Circuit::new(5);
        assert_eq!(circuit.num_qubits(), 5);
        assert!(circuit.is_empty());
        assert_eq!(circuit.num_slots(), 0);
    }

    #[test]
    fn test_add_gate() {
        let mut circuit = Circuit::new(3);
        let slot = circuit.declare_symbol("pixel_0");
        assert!(circuit.add_gate(Gate::YPow(0, Param::Symbol(slot))).is_ok());
        assert!(circuit.add_gate(Gate::Cnot(0, 1)).is_ok());
        assert_eq!(circuit.gate_count(), 2);
        assert_eq!(circuit.slot_of("pixel_0"), Some(0));
    }

    #[test]
    fn test_add_gate_rejects() {
        let mut circuit = Circuit::new(3);
        assert!(matches!(
            circuit.add_gate(Gate::Measure(5)),
            Err(QtreeError::GateQubitMismatch { qubit: 5, .. })
        ));
        assert!(matches!(
            circuit.add_gate(Gate::Cnot(1, 1)),
            Err(QtreeError::DuplicateQubit(1, 1))
        ));
        assert!(matches!(
            circuit.add_gate(Gate::Ry(0, Param::Symbol(0))),
            Err(QtreeError::UnknownSlot { slot: 0, num_slots: 0 })
        ));
    }

    #[test]
    fn test_circuit_depth() {
        let mut circuit = Circuit::new(3);
        circuit.add_gate(Gate::Ry(0, Param::Fixed(0.1))).unwrap();
        circuit.add_gate(Gate::Ry(1, Param::Fixed(0.1))).unwrap();
        circuit.add_gate(Gate::Cnot(0, 1)).unwrap();
        circuit.add_gate(Gate::Ry(2, Param::Fixed(0.1))).unwrap();

        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_gate_counts() {
        let mut circuit = Circuit::new(2);
        circuit.add_gate(Gate::Ry(0, Param::Fixed(1.0))).unwrap();
        circuit.add_gate(Gate::Rz(1, Param::Fixed(1.0))).unwrap();
        circuit.add_gate(Gate::Cnot(0, 1)).unwrap();
        circuit.add_gate(Gate::Measure(0)).unwrap();

        assert_eq!(circuit.count_1q(), 2);
        assert_eq!(circuit.count_2q(), 1);
        assert_eq!(circuit.count_parameterized(), 2);
        assert_eq!(circuit.count_measurements(), 1);
        assert_eq!(circuit.measured_qubits(), vec![0]);
    }

    #[test]
    fn test_validate_binding() {
        let mut circuit = Circuit::new(1);
        circuit.declare_symbol("a");
        circuit.declare_symbol("b");

        assert!(circuit.validate_binding(&ParameterBinding::new(vec![0.0, 1.0])).is_ok());
        assert!(matches!(
            circuit.validate_binding(&ParameterBinding::new(vec![0.0])),
            Err(QtreeError::BindingLengthMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_display_lists_symbols() {
        let mut circuit = Circuit::with_name(1, "enc");
        let slot = circuit.declare_symbol("pixel_0");
        circuit.add_gate(Gate::YPow(0, Param::Symbol(slot))).unwrap();

        let text = circuit.to_string();
        assert!(text.contains("ypow(pixel_0) q[0]"));
        assert_eq!(circuit.name(), Some("enc"));
    }
}
