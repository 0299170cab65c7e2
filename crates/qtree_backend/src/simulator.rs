//! State-vector simulator for QTREE
//!
//! Gantree: L4_Backend → StateVectorSimulator
//!
//! Dense `2^n` amplitude simulation. Qubit `q` is bit `q` of the basis
//! index. The readout qubit is the first measured qubit of the circuit
//! (qubit 0 when none is measured).

use crate::execution::{EvaluationMode, ReadoutCounts, Simulator};
use log::trace;
use num_complex::Complex64;
use qtree_core::constants::sim::DEFAULT_MAX_QUBITS;
use qtree_core::constants::tree::READOUT_QUBIT;
use qtree_core::{
    Circuit, ClassProbabilities, Gate, Matrix2c, Matrix4c, ParameterBinding, QtreeError,
    QtreeResult, QubitId,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Noiseless state-vector simulator
/// Gantree: StateVectorSimulator // 상태벡터 시뮬레이터
#[derive(Debug)]
pub struct StateVectorSimulator {
    /// Simulator name
    name: String,

    /// Largest register accepted
    max_qubits: usize,

    /// Random seed for sampling
    seed: Option<u64>,

    /// Sampled evaluations so far, selects the ChaCha stream of the next one
    calls: AtomicU64,
}

impl StateVectorSimulator {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a simulator with default limits
    pub fn new() -> Self {
        Self {
            name: "qtree_statevector".to_string(),
            max_qubits: DEFAULT_MAX_QUBITS,
            seed: None,
            calls: AtomicU64::new(0),
        }
    }

    /// Set seed for reproducible sampling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.calls = AtomicU64::new(0);
        self
    }

    /// Set the register limit
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Set simulator name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Sampling seed
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Final state of `circuit` under `binding`, starting from |0…0⟩
    /// Gantree: statevector(circuit, binding) -> Result<Vec<Complex64>> // 상태 진화
    pub fn statevector(
        &self,
        circuit: &Circuit,
        binding: &ParameterBinding,
    ) -> QtreeResult<Vec<Complex64>> {
        let n = circuit.num_qubits();
        if n > self.max_qubits {
            return Err(QtreeError::SimulationError(format!(
                "circuit needs {} qubits but {} supports at most {}",
                n, self.name, self.max_qubits
            )));
        }
        circuit.validate_binding(binding)?;

        let mut state = vec![Complex64::new(0.0, 0.0); 1 << n];
        state[0] = Complex64::new(1.0, 0.0);

        for gate in circuit.gates() {
            self.apply_gate(&mut state, gate, binding)?;
        }
        Ok(state)
    }

    /// Reduced 2x2 density matrix of the readout qubit
    /// Gantree: readout_density_matrix(circuit, binding) -> Result<Matrix2c> // 축약 밀도행렬
    pub fn readout_density_matrix(
        &self,
        circuit: &Circuit,
        binding: &ParameterBinding,
    ) -> QtreeResult<Matrix2c> {
        let state = self.statevector(circuit, binding)?;
        Ok(reduced_density_matrix(&state, readout_qubit(circuit)))
    }

    /// Exact readout distribution for one binding
    fn exact(&self, circuit: &Circuit, binding: &ParameterBinding) -> QtreeResult<ClassProbabilities> {
        let rho = self.readout_density_matrix(circuit, binding)?;
        Ok([rho[(0, 0)].re, rho[(1, 1)].re])
    }

    /// Sampled readout distribution for one binding
    fn sampled<R: Rng>(
        &self,
        circuit: &Circuit,
        binding: &ParameterBinding,
        shots: u64,
        rng: &mut R,
    ) -> QtreeResult<ClassProbabilities> {
        let [_, p1] = self.exact(circuit, binding)?;
        let mut counts = ReadoutCounts::default();
        for _ in 0..shots {
            counts.record(rng.gen::<f64>() < p1);
        }
        Ok(counts.probabilities())
    }

    fn apply_gate(
        &self,
        state: &mut [Complex64],
        gate: &Gate,
        binding: &ParameterBinding,
    ) -> QtreeResult<()> {
        match gate {
            Gate::YPow(q, _) | Gate::Ry(q, _) | Gate::Rz(q, _) => {
                if let Some(m) = gate.single_qubit_matrix(binding)? {
                    self.apply_single_qubit_gate(state, *q, &m);
                }
            }
            Gate::Cnot(c, t) => self.apply_cnot(state, *c, *t),
            Gate::Unitary(a, b, m) => self.apply_two_qubit_gate(state, *a, *b, m),
            // Terminal readout, handled after evolution
            Gate::Measure(_) => {}
        }
        Ok(())
    }

    // ========================================================================
    // Gate Kernels
    // ========================================================================

    fn apply_single_qubit_gate(&self, state: &mut [Complex64], q: QubitId, m: &Matrix2c) {
        let mask = 1 << q;
        for i in 0..state.len() {
            if i & mask == 0 {
                let j = i | mask;
                let (a, b) = (state[i], state[j]);
                state[i] = m[(0, 0)] * a + m[(0, 1)] * b;
                state[j] = m[(1, 0)] * a + m[(1, 1)] * b;
            }
        }
    }

    fn apply_cnot(&self, state: &mut [Complex64], control: QubitId, target: QubitId) {
        let control_mask = 1 << control;
        let target_mask = 1 << target;

        for i in 0..state.len() {
            if (i & control_mask) != 0 && (i & target_mask) == 0 {
                state.swap(i, i | target_mask);
            }
        }
    }

    /// `first` selects the high half of the 4x4 index
    fn apply_two_qubit_gate(
        &self,
        state: &mut [Complex64],
        first: QubitId,
        second: QubitId,
        m: &Matrix4c,
    ) {
        let first_mask = 1 << first;
        let second_mask = 1 << second;

        for i in 0..state.len() {
            if i & (first_mask | second_mask) != 0 {
                continue;
            }
            let idx = [
                i,
                i | second_mask,
                i | first_mask,
                i | first_mask | second_mask,
            ];
            let amps = idx.map(|k| state[k]);
            for (r, &k) in idx.iter().enumerate() {
                state[k] = (0..4).map(|c| m[(r, c)] * amps[c]).sum();
            }
        }
    }
}

impl Clone for StateVectorSimulator {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            max_qubits: self.max_qubits,
            seed: self.seed,
            calls: AtomicU64::new(self.calls.load(Ordering::Relaxed)),
        }
    }
}

impl Default for StateVectorSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator for StateVectorSimulator {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn evaluate(
        &self,
        circuit: &Circuit,
        bindings: &[ParameterBinding],
        reps: u64,
    ) -> QtreeResult<Vec<ClassProbabilities>> {
        let mode = EvaluationMode::from_reps(reps);
        trace!(
            "{}: evaluating {} bindings on {} qubits ({})",
            self.name,
            bindings.len(),
            circuit.num_qubits(),
            mode
        );

        match mode {
            EvaluationMode::Exact => bindings.iter().map(|b| self.exact(circuit, b)).collect(),
            EvaluationMode::Sampled { shots } => {
                let mut rng = match self.seed {
                    Some(seed) => {
                        // Same seed, fresh stream per call
                        let mut rng = ChaCha8Rng::seed_from_u64(seed);
                        rng.set_stream(self.calls.fetch_add(1, Ordering::Relaxed));
                        rng
                    }
                    None => ChaCha8Rng::from_entropy(),
                };
                bindings
                    .iter()
                    .map(|b| self.sampled(circuit, b, shots, &mut rng))
                    .collect()
            }
        }
    }
}

// ============================================================================
// Readout Helpers
// ============================================================================

fn readout_qubit(circuit: &Circuit) -> QubitId {
    circuit
        .measured_qubits()
        .first()
        .copied()
        .unwrap_or(READOUT_QUBIT)
}

/// Partial trace of a pure state onto one qubit
pub fn reduced_density_matrix(state: &[Complex64], qubit: QubitId) -> Matrix2c {
    let mask = 1 << qubit;
    let mut rho = Matrix2c::zeros();
    for i in 0..state.len() {
        if i & mask != 0 {
            continue;
        }
        let pair = [state[i], state[i | mask]];
        for a in 0..2 {
            for b in 0..2 {
                rho[(a, b)] += pair[a] * pair[b].conj();
            }
        }
    }
    rho
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qtree_core::{linalg, CircuitBuilder};
    use std::f64::consts::PI;

    fn empty() -> ParameterBinding {
        ParameterBinding::default()
    }

    #[test]
    fn test_ypow_encoding() {
        let sim = StateVectorSimulator::new();
        let circuit = CircuitBuilder::new(1)
            .ypow_sym(0, "pixel_0")
            .measure(0)
            .build()
            .unwrap();

        for x in [0.0, 0.25, 0.5, 1.0] {
            let p = sim
                .evaluate_one(&circuit, &ParameterBinding::new(vec![x]), 0)
                .unwrap();
            let expected_p1 = (PI * x / 2.0).sin().powi(2);
            assert_abs_diff_eq!(p[1], expected_p1, epsilon = 1e-12);
            assert_abs_diff_eq!(p[0] + p[1], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_bell_density_matrix() {
        let sim = StateVectorSimulator::new();
        let circuit = CircuitBuilder::new(2)
            .ry(0, PI / 2.0)
            .cnot(0, 1)
            .build()
            .unwrap();

        let rho = sim.readout_density_matrix(&circuit, &empty()).unwrap();
        // Maximally mixed readout
        assert_abs_diff_eq!(rho[(0, 0)].re, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(rho[(1, 1)].re, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(rho[(0, 1)].norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cnot_control_order() {
        let sim = StateVectorSimulator::new();
        // Flip qubit 1, then CNOT controlled by 1 flips qubit 0
        let circuit = CircuitBuilder::new(2)
            .ry(1, PI)
            .cnot(1, 0)
            .measure(0)
            .build()
            .unwrap();

        let p = sim.evaluate_one(&circuit, &empty(), 0).unwrap();
        assert_abs_diff_eq!(p[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dense_unitary_matches_cnot() {
        let sim = StateVectorSimulator::new();
        let with_cnot = CircuitBuilder::new(3)
            .ry(0, 1.1)
            .ry(2, 0.4)
            .cnot(0, 2)
            .build()
            .unwrap();
        let with_unitary = CircuitBuilder::new(3)
            .ry(0, 1.1)
            .ry(2, 0.4)
            .unitary(0, 2, linalg::cnot())
            .build()
            .unwrap();

        let a = sim.statevector(&with_cnot, &empty()).unwrap();
        let b = sim.statevector(&with_unitary, &empty()).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_abs_diff_eq!((x - y).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_unitary_readout_marginal() {
        // p(readout = 0) from |00⟩ is |U00|² + |U10|²
        let u = qtree_core::unitary_from_generator(&[
            0.3, -0.1, 0.7, 0.2, 0.5, 0.1, -0.4, 0.9, 0.2, -0.6, 0.3, 0.0, 0.8, -0.2, 0.1, 0.4,
        ])
        .unwrap();
        let circuit = CircuitBuilder::new(2)
            .unitary(0, 1, u)
            .measure(0)
            .build()
            .unwrap();

        let p = StateVectorSimulator::new()
            .evaluate_one(&circuit, &empty(), 0)
            .unwrap();
        assert_abs_diff_eq!(p[0], u[(0, 0)].norm_sqr() + u[(1, 0)].norm_sqr(), epsilon = 1e-12);
    }

    #[test]
    fn test_sampling_is_seeded() {
        let circuit = CircuitBuilder::new(1).ry(0, 1.2).measure(0).build().unwrap();
        let bindings = vec![empty(); 3];

        let sim = StateVectorSimulator::new().with_seed(42);
        let first = sim.evaluate(&circuit, &bindings, 2000).unwrap();
        let second = sim.evaluate(&circuit, &bindings, 2000).unwrap();
        // Consecutive calls draw from different streams
        assert_ne!(first, second);

        // A fresh simulator with the same seed replays the same sequence
        let replay = StateVectorSimulator::new().with_seed(42);
        assert_eq!(replay.evaluate(&circuit, &bindings, 2000).unwrap(), first);
        assert_eq!(replay.evaluate(&circuit, &bindings, 2000).unwrap(), second);

        let exact_p1 = (0.6f64).sin().powi(2);
        for p in &first {
            assert_abs_diff_eq!(p[0] + p[1], 1.0, epsilon = 1e-12);
            assert!((p[1] - exact_p1).abs() < 0.05);
        }
    }

    #[test]
    fn test_qubit_limit() {
        let sim = StateVectorSimulator::new().with_max_qubits(2);
        let circuit = CircuitBuilder::new(3).measure(0).build().unwrap();

        let err = sim.evaluate(&circuit, &[empty()], 0).unwrap_err();
        assert!(matches!(err, QtreeError::SimulationError(_)));
    }

    #[test]
    fn test_binding_length_checked() {
        let circuit = CircuitBuilder::new(1).ypow_sym(0, "pixel_0").build().unwrap();
        let err = StateVectorSimulator::new()
            .evaluate(&circuit, &[empty()], 0)
            .unwrap_err();
        assert!(matches!(err, QtreeError::BindingLengthMismatch { expected: 1, actual: 0 }));
    }
}
