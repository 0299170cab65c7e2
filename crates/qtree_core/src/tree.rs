//! Tree classifier circuits
//!
//! Gantree: L3_Tree → TreeCircuit
//!
//! Two parameterizations of the same tree share one contract:
//!
//! - [`CompositeTree`]: one dense unitary per node, synthesized from 16
//!   generator entries. The circuit is rebuilt on every `build`.
//! - [`DecompositionTree`]: per node four ZYZ layers around three CNOTs,
//!   24 angles. The circuit is compiled once; `build` only records the
//!   angles that `bind` appends after the pixel slots.
//!
//! Nodes are emitted in level-then-position order and consume the flat
//! parameter vector slice by slice in that order.

use crate::builder::CircuitBuilder;
use crate::circuit::Circuit;
use crate::constants::tree::{
    composite_param_count, decomposed_param_count, CNOTS_PER_NODE, COMPOSITE_NODE_PARAMS,
    DECOMPOSED_NODE_PARAMS,
};
use crate::decomposition::decompose_two_qubit;
use crate::encoder::ImageEncoder;
use crate::error::{QtreeError, QtreeResult};
use crate::linalg::Matrix4c;
use crate::synthesis::unitary_from_generator;
use crate::topology::TreeTopology;
use crate::types::{ParamVec, ParameterBinding};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

// ============================================================================
// Tree Kind
// ============================================================================

/// Node parameterization
/// Gantree: TreeKind // 트리 변형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    /// Dense unitary per node
    #[default]
    Composite,
    /// ZYZ layers around three CNOTs per node
    Decomposition,
}

impl TreeKind {
    /// Trainable parameter count for `num_pixels` qubits
    pub fn param_count(&self, num_pixels: usize) -> usize {
        match self {
            TreeKind::Composite => composite_param_count(num_pixels),
            TreeKind::Decomposition => decomposed_param_count(num_pixels),
        }
    }

    /// Random starting parameters: generator entries uniform in [-1, 1),
    /// angles uniform in [0, 2π)
    /// Gantree: init_params(num_pixels, rng) -> Result<ParamVec> // 초기 파라미터
    pub fn init_params<R: Rng + ?Sized>(
        &self,
        num_pixels: usize,
        rng: &mut R,
    ) -> QtreeResult<ParamVec> {
        TreeTopology::new(num_pixels)?;
        let n = self.param_count(num_pixels);
        let params = match self {
            TreeKind::Composite => (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect(),
            TreeKind::Decomposition => (0..n).map(|_| rng.gen_range(0.0..2.0 * PI)).collect(),
        };
        Ok(params)
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "composite" => Some(TreeKind::Composite),
            "decomposition" | "decomposed" => Some(TreeKind::Decomposition),
            _ => None,
        }
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeKind::Composite => write!(f, "composite"),
            TreeKind::Decomposition => write!(f, "decomposition"),
        }
    }
}

// ============================================================================
// Tree Circuit Trait
// ============================================================================

/// Shared contract of both tree variants
/// Gantree: TreeCircuit // trait
pub trait TreeCircuit: Send + Sync {
    /// Variant tag
    fn kind(&self) -> TreeKind;

    /// Pairing structure
    fn topology(&self) -> &TreeTopology;

    /// Trainable parameter count
    fn param_count(&self) -> usize {
        self.kind().param_count(self.topology().num_qubits())
    }

    /// Apply a parameter vector and return the circuit to evaluate
    fn build(&mut self, params: &[f64]) -> QtreeResult<&Circuit>;

    /// Circuit of the last `build`
    fn circuit(&self) -> &Circuit;

    /// Slot values for one image
    fn bind(&self, pixels: &[f64]) -> QtreeResult<ParameterBinding>;

    /// Number of pixels per image
    fn num_pixels(&self) -> usize {
        self.topology().num_qubits()
    }
}

fn check_length(expected: usize, params: &[f64]) -> QtreeResult<()> {
    if params.len() != expected {
        return Err(QtreeError::ParamLengthMismatch {
            expected,
            actual: params.len(),
        });
    }
    Ok(())
}

// ============================================================================
// Composite Tree
// ============================================================================

/// Tree with one synthesized dense unitary per node
/// Gantree: CompositeTree // 조밀 유니터리 트리
#[derive(Debug, Clone)]
pub struct CompositeTree {
    topology: TreeTopology,
    encoder: ImageEncoder,
    circuit: Circuit,
}

impl CompositeTree {
    /// Tree over `num_pixels` qubits, every node initially the identity
    pub fn new(num_pixels: usize) -> QtreeResult<Self> {
        let topology = TreeTopology::new(num_pixels)?;
        let encoder = ImageEncoder::new(num_pixels);
        let identities = vec![Matrix4c::identity(); topology.num_nodes()];
        let circuit = assemble_composite(&topology, &encoder, &identities)?;
        Ok(Self {
            topology,
            encoder,
            circuit,
        })
    }

    /// Node unitaries for a parameter vector, in node order
    /// Gantree: node_unitaries(params) -> Result<Vec<Matrix4c>> // 노드 유니터리
    pub fn node_unitaries(&self, params: &[f64]) -> QtreeResult<Vec<Matrix4c>> {
        check_length(self.param_count(), params)?;
        params
            .chunks(COMPOSITE_NODE_PARAMS)
            .map(unitary_from_generator)
            .collect()
    }
}

fn assemble_composite(
    topology: &TreeTopology,
    encoder: &ImageEncoder,
    unitaries: &[Matrix4c],
) -> QtreeResult<Circuit> {
    let builder = encoder.encode(CircuitBuilder::with_name(topology.num_qubits(), "composite"));
    topology
        .nodes()
        .iter()
        .zip(unitaries)
        .fold(builder, |b, (node, u)| b.unitary(node.upper, node.lower, *u))
        .measure(topology.readout_qubit())
        .build()
}

impl TreeCircuit for CompositeTree {
    fn kind(&self) -> TreeKind {
        TreeKind::Composite
    }

    fn topology(&self) -> &TreeTopology {
        &self.topology
    }

    fn build(&mut self, params: &[f64]) -> QtreeResult<&Circuit> {
        let unitaries = self.node_unitaries(params)?;
        self.circuit = assemble_composite(&self.topology, &self.encoder, &unitaries)?;
        Ok(&self.circuit)
    }

    fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    fn bind(&self, pixels: &[f64]) -> QtreeResult<ParameterBinding> {
        self.encoder.bind(pixels)
    }
}

// ============================================================================
// Decomposition Tree
// ============================================================================

/// Tree with ZYZ rotations and three CNOTs per node
/// Gantree: DecompositionTree // 분해 트리
#[derive(Debug, Clone)]
pub struct DecompositionTree {
    topology: TreeTopology,
    encoder: ImageEncoder,
    circuit: Circuit,
    params: ParamVec,
}

impl DecompositionTree {
    /// Compile the fixed circuit for `num_pixels` qubits
    pub fn new(num_pixels: usize) -> QtreeResult<Self> {
        let topology = TreeTopology::new(num_pixels)?;
        let encoder = ImageEncoder::new(num_pixels);

        let mut builder =
            encoder.encode(CircuitBuilder::with_name(num_pixels, "decomposition"));
        for node in topology.nodes() {
            for layer in 0..=CNOTS_PER_NODE {
                let prefix = format!("n{}_l{}", node.index, layer);
                builder = builder
                    .zyz_sym(node.upper, &format!("{}_q0", prefix))
                    .zyz_sym(node.lower, &format!("{}_q1", prefix));
                if layer < CNOTS_PER_NODE {
                    builder = builder.cnot(node.upper, node.lower);
                }
            }
        }
        let circuit = builder.measure(topology.readout_qubit()).build()?;
        debug!(
            "compiled decomposition tree: {} gates, {} slots",
            circuit.gate_count(),
            circuit.num_slots()
        );

        let params = vec![0.0; decomposed_param_count(num_pixels)];
        Ok(Self {
            topology,
            encoder,
            circuit,
            params,
        })
    }

    /// Angles recorded by the last `build`
    pub fn params(&self) -> &[f64] {
        &self.params
    }
}

impl TreeCircuit for DecompositionTree {
    fn kind(&self) -> TreeKind {
        TreeKind::Decomposition
    }

    fn topology(&self) -> &TreeTopology {
        &self.topology
    }

    fn build(&mut self, params: &[f64]) -> QtreeResult<&Circuit> {
        check_length(self.param_count(), params)?;
        self.params.clear();
        self.params.extend_from_slice(params);
        Ok(&self.circuit)
    }

    fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    fn bind(&self, pixels: &[f64]) -> QtreeResult<ParameterBinding> {
        let mut binding = self.encoder.bind(pixels)?;
        binding.extend_from_slice(&self.params);
        Ok(binding)
    }
}

/// Decomposition angles realizing the same node unitaries as a composite
/// parameter vector
/// Gantree: decomposed_from_composite(params, n) -> Result<ParamVec> // 변환
pub fn decomposed_from_composite(params: &[f64], num_pixels: usize) -> QtreeResult<ParamVec> {
    let composite = CompositeTree::new(num_pixels)?;
    let mut angles = Vec::with_capacity(decomposed_param_count(num_pixels));
    for u in composite.node_unitaries(params)? {
        angles.extend_from_slice(&decompose_two_qubit(&u)?);
    }
    debug_assert_eq!(angles.len(), DECOMPOSED_NODE_PARAMS * (num_pixels - 1));
    Ok(angles)
}

// ============================================================================
// Runtime Selection
// ============================================================================

/// Either tree variant, chosen at runtime
/// Gantree: AnyTree // enum 디스패치
#[derive(Debug, Clone)]
pub enum AnyTree {
    /// Dense unitary nodes
    Composite(CompositeTree),
    /// Decomposed nodes
    Decomposition(DecompositionTree),
}

impl AnyTree {
    /// Construct the variant named by `kind`
    pub fn new(kind: TreeKind, num_pixels: usize) -> QtreeResult<Self> {
        Ok(match kind {
            TreeKind::Composite => AnyTree::Composite(CompositeTree::new(num_pixels)?),
            TreeKind::Decomposition => AnyTree::Decomposition(DecompositionTree::new(num_pixels)?),
        })
    }

    fn inner(&self) -> &dyn TreeCircuit {
        match self {
            AnyTree::Composite(t) => t,
            AnyTree::Decomposition(t) => t,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn TreeCircuit {
        match self {
            AnyTree::Composite(t) => t,
            AnyTree::Decomposition(t) => t,
        }
    }
}

impl TreeCircuit for AnyTree {
    fn kind(&self) -> TreeKind {
        self.inner().kind()
    }

    fn topology(&self) -> &TreeTopology {
        self.inner().topology()
    }

    fn build(&mut self, params: &[f64]) -> QtreeResult<&Circuit> {
        self.inner_mut().build(params)
    }

    fn circuit(&self) -> &Circuit {
        self.inner().circuit()
    }

    fn bind(&self, pixels: &[f64]) -> QtreeResult<ParameterBinding> {
        self.inner().bind(pixels)
    }
}

// ============================================================================
// Tests
// ============================================================================
