//! # QTREE Core
//!
//! Foundation types, circuits, tree topology and node synthesis for the
//! tree-structured quantum image classifier.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qtree_core // L0~L3: Foundation + Circuit + Synthesis + Tree (완료)
//!     L0_Foundation // 기반 타입/상수/에러 (완료)
//!         CoreTypes // 핵심 타입, 슬롯 바인딩 (완료)
//!         Constants // 트리/수치/SPSA 상수 (완료)
//!         Errors // 에러 타입 (완료)
//!     L1_Circuit // 회로 구조 (완료)
//!         Linalg // 2x2, 4x4 행렬 (완료)
//!         Gate // 게이트 enum (완료)
//!         Circuit // 회로 + 심볼 테이블 (완료)
//!         CircuitBuilder // 빌더 패턴 (완료)
//!         TreeTopology // 이진 트리 (완료)
//!         ImageEncoder // 픽셀 인코딩 (완료)
//!     L2_Synthesis // 노드 합성 (완료)
//!         UnitarySynthesis // 에르미트 생성자 → 유니터리 (완료)
//!         GateDecomposition // ZYZ + 3 CNOT (KAK) (완료)
//!     L3_Tree // 트리 회로 (완료)
//!         CompositeTree // 조밀 유니터리 (완료)
//!         DecompositionTree // 분해 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qtree_core::prelude::*;
//!
//! // A 4-pixel tree: 2 levels, 3 nodes
//! let mut tree = DecompositionTree::new(4).unwrap();
//! assert_eq!(tree.param_count(), 72);
//!
//! let params = vec![0.0; 72];
//! let circuit = tree.build(&params).unwrap();
//! assert_eq!(circuit.count_2q(), 9);
//!
//! let binding = tree.bind(&[0.0, 0.0, 1.0, 1.0]).unwrap();
//! assert_eq!(binding.len(), 76);
//! ```
//!
//! ## Node Synthesis
//!
//! ```rust
//! use qtree_core::prelude::*;
//!
//! let u = unitary_from_generator(&[0.1; 16]).unwrap();
//! let angles = decompose_two_qubit(&u).unwrap();
//! let v = compose_node(&angles).unwrap();
//! assert!(phase_fidelity(&u, &v) > 1.0 - 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Small dense matrices (Gantree: L1_Circuit → Linalg)
pub mod linalg;

/// Quantum gates (Gantree: L1_Circuit → Gate)
pub mod gate;

/// Circuit structure (Gantree: L1_Circuit → Circuit)
pub mod circuit;

/// Circuit builder (Gantree: L1_Circuit → CircuitBuilder)
pub mod builder;

/// Tree topology (Gantree: L1_Circuit → TreeTopology)
pub mod topology;

/// Pixel encoder (Gantree: L1_Circuit → ImageEncoder)
pub mod encoder;

/// Unitary synthesis (Gantree: L2_Synthesis → UnitarySynthesis)
pub mod synthesis;

/// Gate decomposition (Gantree: L2_Synthesis → GateDecomposition)
pub mod decomposition;

/// Tree circuits (Gantree: L3_Tree → TreeCircuit)
pub mod tree;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::CircuitBuilder;
pub use circuit::Circuit;
pub use constants::{numerics, sim, spsa};
pub use decomposition::{compose_node, decompose_two_qubit, zyz_angles, zyz_matrix};
pub use encoder::ImageEncoder;
pub use error::{QtreeError, QtreeResult};
pub use gate::Gate;
pub use linalg::{phase_fidelity, Matrix2c, Matrix4c};
pub use synthesis::unitary_from_generator;
pub use topology::{TreeLevel, TreeNode, TreeTopology};
pub use tree::{
    decomposed_from_composite, AnyTree, CompositeTree, DecompositionTree, TreeCircuit, TreeKind,
};
pub use types::{
    predicted_label, Angle, ClassProbabilities, Label, Param, ParamVec, ParameterBinding, QubitId,
    Slot,
};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qtree_core::prelude::*;
    //! ```

    pub use crate::builder::CircuitBuilder;
    pub use crate::circuit::Circuit;
    pub use crate::constants::{numerics, sim, spsa, tree as tree_constants};
    pub use crate::decomposition::{compose_node, decompose_two_qubit, zyz_angles, zyz_matrix};
    pub use crate::encoder::ImageEncoder;
    pub use crate::error::{QtreeError, QtreeResult};
    pub use crate::gate::Gate;
    pub use crate::linalg::{phase_fidelity, Matrix2c, Matrix4c};
    pub use crate::synthesis::unitary_from_generator;
    pub use crate::topology::{TreeLevel, TreeNode, TreeTopology};
    pub use crate::tree::{
        decomposed_from_composite, AnyTree, CompositeTree, DecompositionTree, TreeCircuit,
        TreeKind,
    };
    pub use crate::types::{
        predicted_label, Angle, ClassProbabilities, Label, Param, ParamVec, ParameterBinding,
        QubitId, Slot,
    };
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use crate::linalg;
    use crate::{NAME, VERSION};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_topology_matches_param_slicing() {
        // Decomposition slots follow node order, so the n-th node's slots
        // start right after the pixels plus n * 24
        let tree = DecompositionTree::new(8).unwrap();
        let circuit = tree.circuit();
        for node in tree.topology().nodes() {
            let slot = circuit
                .slot_of(&format!("n{}_l0_q0_z1", node.index))
                .unwrap();
            assert_eq!(slot, 8 + node.index * 24);
        }
    }

    #[test]
    fn test_any_tree_dispatch() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for kind in [TreeKind::Composite, TreeKind::Decomposition] {
            let mut tree = AnyTree::new(kind, 4).unwrap();
            let params = kind.init_params(4, &mut rng).unwrap();

            assert_eq!(tree.kind(), kind);
            assert_eq!(params.len(), tree.param_count());

            let circuit = tree.build(&params).unwrap().clone();
            let binding = tree.bind(&[0.0, 0.0, 1.0, 1.0]).unwrap();
            assert!(circuit.validate_binding(&binding).is_ok());
            assert_eq!(circuit.measured_qubits(), vec![0]);
        }
    }

    #[test]
    fn test_bind_rejects_bad_pixels() {
        let tree = AnyTree::new(TreeKind::Composite, 4).unwrap();
        assert!(matches!(
            tree.bind(&[0.0, 0.5, 1.2, 0.0]),
            Err(QtreeError::InvalidPixelValue { index: 2, .. })
        ));
        assert!(tree.bind(&[0.0; 3]).unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_synthesis_decomposition_agree() {
        let u = unitary_from_generator(&[
            0.4, -0.2, 0.9, 0.1, 0.3, -0.7, 0.5, 0.2, -0.1, 0.6, 0.0, 0.8, -0.3, 0.2, 0.4, -0.5,
        ])
        .unwrap();
        assert!(linalg::unitarity_deviation(&u) < numerics::UNITARY_TOLERANCE);

        let angles = decompose_two_qubit(&u).unwrap();
        let v = compose_node(&angles).unwrap();
        assert!(phase_fidelity(&u, &v) >= numerics::DECOMPOSITION_FIDELITY);
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "qtree_core");
    }
}
