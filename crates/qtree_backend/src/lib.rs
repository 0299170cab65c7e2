//! # QTREE Backend
//!
//! Simulator contract and the noiseless state-vector simulator used to
//! evaluate tree classifiers.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qtree_backend // L4: Backend (완료)
//!     SimulatorTrait // evaluate(circuit, bindings, reps) (완료)
//!     EvaluationMode // 정확 / 샘플링 (완료)
//!     StateVectorSimulator // 상태벡터 시뮬레이터 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qtree_backend::prelude::*;
//! use qtree_core::prelude::*;
//!
//! let mut tree = CompositeTree::new(4).unwrap();
//! let params = vec![0.0; tree.param_count()];
//! let circuit = tree.build(&params).unwrap().clone();
//! let binding = tree.bind(&[0.0, 0.0, 1.0, 1.0]).unwrap();
//!
//! let sim = StateVectorSimulator::new().with_seed(42);
//! let exact = sim.evaluate_one(&circuit, &binding, 0).unwrap();
//! assert!((exact[0] + exact[1] - 1.0).abs() < 1e-9);
//!
//! let sampled = sim.evaluate_one(&circuit, &binding, 1000).unwrap();
//! println!("p(0) = {:.3}, p(1) = {:.3}", sampled[0], sampled[1]);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Simulator trait and evaluation types (Gantree: L4_Backend)
pub mod execution;

/// State-vector simulator (Gantree: L4_Backend → StateVectorSimulator)
pub mod simulator;

// ============================================================================
// Re-exports
// ============================================================================

pub use execution::{EvaluationMode, ReadoutCounts, Simulator};
pub use simulator::{reduced_density_matrix, StateVectorSimulator};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qtree_backend::prelude::*;
    //! ```

    pub use crate::execution::{EvaluationMode, ReadoutCounts, Simulator};
    pub use crate::simulator::StateVectorSimulator;
}

// ============================================================================
// Integration Tests
// ============================================================================
