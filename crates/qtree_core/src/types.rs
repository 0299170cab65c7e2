//! Core types for QTREE
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Type aliases, parameter references and per-image bindings shared by
//! the circuit, backend and training crates.

use crate::error::{QtreeError, QtreeResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed)
/// Gantree: QubitId // pub type QubitId = usize
pub type QubitId = usize;

/// Rotation angle in radians
/// Gantree: Angle // pub type Angle = f64
pub type Angle = f64;

/// Trainable parameter vector
/// Gantree: ParamVec // pub type ParamVec = Vec<f64>
pub type ParamVec = Vec<f64>;

/// Index of a symbolic parameter inside a circuit's symbol table
pub type Slot = usize;

/// Class label (0 or 1)
pub type Label = usize;

/// Per-image class probabilities: `[p(label 0), p(label 1)]`
/// Gantree: ClassProbabilities // [f64; 2]
pub type ClassProbabilities = [f64; 2];

/// Label with the highest probability. Ties resolve to label 0.
pub fn predicted_label(probs: &ClassProbabilities) -> Label {
    if probs[1] > probs[0] {
        1
    } else {
        0
    }
}

// ============================================================================
// Param
// ============================================================================

/// Rotation parameter: either a literal angle or a symbol slot
/// resolved against a [`ParameterBinding`] at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Param {
    /// Literal value baked into the gate
    Fixed(f64),

    /// Symbol slot resolved at evaluation time
    Symbol(Slot),
}

impl Param {
    /// Resolve the numeric value
    #[inline]
    pub fn resolve(&self, binding: &ParameterBinding) -> QtreeResult<f64> {
        match *self {
            Param::Fixed(value) => Ok(value),
            Param::Symbol(slot) => binding.get(slot),
        }
    }

    /// Slot index for symbolic parameters
    pub fn slot(&self) -> Option<Slot> {
        match *self {
            Param::Fixed(_) => None,
            Param::Symbol(slot) => Some(slot),
        }
    }

    /// Check if the parameter is symbolic
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Param::Symbol(_))
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Fixed(value) => write!(f, "{}", value),
            Param::Symbol(slot) => write!(f, "${}", slot),
        }
    }
}

// ============================================================================
// ParameterBinding
// ============================================================================

/// Slot-indexed parameter values for one circuit evaluation
/// Gantree: ParameterBinding // 슬롯 값
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterBinding {
    values: Vec<f64>,
}

impl ParameterBinding {
    /// Create from slot values
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Value at a slot
    pub fn get(&self, slot: Slot) -> QtreeResult<f64> {
        self.values
            .get(slot)
            .copied()
            .ok_or(QtreeError::UnknownSlot {
                slot,
                num_slots: self.values.len(),
            })
    }

    /// Number of bound slots
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the values
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Append values for the following slots
    pub fn extend_from_slice(&mut self, values: &[f64]) {
        self.values.extend_from_slice(values);
    }
}

impl From<Vec<f64>> for ParameterBinding {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

// ============================================================================
// Tests
// ============================================================================
