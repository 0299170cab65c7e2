//! Binary tree topology for QTREE
//!
//! Gantree: L1_Circuit → TreeTopology
//!
//! Pairs qubits level by level: at level `l` the gap inside a pair is
//! `2^l` and consecutive pairs start `2^(l+1)` apart. The lower qubit of a
//! pair is folded into the upper one, so after the last level only qubit 0
//! (the readout) carries the result.

use crate::constants::tree::READOUT_QUBIT;
use crate::error::{QtreeError, QtreeResult};
use crate::types::QubitId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One level of the tree
/// Gantree: TreeLevel // 레벨
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeLevel {
    /// Level index, 0 at the leaves
    pub level: usize,
    /// Distance between the two qubits of a pair
    pub pair_gap: usize,
    /// Upper qubit of every pair, ascending
    pub positions: Vec<QubitId>,
}

impl TreeLevel {
    /// Distance between consecutive pairs
    pub fn node_gap(&self) -> usize {
        2 * self.pair_gap
    }
}

/// One two-qubit node of the tree
/// Gantree: TreeNode // 노드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Flat index in level-then-position order
    pub index: usize,
    /// Level the node sits on
    pub level: usize,
    /// Surviving qubit (control side)
    pub upper: QubitId,
    /// Qubit folded into `upper`
    pub lower: QubitId,
}

/// Binary pairing structure derived from the pixel count
/// Gantree: TreeTopology // 트리 토폴로지
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeTopology {
    num_qubits: usize,
    levels: Vec<TreeLevel>,
}

impl TreeTopology {
    /// Derive the topology for `num_pixels` qubits
    /// Gantree: new(num_pixels) -> Result<Self> // 2의 거듭제곱 검증
    pub fn new(num_pixels: usize) -> QtreeResult<Self> {
        if num_pixels < 2 || !num_pixels.is_power_of_two() {
            return Err(QtreeError::InvalidPixelCount(num_pixels));
        }

        let num_levels = num_pixels.trailing_zeros() as usize;
        let levels = (0..num_levels)
            .map(|level| {
                let pair_gap = 1usize << level;
                TreeLevel {
                    level,
                    pair_gap,
                    positions: (0..num_pixels).step_by(2 * pair_gap).collect(),
                }
            })
            .collect();

        Ok(Self {
            num_qubits: num_pixels,
            levels,
        })
    }

    /// Levels, leaves first
    pub fn levels(&self) -> &[TreeLevel] {
        &self.levels
    }

    /// Nodes in level-then-position order
    /// Gantree: nodes(&self) -> Vec<TreeNode> // 노드 순서
    pub fn nodes(&self) -> Vec<TreeNode> {
        self.levels
            .iter()
            .flat_map(|lvl| {
                lvl.positions.iter().map(move |&pos| (lvl.level, pos, pos + lvl.pair_gap))
            })
            .enumerate()
            .map(|(index, (level, upper, lower))| TreeNode {
                index,
                level,
                upper,
                lower,
            })
            .collect()
    }

    /// Number of levels, `log2(num_qubits)`
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Number of nodes, `num_qubits - 1`
    pub fn num_nodes(&self) -> usize {
        self.levels.iter().map(|l| l.positions.len()).sum()
    }

    /// Number of qubits (one per pixel)
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Qubit holding the classification
    pub fn readout_qubit(&self) -> QubitId {
        READOUT_QUBIT
    }
}

impl fmt::Display for TreeTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TreeTopology({} qubits, {} levels, {} nodes)",
            self.num_qubits,
            self.num_levels(),
            self.num_nodes()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
