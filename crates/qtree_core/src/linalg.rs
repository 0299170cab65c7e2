//! Small dense matrices for one- and two-qubit gates
//!
//! Gantree: L1_Circuit → Linalg
//!
//! Two-qubit matrices act on the basis |a b⟩ with the first qubit `a` as the
//! most significant bit, so `kron(u, v)` applies `u` to `a` and `v` to `b`.

use crate::error::{QtreeError, QtreeResult};
use nalgebra::{Matrix2, Matrix4};
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// 2x2 complex matrix
pub type Matrix2c = Matrix2<Complex64>;

/// 4x4 complex matrix
pub type Matrix4c = Matrix4<Complex64>;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

// ============================================================================
// Single-Qubit Matrices
// ============================================================================

/// Rotation about Y: `exp(-iθY/2)`
pub fn ry(theta: f64) -> Matrix2c {
    let (s, c) = (theta / 2.0).sin_cos();
    Matrix2c::new(
        Complex64::new(c, 0.0),
        Complex64::new(-s, 0.0),
        Complex64::new(s, 0.0),
        Complex64::new(c, 0.0),
    )
}

/// Rotation about Z: `exp(-iθZ/2)`
pub fn rz(theta: f64) -> Matrix2c {
    Matrix2c::new(
        Complex64::from_polar(1.0, -theta / 2.0),
        ZERO,
        ZERO,
        Complex64::from_polar(1.0, theta / 2.0),
    )
}

/// Y-power gate `Y^x`, equal to `Ry(πx)` up to global phase
pub fn ypow(exponent: f64) -> Matrix2c {
    ry(PI * exponent)
}

/// Hadamard
pub fn hadamard() -> Matrix2c {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    Matrix2c::new(h, h, h, -h)
}

// ============================================================================
// Two-Qubit Matrices
// ============================================================================

/// CNOT with the first (most significant) qubit as control
pub fn cnot() -> Matrix4c {
    Matrix4c::new(
        ONE, ZERO, ZERO, ZERO, //
        ZERO, ONE, ZERO, ZERO, //
        ZERO, ZERO, ZERO, ONE, //
        ZERO, ZERO, ONE, ZERO,
    )
}

/// Tensor product `a ⊗ b`
pub fn kron(a: &Matrix2c, b: &Matrix2c) -> Matrix4c {
    Matrix4c::from_fn(|r, c| a[(r / 2, c / 2)] * b[(r % 2, c % 2)])
}

/// 2x2 block `(block_row, block_col)` of a 4x4 matrix
pub fn block(m: &Matrix4c, block_row: usize, block_col: usize) -> Matrix2c {
    Matrix2c::from_fn(|r, c| m[(2 * block_row + r, 2 * block_col + c)])
}

// ============================================================================
// Unitarity
// ============================================================================

/// Largest entry-wise deviation of `U·Uᴴ` from identity
pub fn unitarity_deviation<const N: usize>(
    m: &nalgebra::SMatrix<Complex64, N, N>,
) -> f64 {
    let product = m * m.adjoint();
    let mut deviation: f64 = 0.0;
    for r in 0..N {
        for c in 0..N {
            let expected = if r == c { ONE } else { ZERO };
            deviation = deviation.max((product[(r, c)] - expected).norm());
        }
    }
    deviation
}

/// Fail with [`QtreeError::NonUnitary`] unless `m` is unitary within `tolerance`
pub fn ensure_unitary<const N: usize>(
    m: &nalgebra::SMatrix<Complex64, N, N>,
    tolerance: f64,
) -> QtreeResult<()> {
    let deviation = unitarity_deviation(m);
    if deviation.is_finite() && deviation <= tolerance {
        Ok(())
    } else {
        Err(QtreeError::NonUnitary {
            deviation,
            tolerance,
        })
    }
}

/// Phase-insensitive overlap `|Tr(Aᴴ B)| / N`, 1 when `A = e^{iφ}B`
pub fn phase_fidelity<const N: usize>(
    a: &nalgebra::SMatrix<Complex64, N, N>,
    b: &nalgebra::SMatrix<Complex64, N, N>,
) -> f64 {
    (a.adjoint() * b).trace().norm() / N as f64
}

/// Rescale a 4x4 unitary to determinant 1
pub fn to_special(u: &Matrix4c) -> Matrix4c {
    let root = u.determinant().powf(0.25);
    u.map(|z| z / root)
}

// ============================================================================
// Tests
// ============================================================================
