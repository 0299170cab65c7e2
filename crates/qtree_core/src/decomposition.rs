//! Gate decomposition for decomposition-tree nodes
//!
//! Gantree: L2_Synthesis → GateDecomposition
//!
//! A node is the fixed sequence
//! `[U1⊗V1, CX, U2⊗V2, CX, U3⊗V3, CX, U4⊗V4]` (control = upper qubit), with
//! every single-qubit unitary written as the ZYZ triple `Rz(z2)·Ry(y)·Rz(z1)`.
//! Angles are stored layer-major, upper qubit before lower, each triple as
//! `(z1, y, z2)`.
//!
//! [`decompose_two_qubit`] inverts [`compose_node`]: it reduces a target to
//! its canonical class in the magic basis, builds a three-CNOT core in the
//! same class and absorbs the remaining local factors into the outer layers.

use crate::constants::numerics::{
    DECOMPOSITION_FIDELITY, DIAGONAL_TOLERANCE, EIGEN_EPS, EIGEN_MAX_ITER,
    TARGET_UNITARY_TOLERANCE, TENSOR_FACTOR_TOLERANCE,
};
use crate::constants::tree::{CNOTS_PER_NODE, DECOMPOSED_NODE_PARAMS, ZYZ_PARAMS};
use crate::error::{QtreeError, QtreeResult};
use crate::linalg::{self, block, cnot, hadamard, kron, ry, rz, Matrix2c, Matrix4c};
use log::{debug, trace};
use nalgebra::linalg::SymmetricEigen;
use nalgebra::Matrix4;
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

/// Single-qubit unitaries of one node, `(upper, lower)` per layer
pub type NodeLayers = [(Matrix2c, Matrix2c); CNOTS_PER_NODE + 1];

/// Weights mixing the real and imaginary parts of a complex symmetric
/// matrix before diagonalization
const MIXING_WEIGHTS: [f64; 6] = [0.618, 1.618, 2.718, 0.318, 3.141, 0.107];

/// Largest spectrum mismatch accepted when pairing eigenvalues
const SPECTRUM_TOLERANCE: f64 = 1e-6;

const SIGN_PATTERNS: [[f64; 3]; 8] = [
    [1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, -1.0, -1.0],
];

// ============================================================================
// Single-Qubit ZYZ
// ============================================================================

/// Matrix of the ZYZ triple `(z1, y, z2)`: `Rz(z2)·Ry(y)·Rz(z1)`
/// Gantree: zyz_matrix(angles) -> Matrix2c // ZYZ 합성
pub fn zyz_matrix(angles: [f64; 3]) -> Matrix2c {
    rz(angles[2]) * ry(angles[1]) * rz(angles[0])
}

/// ZYZ angles `(z1, y, z2)` reproducing `u` up to global phase
/// Gantree: zyz_angles(u) -> [f64; 3] // ZYZ 분해
pub fn zyz_angles(u: &Matrix2c) -> [f64; 3] {
    let root = u.determinant().sqrt();
    let v = u.map(|z| z / root);

    let y = 2.0 * v[(1, 0)].norm().atan2(v[(0, 0)].norm());
    let sum = v[(1, 1)].arg();
    let diff = v[(1, 0)].arg();
    [sum - diff, y, sum + diff]
}

// ============================================================================
// Node Composition
// ============================================================================

/// Multiply node layers in time order
pub fn compose_layers(layers: &NodeLayers) -> Matrix4c {
    let cx = cnot();
    let mut m = Matrix4c::identity();
    for (l, (upper, lower)) in layers.iter().enumerate() {
        m = kron(upper, lower) * m;
        if l < CNOTS_PER_NODE {
            m = cx * m;
        }
    }
    m
}

/// Single-qubit layers described by 24 node angles
pub fn node_layers(angles: &[f64]) -> QtreeResult<NodeLayers> {
    if angles.len() != DECOMPOSED_NODE_PARAMS {
        return Err(QtreeError::ParamLengthMismatch {
            expected: DECOMPOSED_NODE_PARAMS,
            actual: angles.len(),
        });
    }

    let triple = |offset: usize| {
        zyz_matrix([angles[offset], angles[offset + 1], angles[offset + 2]])
    };
    let layer = |l: usize| {
        let base = 2 * ZYZ_PARAMS * l;
        (triple(base), triple(base + ZYZ_PARAMS))
    };
    Ok([layer(0), layer(1), layer(2), layer(3)])
}

/// 4x4 unitary of a node with the given 24 angles
/// Gantree: compose_node(angles) -> Result<Matrix4c> // 노드 합성
pub fn compose_node(angles: &[f64]) -> QtreeResult<Matrix4c> {
    Ok(compose_layers(&node_layers(angles)?))
}

fn layers_to_angles(layers: &NodeLayers) -> [f64; DECOMPOSED_NODE_PARAMS] {
    let mut angles = [0.0; DECOMPOSED_NODE_PARAMS];
    for (l, (upper, lower)) in layers.iter().enumerate() {
        let base = 2 * ZYZ_PARAMS * l;
        angles[base..base + ZYZ_PARAMS].copy_from_slice(&zyz_angles(upper));
        angles[base + ZYZ_PARAMS..base + 2 * ZYZ_PARAMS].copy_from_slice(&zyz_angles(lower));
    }
    angles
}

// ============================================================================
// Magic Basis
// ============================================================================

/// Magic (Bell-like) basis; local unitaries become real orthogonal in it
pub fn magic_basis() -> Matrix4c {
    let o = Complex64::new(FRAC_1_SQRT_2, 0.0);
    let i = Complex64::new(0.0, FRAC_1_SQRT_2);
    let z = Complex64::new(0.0, 0.0);
    Matrix4c::new(
        o, i, z, z, //
        z, z, i, o, //
        z, z, i, -o, //
        o, -i, z, z,
    )
}

/// Real orthogonal `P` (det +1) and diagonal `d` with `Pᵀ M P = diag(d)`,
/// for a complex symmetric unitary `M`
struct SpectralForm {
    p: Matrix4<f64>,
    d: [Complex64; 4],
}

fn real_diagonalize(m: &Matrix4c) -> QtreeResult<SpectralForm> {
    let re = m.map(|z| z.re);
    let im = m.map(|z| z.im);

    // Re and Im commute, so a generic mix shares their eigenvectors
    for &kappa in &MIXING_WEIGHTS {
        let eigen = match SymmetricEigen::try_new(re + im * kappa, EIGEN_EPS, EIGEN_MAX_ITER) {
            Some(eigen) => eigen,
            None => continue,
        };

        let mut p = eigen.eigenvectors;
        if p.determinant() < 0.0 {
            negate_column(&mut p, 0);
        }

        let pc = to_complex(&p);
        let diag = pc.transpose() * m * pc;
        let mut residual: f64 = 0.0;
        for r in 0..4 {
            for c in 0..4 {
                if r != c {
                    residual = residual.max(diag[(r, c)].norm());
                }
            }
        }

        if residual <= DIAGONAL_TOLERANCE {
            return Ok(SpectralForm {
                p,
                d: [diag[(0, 0)], diag[(1, 1)], diag[(2, 2)], diag[(3, 3)]],
            });
        }
        trace!("mixing weight {} left residual {:.3e}", kappa, residual);
    }

    Err(QtreeError::EigenDecompositionFailed(
        "could not diagonalize the magic-basis gram matrix".into(),
    ))
}

fn negate_column(p: &mut Matrix4<f64>, col: usize) {
    for r in 0..4 {
        p[(r, col)] = -p[(r, col)];
    }
}

fn to_complex(p: &Matrix4<f64>) -> Matrix4c {
    p.map(|x| Complex64::new(x, 0.0))
}

fn permutations() -> Vec<[usize; 4]> {
    let mut out = Vec::with_capacity(24);
    for a in 0..4 {
        for b in 0..4 {
            for c in 0..4 {
                if a == b || a == c || b == c {
                    continue;
                }
                // The remaining index of {0, 1, 2, 3}
                let d = 6 - (a + b + c);
                out.push([a, b, c, d]);
            }
        }
    }
    out
}

// ============================================================================
// Canonical Class
// ============================================================================

/// Interaction coefficients `(a, b, c)` of `exp(i(a·XX + b·YY + c·ZZ))`
/// sharing the gram spectrum `d`
fn interaction_coefficients(d: &[Complex64; 4]) -> [f64; 3] {
    let theta: Vec<f64> = d.iter().map(|z| z.arg() / 2.0).collect();
    [
        (theta[0] + theta[2]) / 2.0,
        (theta[1] + theta[2]) / 2.0,
        (theta[0] + theta[1]) / 2.0,
    ]
}

/// Three-CNOT core locally equivalent to `exp(i(a·XX + b·YY + c·ZZ))`
fn core_layers(a: f64, b: f64, c: f64) -> NodeLayers {
    let t1 = 2.0 * (FRAC_PI_4 - c);
    let t2 = 2.0 * (a - FRAC_PI_4);
    let t3 = 2.0 * (FRAC_PI_4 - b);
    let h = hadamard();
    [
        (h, h),
        (h, ry(t3) * h),
        (h * rz(t1), h * ry(t2)),
        (h, h),
    ]
}

/// Factor a local 4x4 unitary into `a ⊗ b`
/// Gantree: split_kron(k) -> Result<(Matrix2c, Matrix2c)> // 텐서 분해
pub fn split_kron(k: &Matrix4c) -> QtreeResult<(Matrix2c, Matrix2c)> {
    let mut pivot = (0, 0);
    let mut largest = -1.0;
    for r in 0..2 {
        for c in 0..2 {
            let n = block(k, r, c).norm();
            if n > largest {
                largest = n;
                pivot = (r, c);
            }
        }
    }

    let blk = block(k, pivot.0, pivot.1);
    let root = blk.determinant().sqrt();
    if root.norm() < TENSOR_FACTOR_TOLERANCE {
        return Err(QtreeError::DecompositionFailed(
            "local factor is not a tensor product".into(),
        ));
    }

    let b = blk.map(|z| z / root);
    let b_adj = b.adjoint();
    let a = Matrix2c::from_fn(|r, c| (b_adj * block(k, r, c)).trace() / 2.0);
    Ok((a, b))
}

/// Outer local factors that turn `core` into the target `up` (magic basis)
fn absorb_locals(
    up: &Matrix4c,
    target: &SpectralForm,
    magic: &Matrix4c,
    core: &NodeLayers,
) -> QtreeResult<NodeLayers> {
    let w = linalg::to_special(&compose_layers(core));
    let wp = magic.adjoint() * w * magic;
    let core_form = real_diagonalize(&(wp.transpose() * wp))?;

    // Pair eigenvalues; a ±i phase on the target flips the gram spectrum
    let mut best = (f64::INFINITY, false, [0, 1, 2, 3]);
    for flip in [false, true] {
        let sign = if flip { -1.0 } else { 1.0 };
        for perm in permutations() {
            let cost: f64 = (0..4)
                .map(|k| (target.d[k] * sign - core_form.d[perm[k]]).norm())
                .sum();
            if cost < best.0 {
                best = (cost, flip, perm);
            }
        }
    }
    let (cost, flip, perm) = best;
    if cost > SPECTRUM_TOLERANCE {
        return Err(QtreeError::DecompositionFailed(format!(
            "core spectrum differs from target by {:.3e}",
            cost
        )));
    }

    let up = if flip { up.map(|z| z * Complex64::i()) } else { *up };
    let mut pw = Matrix4::<f64>::zeros();
    for (k, &src) in perm.iter().enumerate() {
        pw.set_column(k, &core_form.p.column(src));
    }
    if pw.determinant() < 0.0 {
        negate_column(&mut pw, 0);
    }

    let o2 = to_complex(&(pw * target.p.transpose()));
    let o1 = up * o2.transpose() * wp.adjoint();
    let (k1a, k1b) = split_kron(&(magic * o1 * magic.adjoint()))?;
    let (k2a, k2b) = split_kron(&(magic * o2 * magic.adjoint()))?;

    Ok([
        (core[0].0 * k2a, core[0].1 * k2b),
        core[1],
        core[2],
        (k1a * core[3].0, k1b * core[3].1),
    ])
}

// ============================================================================
// Two-Qubit Decomposition
// ============================================================================

/// Node angles whose composed unitary equals `target` up to global phase
/// Gantree: decompose_two_qubit(target) -> Result<[f64; 24]> // KAK 분해
pub fn decompose_two_qubit(target: &Matrix4c) -> QtreeResult<[f64; DECOMPOSED_NODE_PARAMS]> {
    linalg::ensure_unitary(target, TARGET_UNITARY_TOLERANCE)?;

    let magic = magic_basis();
    let up = magic.adjoint() * linalg::to_special(target) * magic;
    let form = real_diagonalize(&(up.transpose() * up))?;
    let [a, b, c] = interaction_coefficients(&form.d);

    let mut best_fidelity: f64 = 0.0;
    for signs in SIGN_PATTERNS {
        let core = core_layers(signs[0] * a, signs[1] * b, signs[2] * c);
        let layers = match absorb_locals(&up, &form, &magic, &core) {
            Ok(layers) => layers,
            Err(err) => {
                debug!("sign pattern {:?} rejected: {}", signs, err);
                continue;
            }
        };

        let angles = layers_to_angles(&layers);
        let fidelity = linalg::phase_fidelity(&compose_node(&angles)?, target);
        if fidelity >= DECOMPOSITION_FIDELITY {
            trace!(
                "decomposed node, class ({:.4}, {:.4}, {:.4}), fidelity {:.12}",
                a,
                b,
                c,
                fidelity
            );
            return Ok(angles);
        }
        best_fidelity = best_fidelity.max(fidelity);
    }

    Err(QtreeError::DecompositionFailed(format!(
        "best fidelity {:.12} below {:.12}",
        best_fidelity, DECOMPOSITION_FIDELITY
    )))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::unitary_from_generator;
    use approx::assert_abs_diff_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::PI;

    fn assert_decomposes(target: &Matrix4c) {
        let angles = decompose_two_qubit(target).unwrap();
        let composed = compose_node(&angles).unwrap();
        assert!(linalg::phase_fidelity(&composed, target) >= DECOMPOSITION_FIDELITY);
    }

    #[test]
    fn test_zyz_roundtrip() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            let phase = Complex64::from_polar(1.0, rng.gen_range(-PI..PI));
            let u = (rz(rng.gen_range(-PI..PI)) * ry(rng.gen_range(0.0..PI)) * rz(rng.gen_range(-PI..PI)))
                .map(|z| z * phase);
            let back = zyz_matrix(zyz_angles(&u));
            assert_abs_diff_eq!(linalg::phase_fidelity(&back, &u), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zyz_special_cases() {
        let x = Matrix2c::new(
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
        );
        for u in [Matrix2c::identity(), hadamard(), x, rz(0.7)] {
            let back = zyz_matrix(zyz_angles(&u));
            assert_abs_diff_eq!(linalg::phase_fidelity(&back, &u), 1.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(zyz_angles(&ry(0.9))[1], 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_angles_compose_to_cnot() {
        let m = compose_node(&[0.0; DECOMPOSED_NODE_PARAMS]).unwrap();
        assert_abs_diff_eq!((m - cnot()).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compose_node_layout() {
        // y angle of the upper qubit in the last layer
        let mut angles = [0.0; DECOMPOSED_NODE_PARAMS];
        angles[19] = PI;
        let m = compose_node(&angles).unwrap();
        let expected = kron(&ry(PI), &Matrix2c::identity()) * cnot();
        assert_abs_diff_eq!(linalg::phase_fidelity(&m, &expected), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compose_node_length() {
        assert!(matches!(
            compose_node(&[0.0; 23]),
            Err(QtreeError::ParamLengthMismatch { expected: 24, actual: 23 })
        ));
    }

    #[test]
    fn test_magic_basis_is_unitary() {
        assert!(linalg::unitarity_deviation(&magic_basis()) < 1e-12);
    }

    #[test]
    fn test_split_kron() {
        let a = ry(0.3) * rz(0.2);
        let b = rz(1.0) * ry(-0.4);
        let (a2, b2) = split_kron(&kron(&a, &b)).unwrap();

        assert_abs_diff_eq!((kron(&a2, &b2) - kron(&a, &b)).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_permutations() {
        let perms = permutations();
        assert_eq!(perms.len(), 24);
        assert!(perms.contains(&[3, 1, 0, 2]));
        assert!(perms.contains(&[1, 3, 2, 0]));
        for perm in &perms {
            let mut sorted = *perm;
            sorted.sort_unstable();
            assert_eq!(sorted, [0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_decompose_haar_like_targets() {
        // Entries drawn on a wide scale reach every Weyl chamber region
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        for _ in 0..200 {
            let scale = rng.gen_range(0.1..20.0);
            let params: Vec<f64> = (0..16).map(|_| rng.gen_range(-scale..scale)).collect();
            assert_decomposes(&unitary_from_generator(&params).unwrap());
        }
    }

    #[test]
    fn test_split_kron_rejects_vanishing_block() {
        assert!(matches!(
            split_kron(&Matrix4c::zeros()),
            Err(QtreeError::DecompositionFailed(_))
        ));
    }

    #[test]
    fn test_decompose_standard_gates() {
        let swap = Matrix4c::from_fn(|r, c| {
            let swapped = ((r & 1) << 1) | (r >> 1);
            if swapped == c {
                Complex64::new(1.0, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            }
        });

        assert_decomposes(&Matrix4c::identity());
        assert_decomposes(&cnot());
        assert_decomposes(&swap);
        assert_decomposes(&kron(&hadamard(), &ry(0.4)));
    }

    #[test]
    fn test_decompose_random_targets() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        for _ in 0..25 {
            let params: Vec<f64> = (0..16).map(|_| rng.gen_range(-PI..PI)).collect();
            let target = unitary_from_generator(&params).unwrap();
            assert_decomposes(&target);
        }
    }

    #[test]
    fn test_decompose_composed_node() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let angles: Vec<f64> = (0..DECOMPOSED_NODE_PARAMS)
            .map(|_| rng.gen_range(0.0..2.0 * PI))
            .collect();
        assert_decomposes(&compose_node(&angles).unwrap());
    }

    #[test]
    fn test_decompose_rejects_non_unitary() {
        let m = Matrix4c::identity() * Complex64::new(2.0, 0.0);
        assert!(matches!(
            decompose_two_qubit(&m),
            Err(QtreeError::NonUnitary { .. })
        ));
    }
}
