//! Dense unitary synthesis for composite nodes
//!
//! Gantree: L2_Synthesis → UnitarySynthesis
//!
//! Sixteen reals define a Hermitian generator `H`; the node unitary is
//! `exp(iH) = V·exp(iD)·Vᴴ` from the Hermitian eigendecomposition `H = V D Vᴴ`.

use crate::constants::numerics::{EIGEN_EPS, EIGEN_MAX_ITER, UNITARY_TOLERANCE};
use crate::constants::tree::COMPOSITE_NODE_PARAMS;
use crate::error::{QtreeError, QtreeResult};
use crate::linalg::{self, Matrix4c};
use log::trace;
use nalgebra::linalg::SymmetricEigen;
use num_complex::Complex64;

/// Upper-triangle index pairs in row-major order
pub const UPPER_PAIRS: [(usize, usize); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];

/// Hermitian generator from 16 reals: 4 diagonal entries, then the real
/// parts and the imaginary parts of the 6 upper-triangle entries
/// Gantree: hermitian_generator(params) -> Result<Matrix4c> // 에르미트 생성자
pub fn hermitian_generator(params: &[f64]) -> QtreeResult<Matrix4c> {
    if params.len() != COMPOSITE_NODE_PARAMS {
        return Err(QtreeError::ParamLengthMismatch {
            expected: COMPOSITE_NODE_PARAMS,
            actual: params.len(),
        });
    }

    let mut h = Matrix4c::zeros();
    for i in 0..4 {
        h[(i, i)] = Complex64::new(params[i], 0.0);
    }
    for (k, &(i, j)) in UPPER_PAIRS.iter().enumerate() {
        let z = Complex64::new(params[4 + k], params[10 + k]);
        h[(i, j)] = z;
        h[(j, i)] = z.conj();
    }
    Ok(h)
}

/// Unitary `exp(iH)` for the generator described by `params`
/// Gantree: unitary_from_generator(params) -> Result<Matrix4c> // 유니터리 합성
pub fn unitary_from_generator(params: &[f64]) -> QtreeResult<Matrix4c> {
    let h = hermitian_generator(params)?;

    let eigen = SymmetricEigen::try_new(h, EIGEN_EPS, EIGEN_MAX_ITER).ok_or_else(|| {
        QtreeError::EigenDecompositionFailed(format!(
            "Hermitian eigensolver did not converge within {} iterations",
            EIGEN_MAX_ITER
        ))
    })?;

    let v = eigen.eigenvectors;
    let phases = Matrix4c::from_diagonal(&eigen.eigenvalues.map(|l| Complex64::from_polar(1.0, l)));
    let u = v * phases * v.adjoint();

    linalg::ensure_unitary(&u, UNITARY_TOLERANCE)?;
    trace!("synthesized node unitary, eigenvalues {:?}", eigen.eigenvalues.as_slice());
    Ok(u)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generator_is_hermitian() {
        let params: Vec<f64> = (0..16).map(|i| i as f64 * 0.1 - 0.7).collect();
        let h = hermitian_generator(&params).unwrap();

        assert_abs_diff_eq!((h - h.adjoint()).norm(), 0.0, epsilon = 1e-15);
        assert_eq!(h[(0, 0)], Complex64::new(-0.7, 0.0));
        // pair (1, 3) is the fifth upper entry
        assert_eq!(h[(1, 3)], Complex64::new(params[8], params[14]));
        assert_eq!(h[(3, 1)], Complex64::new(params[8], -params[14]));
    }

    #[test]
    fn test_zero_generator_is_identity() {
        let u = unitary_from_generator(&[0.0; 16]).unwrap();
        assert_abs_diff_eq!((u - Matrix4c::identity()).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_diagonal_generator() {
        let mut params = [0.0; 16];
        params[..4].copy_from_slice(&[0.1, 0.2, 0.3, 0.4]);
        let u = unitary_from_generator(&params).unwrap();

        for i in 0..4 {
            let expected = Complex64::from_polar(1.0, params[i]);
            assert_abs_diff_eq!((u[(i, i)] - expected).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_random_generators_are_unitary() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let params: Vec<f64> = (0..16).map(|_| rng.gen_range(-3.0..3.0)).collect();
            let u = unitary_from_generator(&params).unwrap();
            assert!(linalg::unitarity_deviation(&u) < UNITARY_TOLERANCE);
        }
    }

    #[test]
    fn test_wrong_length() {
        assert!(matches!(
            unitary_from_generator(&[0.0; 15]),
            Err(QtreeError::ParamLengthMismatch { expected: 16, actual: 15 })
        ));
    }
}
