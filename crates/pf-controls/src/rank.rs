//! Controllability and observability rank tests.
//!
//! Both matrices are built from exactly four blocks (`B, AB, A^2 B, A^3 B`
//! and `C; CA; CA^2; CA^3`). For the fixed third-order plant this is one
//! block more than needed; the extra block cannot raise the rank past n.

use crate::error::{ControlError, ControlResult};
use nalgebra::DMatrix;

/// Number of Krylov blocks stacked into the test matrices.
pub const KRYLOV_BLOCKS: usize = 4;

/// Numerical rank from the singular values.
///
/// Singular values below `s_max * max(rows, cols) * eps` count as zero.
pub fn matrix_rank(m: &DMatrix<f64>) -> usize {
    if m.is_empty() {
        return 0;
    }
    let sv = m.singular_values();
    let s_max = sv.max();
    if s_max <= 0.0 {
        return 0;
    }
    let tol = s_max * (m.nrows().max(m.ncols()) as f64) * f64::EPSILON;
    sv.iter().filter(|s| **s > tol).count()
}

/// `[B, AB, A^2 B, A^3 B]`, n x 4m.
pub fn controllability_matrix(a: &DMatrix<f64>, b: &DMatrix<f64>) -> ControlResult<DMatrix<f64>> {
    check_square(a)?;
    if b.nrows() != a.nrows() || b.ncols() == 0 {
        return Err(ControlError::Shape {
            matrix: "B",
            rows: b.nrows(),
            cols: b.ncols(),
            expected: "n x m with n rows matching A",
        });
    }

    let n = a.nrows();
    let m = b.ncols();
    let mut out = DMatrix::zeros(n, KRYLOV_BLOCKS * m);
    let mut block = b.clone();
    for i in 0..KRYLOV_BLOCKS {
        out.view_mut((0, i * m), (n, m)).copy_from(&block);
        block = a * &block;
    }
    Ok(out)
}

/// `[C; CA; CA^2; CA^3]`, 4k x n.
pub fn observability_matrix(a: &DMatrix<f64>, c: &DMatrix<f64>) -> ControlResult<DMatrix<f64>> {
    check_square(a)?;
    if c.ncols() != a.ncols() || c.nrows() == 0 {
        return Err(ControlError::Shape {
            matrix: "C",
            rows: c.nrows(),
            cols: c.ncols(),
            expected: "k x n with n columns matching A",
        });
    }

    let n = a.ncols();
    let k = c.nrows();
    let mut out = DMatrix::zeros(KRYLOV_BLOCKS * k, n);
    let mut block = c.clone();
    for i in 0..KRYLOV_BLOCKS {
        out.view_mut((i * k, 0), (k, n)).copy_from(&block);
        block = &block * a;
    }
    Ok(out)
}

/// True when the controllability matrix has full row rank.
pub fn is_controllable(a: &DMatrix<f64>, b: &DMatrix<f64>) -> ControlResult<bool> {
    let ctrb = controllability_matrix(a, b)?;
    Ok(matrix_rank(&ctrb) == a.nrows())
}

/// True when the observability matrix has full column rank.
pub fn is_observable(a: &DMatrix<f64>, c: &DMatrix<f64>) -> ControlResult<bool> {
    let obsv = observability_matrix(a, c)?;
    Ok(matrix_rank(&obsv) == a.nrows())
}

fn check_square(a: &DMatrix<f64>) -> ControlResult<()> {
    if a.nrows() == a.ncols() && a.nrows() > 0 {
        Ok(())
    } else {
        Err(ControlError::Shape {
            matrix: "A",
            rows: a.nrows(),
            cols: a.ncols(),
            expected: "non-empty square",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> DMatrix<f64> {
        // Triple integrator.
        DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0])
    }

    #[test]
    fn rank_of_identity_and_zero() {
        assert_eq!(matrix_rank(&DMatrix::identity(3, 3)), 3);
        assert_eq!(matrix_rank(&DMatrix::zeros(3, 4)), 0);
        assert_eq!(matrix_rank(&DMatrix::zeros(0, 0)), 0);
    }

    #[test]
    fn rank_treats_rounding_noise_as_zero() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0 + 1e-17]);
        assert_eq!(matrix_rank(&m), 1);
    }

    #[test]
    fn controllability_matrix_has_four_blocks() {
        let b = DMatrix::from_row_slice(3, 1, &[0.0, 0.0, 1.0]);
        let ctrb = controllability_matrix(&chain(), &b).unwrap();
        // [b, Ab, A^2 b, A^3 b] for the chain: e3, e2, e1, 0.
        #[rustfmt::skip]
        let expected = DMatrix::from_row_slice(3, 4, &[
            0.0, 0.0, 1.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            1.0, 0.0, 0.0, 0.0,
        ]);
        assert_eq!(ctrb, expected);
        assert!(is_controllable(&chain(), &b).unwrap());
    }

    #[test]
    fn input_at_head_of_chain_is_not_controllable() {
        let b = DMatrix::from_row_slice(3, 1, &[1.0, 0.0, 0.0]);
        assert!(!is_controllable(&chain(), &b).unwrap());
    }

    #[test]
    fn observability_matrix_has_four_blocks() {
        let c = DMatrix::from_row_slice(1, 3, &[1.0, 0.0, 0.0]);
        let obsv = observability_matrix(&chain(), &c).unwrap();
        assert_eq!(obsv.shape(), (4, 3));
        assert!(is_observable(&chain(), &c).unwrap());

        let tail = DMatrix::from_row_slice(1, 3, &[0.0, 0.0, 1.0]);
        assert!(!is_observable(&chain(), &tail).unwrap());
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let b = DMatrix::zeros(2, 1);
        assert!(matches!(
            is_controllable(&chain(), &b),
            Err(ControlError::Shape { matrix: "B", .. })
        ));
        let a = DMatrix::zeros(2, 3);
        assert!(matches!(
            is_observable(&a, &DMatrix::zeros(1, 3)),
            Err(ControlError::Shape { matrix: "A", .. })
        ));
    }
}
