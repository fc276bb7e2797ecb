//! Feedforward gain for reference tracking.
//!
//! Solves
//!
//! ```text
//! [A B] [Nx]   [0]
//! [C D] [Nu] = [I]
//! ```
//!
//! so that `x* = Nx r` and `u* = Nu r` is an equilibrium with `y = r`, then
//! folds the state feedback in: `N = Nu + K Nx`, giving `u = N r - K x`.

use crate::error::{ControlError, ControlResult};
use nalgebra::DMatrix;

/// Feedforward gain and its equilibrium components.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceGain {
    /// N (r x r).
    pub n: DMatrix<f64>,
    /// Equilibrium state per unit reference (n x r).
    pub nx: DMatrix<f64>,
    /// Equilibrium input per unit reference (r x r).
    pub nu: DMatrix<f64>,
}

/// Compute N from the tracked-output model and the feedback gain K.
///
/// `c` and `d` must hold only the tracked output rows; their row count is the
/// reference dimension r, which must equal the input count.
pub fn reference_gain(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    c: &DMatrix<f64>,
    d: &DMatrix<f64>,
    k: &DMatrix<f64>,
) -> ControlResult<ReferenceGain> {
    let n = a.nrows();
    let r = c.nrows();
    check("A", a, a.ncols() == n && n > 0, "non-empty square")?;
    check("B", b, b.nrows() == n && b.ncols() == r, "n x r")?;
    check("C", c, c.ncols() == n && r > 0, "r x n")?;
    check("D", d, d.shape() == (r, r), "r x r")?;
    check("K", k, k.shape() == (r, n), "r x n")?;

    let mut extended = DMatrix::<f64>::zeros(n + r, n + r);
    extended.view_mut((0, 0), (n, n)).copy_from(a);
    extended.view_mut((0, n), (n, r)).copy_from(b);
    extended.view_mut((n, 0), (r, n)).copy_from(c);
    extended.view_mut((n, n), (r, r)).copy_from(d);

    let mut rhs = DMatrix::<f64>::zeros(n + r, r);
    rhs.view_mut((n, 0), (r, r)).fill_with_identity();

    let inverse = extended
        .try_inverse()
        .ok_or_else(|| ControlError::Singular {
            stage: "reference gain",
            what: "extended matrix [[A, B], [C, D]] is not invertible".to_string(),
        })?;
    let solution = inverse * rhs;
    if solution.iter().any(|v| !v.is_finite()) {
        return Err(ControlError::Singular {
            stage: "reference gain",
            what: "inverting [[A, B], [C, D]] produced non-finite values".to_string(),
        });
    }

    let nx = solution.rows(0, n).into_owned();
    let nu = solution.rows(n, r).into_owned();
    let n_gain = &nu + k * &nx;

    Ok(ReferenceGain {
        n: n_gain,
        nx,
        nu,
    })
}

fn check(
    matrix: &'static str,
    m: &DMatrix<f64>,
    ok: bool,
    expected: &'static str,
) -> ControlResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ControlError::Shape {
            matrix,
            rows: m.nrows(),
            cols: m.ncols(),
            expected,
        })
    }
}
