//! Repeated-pole placement by characteristic-polynomial coefficient matching.
//!
//! Both gains are found by one routine. For state feedback the closed loop is
//! `A - B K`; for the observer the error dynamics are `A - L C`, which has the
//! same characteristic polynomial as the dual `A^T - C^T L^T`. Either way the
//! problem reduces to finding a row `g` with
//!
//! ```text
//! det(sI - F + b g) = (s - p)^3
//! ```
//!
//! for a 3x3 `F` and a column `b`. Writing `det(sI - F) = s^3 + a1 s^2 + a2 s + a3`,
//! the adjugate expansion gives
//!
//! ```text
//! det(sI - F + b g) = det(sI - F) + g (s^2 I + s (F + a1 I) + (F^2 + a1 F + a2 I)) b
//! ```
//!
//! so each coefficient is affine in `g` and the match is a 3x3 linear system.

use crate::error::{ControlError, ControlResult};
use nalgebra::{Complex, DMatrix, Matrix3, Vector3};
use pf_core::ensure_positive;
use serde::{Deserialize, Serialize};

const ORDER: usize = 3;

/// Relative size of an imaginary coefficient part still treated as rounding.
const IMAGINARY_TOLERANCE: f64 = 1e-9;

/// Which gain is being synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Synthesis {
    /// K (1x3) such that `A - B K` has the target poles. Coupling is B (3x1).
    StateFeedback,
    /// L (3x1) such that `A - L C` has the target poles. Coupling is C (1x3).
    Observer,
}

/// Result of a pole placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PolePlacement {
    pub synthesis: Synthesis,
    /// K as 1x3 or L as 3x1.
    pub gain: DMatrix<f64>,
    /// Eigenvalues of the open-loop A.
    pub original_poles: Vec<Complex<f64>>,
    /// Location of the triple closed-loop pole.
    pub target_pole: Complex<f64>,
}

impl PolePlacement {
    /// The three placed poles (all equal to the target).
    pub fn placed_poles(&self) -> [Complex<f64>; ORDER] {
        [self.target_pole; ORDER]
    }
}

/// Target location from the open-loop poles.
///
/// `p = -|mean(Re)| * poles_gain + j |mean(Im)| / poles_gain`
pub fn target_pole(poles: &[Complex<f64>], poles_gain: f64) -> Complex<f64> {
    let count = poles.len().max(1) as f64;
    let mean_re = poles.iter().map(|p| p.re).sum::<f64>() / count;
    let mean_im = poles.iter().map(|p| p.im).sum::<f64>() / count;
    Complex::new(-mean_re.abs() * poles_gain, mean_im.abs() / poles_gain)
}

/// Coefficients `[a1, a2, a3]` of `det(sI - F) = s^3 + a1 s^2 + a2 s + a3`.
pub fn characteristic_coefficients(f: &Matrix3<f64>) -> [f64; ORDER] {
    let principal_minors = f[(0, 0)] * f[(1, 1)] - f[(0, 1)] * f[(1, 0)]
        + f[(0, 0)] * f[(2, 2)]
        - f[(0, 2)] * f[(2, 0)]
        + f[(1, 1)] * f[(2, 2)]
        - f[(1, 2)] * f[(2, 1)];
    [-f.trace(), principal_minors, -f.determinant()]
}

/// Gain that places all three poles of the given pair at one location.
///
/// `coupling` is B (3x1) for [`Synthesis::StateFeedback`] and C (1x3) for
/// [`Synthesis::Observer`].
pub fn place_poles(
    a: &DMatrix<f64>,
    coupling: &DMatrix<f64>,
    synthesis: Synthesis,
    poles_gain: f64,
) -> ControlResult<PolePlacement> {
    ensure_positive(poles_gain, "poles_gain").map_err(|_| ControlError::InvalidArg {
        what: "poles_gain must be finite and positive",
    })?;
    let a3 = fixed_order(a)?;

    let (f, b) = match synthesis {
        Synthesis::StateFeedback => {
            if coupling.shape() != (ORDER, 1) {
                return Err(ControlError::Unsolvable {
                    what: format!(
                        "state feedback needs a single-input B (3x1), got {}x{}",
                        coupling.nrows(),
                        coupling.ncols()
                    ),
                });
            }
            (a3, Vector3::new(coupling[(0, 0)], coupling[(1, 0)], coupling[(2, 0)]))
        }
        Synthesis::Observer => {
            if coupling.shape() != (1, ORDER) {
                return Err(ControlError::Unsolvable {
                    what: format!(
                        "observer needs a single-output C (1x3), got {}x{}",
                        coupling.nrows(),
                        coupling.ncols()
                    ),
                });
            }
            (
                a3.transpose(),
                Vector3::new(coupling[(0, 0)], coupling[(0, 1)], coupling[(0, 2)]),
            )
        }
    };

    let original_poles: Vec<Complex<f64>> = a.complex_eigenvalues().iter().copied().collect();
    let target = target_pole(&original_poles, poles_gain);
    let desired = repeated_pole_coefficients(target)?;
    let g = match_coefficients(&f, &b, &desired)?;

    let gain = match synthesis {
        Synthesis::StateFeedback => DMatrix::from_row_slice(1, ORDER, g.as_slice()),
        Synthesis::Observer => DMatrix::from_column_slice(ORDER, 1, g.as_slice()),
    };

    Ok(PolePlacement {
        synthesis,
        gain,
        original_poles,
        target_pole: target,
    })
}

/// K for `u = -K x`.
pub fn state_feedback_gain(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    poles_gain: f64,
) -> ControlResult<PolePlacement> {
    place_poles(a, b, Synthesis::StateFeedback, poles_gain)
}

/// L for `x_est' = A x_est + B u + L (y - C x_est)`.
pub fn observer_gain(
    a: &DMatrix<f64>,
    c: &DMatrix<f64>,
    poles_gain: f64,
) -> ControlResult<PolePlacement> {
    place_poles(a, c, Synthesis::Observer, poles_gain)
}

fn fixed_order(a: &DMatrix<f64>) -> ControlResult<Matrix3<f64>> {
    if a.shape() != (ORDER, ORDER) {
        return Err(ControlError::Shape {
            matrix: "A",
            rows: a.nrows(),
            cols: a.ncols(),
            expected: "3x3",
        });
    }
    Ok(a.fixed_view::<3, 3>(0, 0).into_owned())
}

/// `(s - p)^3 = s^3 - 3p s^2 + 3p^2 s - p^3`, which must have real coefficients.
fn repeated_pole_coefficients(p: Complex<f64>) -> ControlResult<[f64; ORDER]> {
    let coeffs = [-3.0 * p, 3.0 * p * p, -(p * p * p)];
    let mut out = [0.0; ORDER];
    for (slot, c) in out.iter_mut().zip(coeffs) {
        if c.im.abs() > IMAGINARY_TOLERANCE * c.norm().max(1.0) {
            return Err(ControlError::Unsolvable {
                what: format!(
                    "target pole {p} gives complex polynomial coefficients; no real gain exists"
                ),
            });
        }
        *slot = c.re;
    }
    Ok(out)
}

/// Solve `W g^T = desired - open` with rows `b`, `(F + a1 I) b`, `(F^2 + a1 F + a2 I) b`.
fn match_coefficients(
    f: &Matrix3<f64>,
    b: &Vector3<f64>,
    desired: &[f64; ORDER],
) -> ControlResult<Vector3<f64>> {
    let [a1, a2, a3] = characteristic_coefficients(f);
    let identity = Matrix3::<f64>::identity();
    let first = f + identity * a1;
    let second = f * f + f * a1 + identity * a2;

    let w = Matrix3::from_rows(&[
        b.transpose(),
        (first * b).transpose(),
        (second * b).transpose(),
    ]);
    let rhs = Vector3::new(desired[0] - a1, desired[1] - a2, desired[2] - a3);

    let g = w
        .full_piv_lu()
        .solve(&rhs)
        .ok_or_else(|| ControlError::Unsolvable {
            what: "coefficient matching system is singular (pair is not controllable/observable)"
                .to_string(),
        })?;

    if g.iter().any(|v| !v.is_finite()) {
        return Err(ControlError::Unsolvable {
            what: "coefficient matching produced non-finite gains".to_string(),
        });
    }
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_pole_follows_mean_rule() {
        let poles = [
            Complex::new(-1.0, 2.0),
            Complex::new(-1.0, -2.0),
            Complex::new(-4.0, 0.0),
        ];
        let p = target_pole(&poles, 10.0);
        assert!((p.re + 20.0).abs() < 1e-12);
        assert!(p.im.abs() < 1e-12);

        let skewed = [Complex::new(1.0, 3.0), Complex::new(2.0, 0.0), Complex::new(0.0, 0.0)];
        let p = target_pole(&skewed, 2.0);
        assert!((p.re + 2.0).abs() < 1e-12);
        assert!((p.im - 0.5).abs() < 1e-12);
    }

    #[test]
    fn characteristic_coefficients_of_companion() {
        // Companion matrix of s^3 + 6 s^2 + 11 s + 6.
        let f = Matrix3::new(0.0, 1.0, 0.0, 0.0, 0.0, 1.0, -6.0, -11.0, -6.0);
        let c = characteristic_coefficients(&f);
        assert!((c[0] - 6.0).abs() < 1e-12);
        assert!((c[1] - 11.0).abs() < 1e-12);
        assert!((c[2] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn companion_form_gain_is_coefficient_difference() {
        // For a companion pair with b = e3, K is the difference of the
        // reversed coefficient vectors.
        let a = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 0.0, 0.0, 0.0, 1.0, -6.0, -11.0, -6.0]);
        let b = DMatrix::from_row_slice(3, 1, &[0.0, 0.0, 1.0]);
        let placement = state_feedback_gain(&a, &b, 1.0).unwrap();

        // Poles -1, -2, -3: mean -2, target p = -2.
        assert!((placement.target_pole.re + 2.0).abs() < 1e-9);
        // (s + 2)^3 = s^3 + 6 s^2 + 12 s + 8
        let k = &placement.gain;
        assert_eq!(k.shape(), (1, 3));
        assert!((k[(0, 0)] - 2.0).abs() < 1e-9);
        assert!((k[(0, 1)] - 1.0).abs() < 1e-9);
        assert!(k[(0, 2)].abs() < 1e-9);
    }

    #[test]
    fn complex_target_has_no_real_gain() {
        let err = repeated_pole_coefficients(Complex::new(-1.0, 0.5)).unwrap_err();
        assert!(matches!(err, ControlError::Unsolvable { .. }));
    }

    #[test]
    fn multi_input_coupling_is_unsolvable() {
        let a = DMatrix::identity(3, 3);
        let b = DMatrix::zeros(3, 2);
        assert!(matches!(
            state_feedback_gain(&a, &b, 2.0),
            Err(ControlError::Unsolvable { .. })
        ));
        let c = DMatrix::identity(3, 3);
        assert!(matches!(
            observer_gain(&a, &c, 2.0),
            Err(ControlError::Unsolvable { .. })
        ));
    }

    #[test]
    fn non_positive_poles_gain_is_rejected() {
        let a = DMatrix::identity(3, 3);
        let b = DMatrix::from_row_slice(3, 1, &[0.0, 0.0, 1.0]);
        assert!(matches!(
            state_feedback_gain(&a, &b, 0.0),
            Err(ControlError::InvalidArg { .. })
        ));
        assert!(matches!(
            state_feedback_gain(&a, &b, f64::NAN),
            Err(ControlError::InvalidArg { .. })
        ));
    }
}
