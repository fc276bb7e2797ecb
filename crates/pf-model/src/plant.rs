//! Continuous-time state-space model of the plant.

use crate::error::{ModelError, ModelResult};
use crate::params::PhysicalParameters;
use nalgebra::{Complex, DMatrix};
use serde::{Deserialize, Serialize};

/// Number of states: mass position, mass velocity, tank pressure.
pub const STATE_DIM: usize = 3;

/// Which plant states appear in the output vector y = C x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObservedOutputs {
    /// C = I(3): every state is measured.
    #[default]
    FullState,
    /// C = [1 0 0]: only the mass position is measured.
    MassPosition,
}

impl ObservedOutputs {
    pub fn output_matrix(self) -> DMatrix<f64> {
        match self {
            ObservedOutputs::FullState => DMatrix::identity(STATE_DIM, STATE_DIM),
            ObservedOutputs::MassPosition => DMatrix::from_row_slice(1, STATE_DIM, &[1.0, 0.0, 0.0]),
        }
    }
}

/// Lumped coefficients of the coupled equations
/// `_A x'' + _B x' + _C x - P = 0` and `P' = -_D x' + _E u`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CouplingCoefficients {
    /// `_A`: mass per piston area plus the pipe fluid column inertia.
    pub inertia: f64,
    /// `_B`: damping per piston area.
    pub damping: f64,
    /// `_C`: stiffness per piston area.
    pub stiffness: f64,
    /// `_D`: tank pressure rise per unit piston velocity.
    pub displacement_gain: f64,
    /// `_E`: tank pressure rise per unit commanded flow.
    pub flow_gain: f64,
}

impl CouplingCoefficients {
    pub fn from_parameters(p: &PhysicalParameters) -> Self {
        Self {
            inertia: p.mass / p.piston_area
                + p.pipe_fluid_density * p.pipe_length * p.piston_area / p.pipe_section_area,
            damping: p.damping_constant / p.piston_area,
            stiffness: p.spring_constant / p.piston_area,
            displacement_gain: p.piston_area * p.tank_fluid_density * p.gravity / p.tank_area,
            flow_gain: p.tank_fluid_density * p.gravity / p.tank_area,
        }
    }
}

/// Linear model `x' = A x + B u`, `y = C x + D u`.
///
/// A is 3x3, B is 3x1, C is k x 3 and D is k x 1 with 1 <= k <= 3.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpaceModel {
    a: DMatrix<f64>,
    b: DMatrix<f64>,
    c: DMatrix<f64>,
    d: DMatrix<f64>,
}

impl StateSpaceModel {
    /// Derive the plant matrices from physical parameters.
    pub fn derive(params: &PhysicalParameters, outputs: ObservedOutputs) -> ModelResult<Self> {
        params.validate()?;
        let coeffs = CouplingCoefficients::from_parameters(params);
        Ok(Self::from_coefficients(&coeffs, outputs))
    }

    fn from_coefficients(k: &CouplingCoefficients, outputs: ObservedOutputs) -> Self {
        #[rustfmt::skip]
        let a = DMatrix::from_row_slice(3, 3, &[
            0.0,                      1.0,                   0.0,
            -k.stiffness / k.inertia, -k.damping / k.inertia, 1.0 / k.inertia,
            0.0,                      -k.displacement_gain,  0.0,
        ]);
        let b = DMatrix::from_row_slice(3, 1, &[0.0, 0.0, k.flow_gain]);
        let c = outputs.output_matrix();
        let d = DMatrix::zeros(c.nrows(), 1);
        Self { a, b, c, d }
    }

    /// Build a model from explicit matrices, checking the fixed
    /// third-order, single-input shapes.
    pub fn from_matrices(
        a: DMatrix<f64>,
        b: DMatrix<f64>,
        c: DMatrix<f64>,
        d: DMatrix<f64>,
    ) -> ModelResult<Self> {
        check_shape("A", &a, a.nrows() == STATE_DIM && a.ncols() == STATE_DIM, "3x3")?;
        check_shape("B", &b, b.nrows() == STATE_DIM && b.ncols() == 1, "3x1")?;
        check_shape(
            "C",
            &c,
            (1..=STATE_DIM).contains(&c.nrows()) && c.ncols() == STATE_DIM,
            "kx3 with 1 <= k <= 3",
        )?;
        check_shape("D", &d, d.nrows() == c.nrows() && d.ncols() == 1, "kx1 matching C")?;
        Ok(Self { a, b, c, d })
    }

    /// Same plant with a different output selection.
    pub fn with_outputs(&self, outputs: ObservedOutputs) -> Self {
        let c = outputs.output_matrix();
        let d = DMatrix::zeros(c.nrows(), 1);
        Self {
            a: self.a.clone(),
            b: self.b.clone(),
            c,
            d,
        }
    }

    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    pub fn b(&self) -> &DMatrix<f64> {
        &self.b
    }

    pub fn c(&self) -> &DMatrix<f64> {
        &self.c
    }

    pub fn d(&self) -> &DMatrix<f64> {
        &self.d
    }

    /// First output row (mass position), the output tracked by the reference.
    pub fn tracked_output(&self) -> DMatrix<f64> {
        self.c.rows(0, 1).into_owned()
    }

    /// Feedthrough row matching [`Self::tracked_output`].
    pub fn tracked_feedthrough(&self) -> DMatrix<f64> {
        self.d.rows(0, 1).into_owned()
    }

    pub fn state_dim(&self) -> usize {
        self.a.nrows()
    }

    pub fn input_dim(&self) -> usize {
        self.b.ncols()
    }

    pub fn output_dim(&self) -> usize {
        self.c.nrows()
    }

    /// Eigenvalues of A.
    pub fn open_loop_poles(&self) -> Vec<Complex<f64>> {
        self.a.complex_eigenvalues().iter().copied().collect()
    }
}

fn check_shape(
    matrix: &'static str,
    m: &DMatrix<f64>,
    ok: bool,
    expected: &'static str,
) -> ModelResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ModelError::Shape {
            matrix,
            rows: m.nrows(),
            cols: m.ncols(),
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_matrices() {
        assert_eq!(
            ObservedOutputs::FullState.output_matrix(),
            DMatrix::<f64>::identity(3, 3)
        );
        let c = ObservedOutputs::MassPosition.output_matrix();
        assert_eq!(c.shape(), (1, 3));
        assert_eq!(c[(0, 0)], 1.0);
    }

    #[test]
    fn from_matrices_rejects_bad_shapes() {
        let a = DMatrix::zeros(3, 3);
        let b = DMatrix::zeros(3, 2);
        let c = DMatrix::zeros(1, 3);
        let d = DMatrix::zeros(1, 1);
        let err = StateSpaceModel::from_matrices(a, b, c, d).unwrap_err();
        assert!(matches!(err, ModelError::Shape { matrix: "B", .. }));
    }

    #[test]
    fn from_matrices_rejects_mismatched_feedthrough() {
        let err = StateSpaceModel::from_matrices(
            DMatrix::zeros(3, 3),
            DMatrix::zeros(3, 1),
            DMatrix::identity(3, 3),
            DMatrix::zeros(1, 1),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Shape { matrix: "D", .. }));
    }
}
