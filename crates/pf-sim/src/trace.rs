//! Recorded simulation output.

use nalgebra::DVector;

/// One recorded step.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSample {
    /// Time (s)
    pub t: f64,
    /// Plant state at `t`
    pub x: DVector<f64>,
    /// Input applied over the step that ended at `t`; zero at t0
    pub u: f64,
    /// Estimate at `t`, when an estimator runs
    pub x_est: Option<DVector<f64>>,
}

/// Append-only sequence of samples in time order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationTrace {
    samples: Vec<TraceSample>,
}

impl SimulationTrace {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: TraceSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[TraceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&TraceSample> {
        self.samples.last()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.t).collect()
    }

    pub fn inputs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.u).collect()
    }

    /// Series of state component `index` (x[0] position, x[1] speed, x[2] pressure).
    pub fn component(&self, index: usize) -> Vec<f64> {
        self.samples
            .iter()
            .map(|s| s.x.get(index).copied().unwrap_or(f64::NAN))
            .collect()
    }

    /// Index and time of the first sample holding a NaN or infinity.
    ///
    /// Divergence is not an error during integration; this is the post-hoc check.
    pub fn first_non_finite(&self) -> Option<(usize, f64)> {
        self.samples
            .iter()
            .position(|s| {
                !s.u.is_finite()
                    || s.x.iter().any(|v| !v.is_finite())
                    || s
                        .x_est
                        .as_ref()
                        .is_some_and(|e| e.iter().any(|v| !v.is_finite()))
            })
            .map(|i| (i, self.samples[i].t))
    }

    /// `|x - x_est|` per sample; empty when no estimator ran.
    pub fn estimation_error_norms(&self) -> Vec<f64> {
        self.samples
            .iter()
            .filter_map(|s| s.x_est.as_ref().map(|e| (&s.x - e).norm()))
            .collect()
    }
}
