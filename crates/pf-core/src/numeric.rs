use crate::PfError;

/// `|a - b| <= rel * max(|a|, |b|)`; exact equality always passes.
pub fn within_relative(a: f64, b: f64, rel: f64) -> bool {
    a == b || (a - b).abs() <= rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, PfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PfError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: f64, what: &'static str) -> Result<f64, PfError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(PfError::NonPositive { what, value: v })
    }
}
