//! Per-feature sampling

use faultline_core::{Distribution, FeatureKind, FeatureSpec, Value};
use rand::Rng;
use rand_distr::{Distribution as _, Exp, Normal};

/// Draw a "typical" value for `spec` from its declared distribution
pub fn sample<R: Rng + ?Sized>(spec: &FeatureSpec, rng: &mut R) -> Value {
    match spec.kind {
        FeatureKind::Categorical => {
            let index = rng.gen_range(0..spec.categories.len().max(1));
            spec.categories.get(index).cloned().unwrap_or(Value::Null)
        }
        FeatureKind::Continuous | FeatureKind::Discrete => {
            Value::Number(sample_number(spec, rng))
        }
    }
}

/// Draw a numeric value, clamped (and for discrete features, rounded)
pub fn sample_number<R: Rng + ?Sized>(spec: &FeatureSpec, rng: &mut R) -> f64 {
    let Some((lo, hi)) = spec.bounds() else {
        return 0.0;
    };
    let span = hi - lo;
    let raw = match &spec.distribution {
        Distribution::Uniform if spec.kind == FeatureKind::Discrete => {
            let (lo_i, hi_i) = (lo.ceil() as i64, hi.floor() as i64);
            rng.gen_range(lo_i..=hi_i) as f64
        }
        Distribution::Uniform => {
            if span > 0.0 {
                rng.gen_range(lo..=hi)
            } else {
                lo
            }
        }
        Distribution::Normal { mean, std } => {
            let mean = mean.unwrap_or(lo + span / 2.0);
            let std = std.unwrap_or(span / 6.0);
            match Normal::new(mean, std) {
                Ok(normal) if std > 0.0 => normal.sample(rng),
                _ => mean,
            }
        }
        Distribution::Exponential { scale } => {
            let scale = scale.unwrap_or(span / 3.0);
            match Exp::new(1.0 / scale) {
                Ok(exp) if scale > 0.0 => lo + exp.sample(rng),
                _ => lo,
            }
        }
    };
    spec.clamp(raw)
}

/// Gaussian noise with standard deviation `std`; zero when `std` is not positive
pub fn jitter<R: Rng + ?Sized>(std: f64, rng: &mut R) -> f64 {
    match Normal::new(0.0, std) {
        Ok(normal) if std > 0.0 => normal.sample(rng),
        _ => 0.0,
    }
}
