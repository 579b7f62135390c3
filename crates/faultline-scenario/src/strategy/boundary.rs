//! Boundary walk
//!
//! Features are pinned one at a time: numeric features to their minimum,
//! their maximum, and a triple around each rule threshold; categorical
//! features to their first and last category. Values of one pin group share
//! the same background draw, so a threshold triple differs in exactly one
//! feature.

use super::{push, Context};
use faultline_core::{FeatureKind, FeatureSpec, Scenario, ScenarioStrategy, Value};
use rand::Rng;

/// Values one feature is pinned to over one background draw
struct Pin<'a> {
    spec: &'a FeatureSpec,
    values: Vec<Value>,
}

fn pins<'a>(ctx: &Context<'a>) -> Vec<Pin<'a>> {
    let mut pins = Vec::new();
    for spec in ctx.specs {
        match spec.bounds() {
            Some((lo, hi)) => {
                pins.push(Pin {
                    spec,
                    values: vec![Value::Number(spec.clamp(lo))],
                });
                pins.push(Pin {
                    spec,
                    values: vec![Value::Number(spec.clamp(hi))],
                });

                let offset = match spec.kind {
                    FeatureKind::Discrete => 1.0,
                    _ => ctx.config.threshold_offset * (hi - lo),
                };
                for t in ctx.thresholds_in_range(spec) {
                    let mut values: Vec<f64> = vec![
                        spec.clamp(t - offset),
                        spec.clamp(t),
                        spec.clamp(t + offset),
                    ];
                    values.dedup();
                    pins.push(Pin {
                        spec,
                        values: values.into_iter().map(Value::Number).collect(),
                    });
                }
            }
            None => {
                let edges = match spec.categories.as_slice() {
                    [] => Vec::new(),
                    [only] => vec![only],
                    [first, .., last] => vec![first, last],
                };
                for category in edges {
                    pins.push(Pin {
                        spec,
                        values: vec![category.clone()],
                    });
                }
            }
        }
    }
    pins
}

pub(crate) fn boundary<R: Rng + ?Sized>(
    ctx: &Context<'_>,
    count: usize,
    rng: &mut R,
    out: &mut Vec<Scenario>,
) {
    let pins = pins(ctx);
    if pins.is_empty() {
        return;
    }
    let target = out.len() + count;
    for pin in pins.iter().cycle() {
        let background = ctx.background(rng);
        for value in &pin.values {
            if out.len() == target {
                return;
            }
            let mut values = background.clone();
            values.insert(pin.spec.name.clone(), value.clone());
            push(out, ScenarioStrategy::Boundary, values);
        }
    }
}
