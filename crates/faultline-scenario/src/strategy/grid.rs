//! Deterministic Cartesian grid

use super::{push, Context};
use faultline_core::{CoreError, FeatureKind, FeatureSpec, Scenario, ScenarioStrategy, Value};
use std::collections::BTreeMap;

/// Evenly spaced levels of one feature
fn levels_of(spec: &FeatureSpec, levels: usize) -> Vec<Value> {
    match spec.bounds() {
        Some((lo, hi)) => {
            let mut points: Vec<f64> = if levels == 1 {
                vec![spec.clamp(lo + (hi - lo) / 2.0)]
            } else {
                let step = (hi - lo) / (levels - 1) as f64;
                (0..levels).map(|i| spec.clamp(lo + step * i as f64)).collect()
            };
            if spec.kind == FeatureKind::Discrete || hi == lo {
                points.dedup();
            }
            points.into_iter().map(Value::Number).collect()
        }
        None => spec.categories.iter().take(levels).cloned().collect(),
    }
}

/// Emit the full product of per-feature levels; fails when it exceeds `limit`
pub(crate) fn grid(
    ctx: &Context<'_>,
    levels: usize,
    limit: usize,
    out: &mut Vec<Scenario>,
) -> crate::Result<()> {
    if levels == 0 {
        return Err(CoreError::configuration("grid", "levels must be at least 1"));
    }
    let axes: Vec<(&str, Vec<Value>)> = ctx
        .specs
        .iter()
        .map(|spec| (spec.name.as_str(), levels_of(spec, levels)))
        .collect();

    let total = axes
        .iter()
        .try_fold(1usize, |acc, (_, values)| acc.checked_mul(values.len()))
        .filter(|total| *total <= limit)
        .ok_or_else(|| {
            CoreError::configuration(
                "grid",
                format!(
                    "{} features at {} levels exceed the scenario limit of {}",
                    axes.len(),
                    levels,
                    limit
                ),
            )
        })?;

    tracing::debug!("Grid over {} features: {} scenarios", axes.len(), total);

    // Odometer over axis positions, last axis fastest
    let mut cursor = vec![0usize; axes.len()];
    for _ in 0..total {
        let values: BTreeMap<String, Value> = axes
            .iter()
            .zip(&cursor)
            .map(|((name, values), &i)| (name.to_string(), values[i].clone()))
            .collect();
        push(out, ScenarioStrategy::Grid, values);

        for axis in (0..axes.len()).rev() {
            cursor[axis] += 1;
            if cursor[axis] < axes[axis].1.len() {
                break;
            }
            cursor[axis] = 0;
        }
    }
    Ok(())
}
