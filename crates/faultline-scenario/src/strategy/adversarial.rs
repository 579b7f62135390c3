//! Adversarial stacking
//!
//! Several features at once are placed near the values rules compare
//! against, with small Gaussian jitter, to provoke rule conflicts.

use super::{push, Context};
use crate::sampling;
use faultline_core::{FeatureKind, FeatureSpec, Scenario, ScenarioStrategy, Value};
use rand::seq::index;
use rand::Rng;

fn near_threshold<R: Rng + ?Sized>(ctx: &Context<'_>, spec: &FeatureSpec, rng: &mut R) -> Value {
    match spec.bounds() {
        Some((lo, hi)) => {
            let mut anchors = ctx.thresholds_in_range(spec);
            if anchors.is_empty() {
                anchors = vec![lo, hi];
            }
            let anchor = anchors[rng.gen_range(0..anchors.len())];
            let std = match spec.kind {
                FeatureKind::Discrete => (ctx.config.adversarial_jitter * (hi - lo)).max(1.0),
                _ => ctx.config.adversarial_jitter * (hi - lo),
            };
            Value::Number(spec.clamp(anchor + sampling::jitter(std, rng)))
        }
        None => {
            let named: Vec<&Value> = ctx
                .thresholds
                .categorical(&spec.name)
                .iter()
                .filter(|v| spec.categories.iter().any(|c| c.loose_eq(v)))
                .collect();
            let pool: Vec<&Value> = if named.is_empty() {
                spec.categories.first().into_iter().chain(spec.categories.last()).collect()
            } else {
                named
            };
            if pool.is_empty() {
                return Value::Null;
            }
            pool[rng.gen_range(0..pool.len())].clone()
        }
    }
}

pub(crate) fn adversarial<R: Rng + ?Sized>(
    ctx: &Context<'_>,
    count: usize,
    rng: &mut R,
    out: &mut Vec<Scenario>,
) {
    let n = ctx.specs.len();
    if n == 0 {
        return;
    }
    let k_min = ctx.config.adversarial_min_features.clamp(1, n);
    for _ in 0..count {
        let mut values = ctx.background(rng);
        let k = rng.gen_range(k_min..=n);
        let mut chosen = index::sample(rng, n, k).into_vec();
        chosen.sort_unstable();
        for i in chosen {
            let spec = &ctx.specs[i];
            values.insert(spec.name.clone(), near_threshold(ctx, spec, rng));
        }
        push(out, ScenarioStrategy::Adversarial, values);
    }
}
