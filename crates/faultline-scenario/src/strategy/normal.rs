use super::{push, Context};
use faultline_core::{Scenario, ScenarioStrategy};
use rand::Rng;

/// Every feature drawn independently from its distribution
pub(crate) fn normal<R: Rng + ?Sized>(
    ctx: &Context<'_>,
    count: usize,
    rng: &mut R,
    out: &mut Vec<Scenario>,
) {
    for _ in 0..count {
        let values = ctx.background(rng);
        push(out, ScenarioStrategy::Normal, values);
    }
}
