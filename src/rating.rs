use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::adjust::apply_bounded_adjustments;
use crate::classify::{ColorTier, ConfidenceTier, Grade, color_for, confidence_for, grade_for, reasoning_for};
use crate::factors::{FactorBreakdown, FactorScores, composite_score, compute_factors};
use crate::params::RatingParams;
use crate::prop::{Prop, Side};
use crate::slate::SlateContext;

/// The engine's output for one (proposition, side) request.
#[derive(Debug, Clone, Serialize)]
pub struct Rating {
    /// Slate-normalized score, always within [40, 95].
    pub overall: u8,
    pub grade: Grade,
    pub color: ColorTier,
    pub confidence: ConfidenceTier,
    pub factors: FactorScores,
    pub reasoning: Vec<String>,
    pub breakdown: FactorBreakdown,
}

/// Pure pipeline for one prop against a frozen slate context: factors,
/// composite, per-side band normalization, bounded adjustments, classify.
pub fn rate_prop(
    prop: &Prop,
    side: Side,
    ctx: &SlateContext,
    now: DateTime<Utc>,
    params: &RatingParams,
) -> Rating {
    let factors = compute_factors(prop, side, now, params);
    let raw = composite_score(&factors, &params.weights);
    let normalized = ctx.normalize(raw, side, params);
    let adjusted = apply_bounded_adjustments(normalized, prop, params);
    let overall = adjusted.round() as u8;

    Rating {
        overall,
        grade: grade_for(overall),
        color: color_for(overall),
        confidence: confidence_for(overall, &factors),
        reasoning: reasoning_for(&factors, prop),
        breakdown: factors.rounded(),
        factors,
    }
}

/// Rate a whole slate for one side: builds the context (the O(N) barrier),
/// then rates every prop against it. Prop ratings are independent once the
/// context is frozen, so the second pass is parallel too.
pub fn rate_slate(
    props: &[Prop],
    side: Side,
    now: DateTime<Utc>,
    params: &RatingParams,
) -> Vec<Rating> {
    let ctx = SlateContext::build(props, now, params);
    props
        .par_iter()
        .map(|prop| rate_prop(prop, side, &ctx, now, params))
        .collect()
}
