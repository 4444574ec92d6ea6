use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::params::{FactorWeights, RatingParams};
use crate::prop::{Prop, RecentForm, Side};

/// The six sub-scores, each clamped to [0,100], computed per (prop, side).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScores {
    pub hit_rate: f64,
    pub projection_gap: f64,
    pub ai_prediction: f64,
    pub opponent: f64,
    pub market_confidence: f64,
    pub recency: f64,
}

/// Factor scores rounded for display, same declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorBreakdown {
    pub hit_rate: i32,
    pub projection_gap: i32,
    pub ai_prediction: i32,
    pub opponent: i32,
    pub market_confidence: i32,
    pub recency: i32,
}

impl FactorScores {
    /// Declaration order: hit-rate, projection-gap, ai-prediction, opponent,
    /// market-confidence, recency. Reasoning and confidence tiers rely on it.
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.hit_rate,
            self.projection_gap,
            self.ai_prediction,
            self.opponent,
            self.market_confidence,
            self.recency,
        ]
    }

    pub fn rounded(&self) -> FactorBreakdown {
        FactorBreakdown {
            hit_rate: self.hit_rate.round() as i32,
            projection_gap: self.projection_gap.round() as i32,
            ai_prediction: self.ai_prediction.round() as i32,
            opponent: self.opponent.round() as i32,
            market_confidence: self.market_confidence.round() as i32,
            recency: self.recency.round() as i32,
        }
    }
}

pub fn compute_factors(
    prop: &Prop,
    side: Side,
    now: DateTime<Utc>,
    params: &RatingParams,
) -> FactorScores {
    FactorScores {
        hit_rate: hit_rate_score(prop, params),
        projection_gap: projection_gap_score(prop, side, params),
        ai_prediction: ai_prediction_score(prop, side, params),
        opponent: opponent_score(prop, side, params),
        market_confidence: market_confidence_score(prop, now, params),
        recency: recency_score(prop, params),
    }
}

/// Fixed-weight sum of the six factors. Stays in [0,100] because the weights
/// sum to 1 and every component is clamped.
pub fn composite_score(factors: &FactorScores, weights: &FactorWeights) -> f64 {
    factors.hit_rate * weights.hit_rate
        + factors.projection_gap * weights.projection_gap
        + factors.ai_prediction * weights.ai_prediction
        + factors.opponent * weights.opponent
        + factors.market_confidence * weights.market_confidence
        + factors.recency * weights.recency
}

/// Symmetric: blends market confidence and season hit rate, then applies the
/// recent-form bucket bonus.
fn hit_rate_score(prop: &Prop, params: &RatingParams) -> f64 {
    let p = &params.hit_rate;
    let mut score = prop.market_confidence_or_default() * p.confidence_weight
        + prop.hit_rate_or_default() * p.hit_rate_weight;

    score += match prop.recent_form {
        Some(RecentForm::Hot) => p.form_hot,
        Some(RecentForm::Good) => p.form_good,
        Some(RecentForm::Average) => p.form_average,
        Some(RecentForm::Cold) => p.form_cold,
        None => 0.0,
    };

    score.clamp(0.0, 100.0)
}

/// Side-aware: the magnitude of (projection - line) ramps from a small-gap
/// floor to the ceiling on a sqrt curve; a bounded directional bonus is added
/// only when the gap sign favors the requested side.
fn projection_gap_score(prop: &Prop, side: Side, params: &RatingParams) -> f64 {
    let p = &params.projection_gap;
    let Some(projection) = prop.projection.filter(|v| v.is_finite()) else {
        return p.neutral;
    };

    let gap = projection - prop.line;
    let rel = (gap.abs() / prop.line.abs().max(1.0)) / p.saturation;
    let ramp = rel.clamp(0.0, 1.0);
    let mut score = p.floor + (p.ceiling - p.floor) * ramp.sqrt();

    let favored = match side {
        Side::Over => gap > 0.0,
        Side::Under => gap < 0.0,
        Side::Both => false,
    };
    if favored {
        score += p.direction_bonus * ramp;
    }

    score.clamp(0.0, 100.0)
}

/// Side-aware. Order of operations is a contract: confidence base, then the
/// direction adjustment, then the tier adjustment, then one final clamp.
fn ai_prediction_score(prop: &Prop, side: Side, params: &RatingParams) -> f64 {
    let p = &params.ai;
    let Some(ai) = &prop.ai else {
        return p.neutral;
    };
    let confidence = if ai.confidence.is_finite() {
        ai.confidence.clamp(0.0, 1.0)
    } else {
        crate::prop::DEFAULT_CONFIDENCE
    };

    let mut score = confidence * 100.0;

    if side != Side::Both {
        score += if side.matches(ai.recommended) {
            p.match_bonus
        } else {
            p.mismatch_penalty
        };
    }

    if let Some((_, bonus)) = p
        .confidence_bonus_tiers
        .iter()
        .find(|(floor, _)| confidence >= *floor)
    {
        score += bonus;
    } else if let Some((_, penalty)) = p
        .confidence_penalty_tiers
        .iter()
        .find(|(ceiling, _)| confidence < *ceiling)
    {
        score += penalty;
    }

    score.clamp(0.0, 100.0)
}

/// Side-aware: defensive rank 1..32 maps linearly into the 20-100 band, and
/// the Under side sees the inverted score. Rank 1 scores 100 for Over and 0
/// for Under; behavior preserved as built.
fn opponent_score(prop: &Prop, side: Side, params: &RatingParams) -> f64 {
    let p = &params.opponent;
    let rank = prop.opponent_rank_or_default();
    let base = scale(
        (p.rank_count as f64) - (rank as f64),
        0.0,
        (p.rank_count - 1) as f64,
        p.floor,
        p.ceiling,
    );

    let score = match side {
        Side::Over | Side::Both => base,
        Side::Under => 100.0 - base,
    };
    score.clamp(0.0, 100.0)
}

/// Symmetric: market confidence plus bonuses for exact-source data, source
/// count, and tight price agreement, minus staleness by age bucket.
fn market_confidence_score(prop: &Prop, now: DateTime<Utc>, params: &RatingParams) -> f64 {
    let p = &params.market;
    let mut score = prop.market_confidence_or_default() * 100.0;

    if prop.exact_source {
        score += p.exact_source_bonus;
    }

    let books = prop.book_count();
    if let Some((_, bonus)) = p.book_tiers.iter().find(|(min, _)| books >= *min) {
        score += bonus;
    }

    if let Some(stddev) = quote_price_stddev(prop) {
        if let Some((_, bonus)) = p.agreement_tiers.iter().find(|(max, _)| stddev <= *max) {
            score += bonus;
        }
    }

    if let Some(age) = prop.age_hours(now) {
        match p.age_tiers.iter().find(|(min_hours, _)| age > *min_hours) {
            Some((_, adjustment)) => score += adjustment,
            None => score += p.fresh_bonus,
        }
    }

    score.clamp(0.0, 100.0)
}

/// Symmetric: neutral baseline moved by recent form, the last-5 average
/// against the line, the season hit-rate bucket, and rest days.
fn recency_score(prop: &Prop, params: &RatingParams) -> f64 {
    let p = &params.recency;
    let mut score = p.baseline;

    score += match prop.recent_form {
        Some(RecentForm::Hot) => p.form_hot,
        Some(RecentForm::Good) => p.form_good,
        Some(RecentForm::Average) => p.form_average,
        Some(RecentForm::Cold) => p.form_cold,
        None => 0.0,
    };

    if let Some(avg) = prop.last5_average() {
        if prop.line.abs() > f64::EPSILON {
            let ratio = avg / prop.line;
            score += if ratio >= p.ratio_high {
                p.ratio_high_bonus
            } else if ratio >= p.ratio_lean_high {
                p.ratio_lean_high_bonus
            } else if ratio <= p.ratio_low {
                p.ratio_low_penalty
            } else if ratio <= p.ratio_lean_low {
                p.ratio_lean_low_penalty
            } else {
                0.0
            };
        }
    }

    let hit = prop.hit_rate_or_default();
    score += if hit >= p.hit_strong {
        p.hit_strong_bonus
    } else if hit >= p.hit_lean {
        p.hit_lean_bonus
    } else if hit < p.hit_weak {
        p.hit_weak_penalty
    } else if hit < p.hit_lean_weak {
        p.hit_lean_weak_penalty
    } else {
        0.0
    };

    if let Some(rest) = prop.rest_days {
        score += if rest >= p.rest_long {
            p.rest_long_bonus
        } else if rest >= p.rest_medium {
            p.rest_medium_bonus
        } else if rest <= p.rest_short {
            p.rest_short_penalty
        } else {
            0.0
        };
    }

    score.clamp(0.0, 100.0)
}

/// Stddev of quoted prices across books, in American odds points. Prefers the
/// over column; falls back to under quotes when no book posted an over price.
/// Needs at least two quotes to say anything about agreement.
fn quote_price_stddev(prop: &Prop) -> Option<f64> {
    let overs: Vec<f64> = prop
        .books
        .iter()
        .filter_map(|q| q.over_price)
        .map(f64::from)
        .collect();
    let prices = if overs.len() >= 2 {
        overs
    } else {
        prop.books
            .iter()
            .filter_map(|q| q.under_price)
            .map(f64::from)
            .collect()
    };
    if prices.len() < 2 {
        return None;
    }
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    let var = prices.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / prices.len() as f64;
    Some(var.sqrt())
}

/// Linear map of `x` from [in_min, in_max] to [out_min, out_max], with the
/// input fraction clamped to [0,1]. Degenerate or non-finite input maps to
/// the output midpoint.
pub(crate) fn scale(x: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    if !x.is_finite() || in_max == in_min {
        return (out_min + out_max) / 2.0;
    }
    let t = ((x - in_min) / (in_max - in_min)).clamp(0.0, 1.0);
    out_min + t * (out_max - out_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prop::{AiPick, BookQuote, PickSide};

    fn bare_prop(line: f64) -> Prop {
        serde_json::from_str(&format!(
            r#"{{"player":"A","team":"T","opponent":"OPP","propType":"points","line":{line}}}"#
        ))
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2026-03-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn all_factors_bounded_for_empty_prop() {
        let params = RatingParams::default();
        let prop = bare_prop(22.5);
        for side in [Side::Over, Side::Under, Side::Both] {
            let f = compute_factors(&prop, side, now(), &params);
            for v in f.as_array() {
                assert!((0.0..=100.0).contains(&v), "factor {v} out of range");
            }
        }
    }

    #[test]
    fn composite_stays_in_range() {
        let params = RatingParams::default();
        let hi = FactorScores {
            hit_rate: 100.0,
            projection_gap: 100.0,
            ai_prediction: 100.0,
            opponent: 100.0,
            market_confidence: 100.0,
            recency: 100.0,
        };
        let lo = FactorScores {
            hit_rate: 0.0,
            projection_gap: 0.0,
            ai_prediction: 0.0,
            opponent: 0.0,
            market_confidence: 0.0,
            recency: 0.0,
        };
        assert!((composite_score(&hi, &params.weights) - 100.0).abs() < 1e-9);
        assert!(composite_score(&lo, &params.weights).abs() < 1e-9);
    }

    #[test]
    fn projection_gap_favors_matching_side() {
        let params = RatingParams::default();
        let mut prop = bare_prop(20.0);
        prop.projection = Some(24.0);
        let over = projection_gap_score(&prop, Side::Over, &params);
        let under = projection_gap_score(&prop, Side::Under, &params);
        assert!(over > under);

        prop.projection = Some(16.0);
        let over = projection_gap_score(&prop, Side::Over, &params);
        let under = projection_gap_score(&prop, Side::Under, &params);
        assert!(under > over);
    }

    #[test]
    fn projection_gap_missing_is_neutral() {
        let params = RatingParams::default();
        let prop = bare_prop(20.0);
        assert_eq!(
            projection_gap_score(&prop, Side::Over, &params),
            params.projection_gap.neutral
        );
    }

    #[test]
    fn projection_on_the_line_sits_at_the_floor() {
        let params = RatingParams::default();
        let mut prop = bare_prop(20.0);
        prop.projection = Some(20.0);
        assert_eq!(
            projection_gap_score(&prop, Side::Both, &params),
            params.projection_gap.floor
        );
    }

    #[test]
    fn ai_order_of_operations_matches_contract() {
        // Recommendation "over" at 0.9 confidence, rated for the under:
        // 90 base, -30 mismatch, +20 high-confidence tier, clamp -> 80.
        let params = RatingParams::default();
        let mut prop = bare_prop(20.0);
        prop.ai = Some(AiPick {
            recommended: PickSide::Over,
            confidence: 0.9,
        });
        assert!((ai_prediction_score(&prop, Side::Under, &params) - 80.0).abs() < 1e-9);
        // Matching side: 90 + 20 + 20 clamps to 100.
        assert!((ai_prediction_score(&prop, Side::Over, &params) - 100.0).abs() < 1e-9);
        // Side-agnostic: no direction adjustment, 90 + 20 clamps to 100.
        assert!((ai_prediction_score(&prop, Side::Both, &params) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn ai_low_confidence_penalized() {
        let params = RatingParams::default();
        let mut prop = bare_prop(20.0);
        prop.ai = Some(AiPick {
            recommended: PickSide::Over,
            confidence: 0.3,
        });
        // 30 base + 20 match - 20 low tier = 30.
        assert!((ai_prediction_score(&prop, Side::Over, &params) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn opponent_rank_extremes() {
        let params = RatingParams::default();
        let mut prop = bare_prop(20.0);
        prop.opponent_rank = Some(1);
        assert!((opponent_score(&prop, Side::Over, &params) - 100.0).abs() < 1e-9);
        assert!(opponent_score(&prop, Side::Under, &params).abs() < 1e-9);

        prop.opponent_rank = Some(32);
        assert!((opponent_score(&prop, Side::Over, &params) - 20.0).abs() < 1e-9);
        assert!((opponent_score(&prop, Side::Under, &params) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn opponent_tolerates_out_of_range_rank() {
        let params = RatingParams::default();
        let mut prop = bare_prop(20.0);
        prop.opponent_rank = Some(0);
        assert!((opponent_score(&prop, Side::Over, &params) - 100.0).abs() < 1e-9);
        prop.opponent_rank = Some(99);
        assert!((opponent_score(&prop, Side::Over, &params) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn market_confidence_consensus_and_staleness() {
        let params = RatingParams::default();
        let mut prop = bare_prop(20.0);
        prop.market_confidence = Some(0.5);
        prop.exact_source = true;
        prop.books = (0..5)
            .map(|i| BookQuote {
                book: format!("B{i}"),
                over_price: Some(-110 - i),
                under_price: Some(-110),
            })
            .collect();
        prop.last_update = Some("2026-03-01T11:30:00Z".parse().unwrap());

        // 50 base + 10 exact + 10 five-book tier + 8 tight prices + 5 fresh.
        let score = market_confidence_score(&prop, now(), &params);
        assert!((score - 83.0).abs() < 1e-9);

        // A day-old quote takes the severe staleness penalty instead.
        prop.last_update = Some("2026-02-27T11:00:00Z".parse().unwrap());
        let stale = market_confidence_score(&prop, now(), &params);
        assert!((stale - 53.0).abs() < 1e-9);
    }

    #[test]
    fn market_confidence_missing_timestamp_is_unadjusted() {
        let params = RatingParams::default();
        let prop = bare_prop(20.0);
        assert!((market_confidence_score(&prop, now(), &params) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn recency_moves_with_form_and_ratio() {
        let params = RatingParams::default();
        let mut prop = bare_prop(20.0);
        prop.recent_form = Some(RecentForm::Hot);
        prop.season.last5 = vec![25.0, 24.0, 23.0, 26.0, 24.0];
        prop.season.hit_rate = Some(0.7);
        prop.rest_days = Some(7);
        // 50 + 20 hot + 12 ratio (24.4/20 = 1.22) + 8 strong hit + 6 rest.
        assert!((recency_score(&prop, &params) - 96.0).abs() < 1e-9);

        prop.recent_form = Some(RecentForm::Cold);
        prop.season.last5 = vec![14.0, 15.0, 13.0];
        prop.season.hit_rate = Some(0.3);
        prop.rest_days = Some(0);
        // 50 - 20 - 12 (14/20 = 0.7) - 8 - 6 = 4.
        assert!((recency_score(&prop, &params) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn quote_stddev_falls_back_to_under_column() {
        let mut prop = bare_prop(20.0);
        prop.books = vec![
            BookQuote {
                book: "A".into(),
                over_price: None,
                under_price: Some(-110),
            },
            BookQuote {
                book: "B".into(),
                over_price: None,
                under_price: Some(-120),
            },
        ];
        let sd = quote_price_stddev(&prop).unwrap();
        assert!((sd - 5.0).abs() < 1e-9);
    }

    #[test]
    fn scale_clamps_and_handles_degenerate_input() {
        assert_eq!(scale(0.0, 10.0, 60.0, 0.0, 7.0), 0.0);
        assert_eq!(scale(100.0, 10.0, 60.0, 0.0, 7.0), 7.0);
        assert_eq!(scale(35.0, 10.0, 60.0, 0.0, 7.0), 3.5);
        assert_eq!(scale(5.0, 3.0, 3.0, 0.0, 10.0), 5.0);
        assert_eq!(scale(f64::NAN, 0.0, 1.0, 0.0, 10.0), 5.0);
    }
}
