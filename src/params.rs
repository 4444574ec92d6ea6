use anyhow::{Result, bail};

/// Fixed factor weights. The ordering is a contract: hit-rate and
/// projection-gap dominate, ai-prediction and opponent are secondary and
/// roughly comparable, market-confidence and recency are minor. Magnitudes
/// may be retuned but must keep that ordering and sum to exactly 1.
#[derive(Debug, Clone, Copy)]
pub struct FactorWeights {
    pub hit_rate: f64,
    pub projection_gap: f64,
    pub ai_prediction: f64,
    pub opponent: f64,
    pub market_confidence: f64,
    pub recency: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            hit_rate: 0.35,
            projection_gap: 0.25,
            ai_prediction: 0.15,
            opponent: 0.15,
            market_confidence: 0.07,
            recency: 0.03,
        }
    }
}

impl FactorWeights {
    pub fn sum(&self) -> f64 {
        self.hit_rate
            + self.projection_gap
            + self.ai_prediction
            + self.opponent
            + self.market_confidence
            + self.recency
    }
}

/// Public output band for normalized scores.
#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub fn midpoint(&self) -> f64 {
        self.min + (self.max - self.min) * 0.5
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for Band {
    fn default() -> Self {
        Self { min: 40.0, max: 95.0 }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HitRateParams {
    pub confidence_weight: f64,
    pub hit_rate_weight: f64,
    pub form_hot: f64,
    pub form_good: f64,
    pub form_average: f64,
    pub form_cold: f64,
}

impl Default for HitRateParams {
    fn default() -> Self {
        Self {
            confidence_weight: 50.0,
            hit_rate_weight: 50.0,
            form_hot: 15.0,
            form_good: 5.0,
            form_average: 0.0,
            form_cold: -15.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GapParams {
    /// Score when the projection sits on the line.
    pub floor: f64,
    /// Score once the gap saturates.
    pub ceiling: f64,
    /// Relative gap (|projection - line| / line) at which the ramp saturates.
    pub saturation: f64,
    /// Maximum directional bonus when the gap sign matches the requested side.
    pub direction_bonus: f64,
    /// Neutral score when no projection is available.
    pub neutral: f64,
}

impl Default for GapParams {
    fn default() -> Self {
        Self {
            floor: 20.0,
            ceiling: 100.0,
            saturation: 0.25,
            direction_bonus: 10.0,
            neutral: 50.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiParams {
    pub match_bonus: f64,
    pub mismatch_penalty: f64,
    /// Tiered adjustment on the raw confidence, applied after the direction
    /// adjustment and before the final clamp. `(floor, bonus)` pairs checked
    /// top-down; the first floor the confidence reaches wins.
    pub confidence_bonus_tiers: Vec<(f64, f64)>,
    /// `(ceiling, penalty)` pairs checked bottom-up when no bonus tier hit.
    pub confidence_penalty_tiers: Vec<(f64, f64)>,
    pub neutral: f64,
}

impl Default for AiParams {
    fn default() -> Self {
        Self {
            match_bonus: 20.0,
            mismatch_penalty: -30.0,
            confidence_bonus_tiers: vec![(0.9, 20.0), (0.8, 15.0), (0.7, 10.0), (0.6, 5.0)],
            confidence_penalty_tiers: vec![(0.4, -20.0), (0.5, -10.0)],
            neutral: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OpponentParams {
    /// Bottom of the linear rank map (worst end of the 20-100 band).
    pub floor: f64,
    pub ceiling: f64,
    pub rank_count: u32,
}

impl Default for OpponentParams {
    fn default() -> Self {
        Self {
            floor: 20.0,
            ceiling: 100.0,
            rank_count: 32,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketParams {
    pub exact_source_bonus: f64,
    /// Consensus tiers by contributing book count, `(min_books, bonus)`,
    /// checked top-down.
    pub book_tiers: Vec<(usize, f64)>,
    /// Price-agreement bonus from the stddev of quoted prices in American
    /// odds points, `(max_stddev, bonus)`, checked tightest-first.
    pub agreement_tiers: Vec<(f64, f64)>,
    /// Staleness by age bucket, `(min_hours, adjustment)`, checked oldest
    /// first; anything at or under the last bucket gets the fresh bonus.
    pub age_tiers: Vec<(f64, f64)>,
    pub fresh_bonus: f64,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            exact_source_bonus: 10.0,
            book_tiers: vec![(8, 15.0), (5, 10.0), (3, 6.0), (2, 3.0)],
            agreement_tiers: vec![(10.0, 8.0), (25.0, 4.0)],
            age_tiers: vec![(24.0, -25.0), (6.0, -10.0), (3.0, -5.0), (1.0, 0.0)],
            fresh_bonus: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecencyParams {
    pub baseline: f64,
    pub form_hot: f64,
    pub form_good: f64,
    pub form_average: f64,
    pub form_cold: f64,
    // Last-5 average relative to the line.
    pub ratio_high: f64,
    pub ratio_high_bonus: f64,
    pub ratio_lean_high: f64,
    pub ratio_lean_high_bonus: f64,
    pub ratio_low: f64,
    pub ratio_low_penalty: f64,
    pub ratio_lean_low: f64,
    pub ratio_lean_low_penalty: f64,
    // Season hit-rate buckets.
    pub hit_strong: f64,
    pub hit_strong_bonus: f64,
    pub hit_lean: f64,
    pub hit_lean_bonus: f64,
    pub hit_weak: f64,
    pub hit_weak_penalty: f64,
    pub hit_lean_weak: f64,
    pub hit_lean_weak_penalty: f64,
    // Rest buckets, days.
    pub rest_long: u32,
    pub rest_long_bonus: f64,
    pub rest_medium: u32,
    pub rest_medium_bonus: f64,
    pub rest_short: u32,
    pub rest_short_penalty: f64,
}

impl Default for RecencyParams {
    fn default() -> Self {
        Self {
            baseline: 50.0,
            form_hot: 20.0,
            form_good: 10.0,
            form_average: 0.0,
            form_cold: -20.0,
            ratio_high: 1.15,
            ratio_high_bonus: 12.0,
            ratio_lean_high: 1.05,
            ratio_lean_high_bonus: 6.0,
            ratio_low: 0.85,
            ratio_low_penalty: -12.0,
            ratio_lean_low: 0.95,
            ratio_lean_low_penalty: -6.0,
            hit_strong: 0.65,
            hit_strong_bonus: 8.0,
            hit_lean: 0.55,
            hit_lean_bonus: 4.0,
            hit_weak: 0.35,
            hit_weak_penalty: -8.0,
            hit_lean_weak: 0.45,
            hit_lean_weak_penalty: -4.0,
            rest_long: 6,
            rest_long_bonus: 6.0,
            rest_medium: 4,
            rest_medium_bonus: 3.0,
            rest_short: 1,
            rest_short_penalty: -6.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AdjustParams {
    // Volatility penalty ramps linearly between the two thresholds.
    pub vol_low: f64,
    pub vol_high: f64,
    pub vol_max_penalty: f64,
    // Consensus boost: book count contribution plus market tightness.
    pub books_low: f64,
    pub books_high: f64,
    pub books_max_boost: f64,
    pub inv_spread_low: f64,
    pub inv_spread_high: f64,
    pub tightness_max_boost: f64,
    pub boost_cap: f64,
}

impl Default for AdjustParams {
    fn default() -> Self {
        Self {
            vol_low: 10.0,
            vol_high: 60.0,
            vol_max_penalty: 7.0,
            books_low: 1.0,
            books_high: 8.0,
            books_max_boost: 3.0,
            inv_spread_low: 10.0,
            inv_spread_high: 200.0,
            tightness_max_boost: 2.0,
            boost_cap: 5.0,
        }
    }
}

/// Every tunable the rating pipeline reads, in one place. Scoring code never
/// hard-codes a threshold; tests pin the defaults and `validate` catches a
/// misconfigured set before it reaches a slate.
#[derive(Debug, Clone, Default)]
pub struct RatingParams {
    pub weights: FactorWeights,
    pub band: Band,
    pub hit_rate: HitRateParams,
    pub projection_gap: GapParams,
    pub ai: AiParams,
    pub opponent: OpponentParams,
    pub market: MarketParams,
    pub recency: RecencyParams,
    pub adjust: AdjustParams,
}

impl RatingParams {
    pub fn validate(&self) -> Result<()> {
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-9 {
            bail!("factor weights must sum to 1.0, got {sum}");
        }
        let w = &self.weights;
        if w.hit_rate.min(w.projection_gap) < w.ai_prediction.max(w.opponent)
            || w.ai_prediction.min(w.opponent) < w.market_confidence.max(w.recency)
        {
            bail!("factor weight ordering violated");
        }
        if self.band.min >= self.band.max {
            bail!("band min must be below band max");
        }
        if self.adjust.vol_low >= self.adjust.vol_high {
            bail!("volatility thresholds inverted");
        }
        Ok(())
    }
}
