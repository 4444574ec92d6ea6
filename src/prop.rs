use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which direction of a proposition a rating is computed for.
/// `Both` asks for a side-agnostic score; side-aware factors skip their
/// directional adjustments in that mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Over,
    Under,
    Both,
}

impl Side {
    pub fn matches(self, pick: PickSide) -> bool {
        matches!(
            (self, pick),
            (Side::Over, PickSide::Over) | (Side::Under, PickSide::Under)
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Over => "over",
            Side::Under => "under",
            Side::Both => "both",
        }
    }
}

/// An external recommendation is always directional, so it gets its own
/// two-valued enum rather than reusing `Side`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickSide {
    Over,
    Under,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecentForm {
    Hot,
    Good,
    Average,
    Cold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPick {
    pub recommended: PickSide,
    pub confidence: f64,
}

/// One contributing sportsbook with its quoted American prices.
/// Prices are already parsed upstream into a consistent integer format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookQuote {
    pub book: String,
    #[serde(default)]
    pub over_price: Option<i32>,
    #[serde(default)]
    pub under_price: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStats {
    /// Fraction of similar props hit this season, 0..1.
    #[serde(default)]
    pub hit_rate: Option<f64>,
    #[serde(default)]
    pub average: Option<f64>,
    /// Most recent observed stat values, newest first.
    #[serde(default)]
    pub last5: Vec<f64>,
}

/// A single proposition as handed over by the ingestion layer.
/// Identity is already resolved and prop types canonicalized upstream;
/// every numeric signal is optional and defaulted at read time so the
/// scoring pipeline stays total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prop {
    pub player: String,
    pub team: String,
    pub opponent: String,
    pub prop_type: String,
    pub line: f64,
    #[serde(default)]
    pub projection: Option<f64>,
    /// Market confidence 0..1.
    #[serde(default)]
    pub market_confidence: Option<f64>,
    #[serde(default)]
    pub ai: Option<AiPick>,
    #[serde(default)]
    pub season: SeasonStats,
    #[serde(default)]
    pub recent_form: Option<RecentForm>,
    /// Opponent defensive rank, 1 = best defense .. 32 = worst.
    #[serde(default)]
    pub opponent_rank: Option<u32>,
    #[serde(default)]
    pub books: Vec<BookQuote>,
    /// True when quotes came from an exact-match source rather than an aggregate.
    #[serde(default)]
    pub exact_source: bool,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    /// Stddev-style volatility indicator for the underlying stat.
    #[serde(default)]
    pub volatility: Option<f64>,
    /// Relative spread of quoted prices across books (lower = tighter market).
    #[serde(default)]
    pub consensus_spread: Option<f64>,
    #[serde(default)]
    pub rest_days: Option<u32>,
}

pub const DEFAULT_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_HIT_RATE: f64 = 0.5;
pub const DEFAULT_OPPONENT_RANK: u32 = 16;
pub const DEFAULT_CONSENSUS_SPREAD: f64 = 0.05;

impl Prop {
    pub fn market_confidence_or_default(&self) -> f64 {
        finite_or(self.market_confidence, DEFAULT_CONFIDENCE)
    }

    pub fn hit_rate_or_default(&self) -> f64 {
        finite_or(self.season.hit_rate, DEFAULT_HIT_RATE)
    }

    pub fn opponent_rank_or_default(&self) -> u32 {
        self.opponent_rank.unwrap_or(DEFAULT_OPPONENT_RANK)
    }

    pub fn volatility_or_default(&self) -> f64 {
        finite_or(self.volatility, 0.0)
    }

    pub fn consensus_spread_or_default(&self) -> f64 {
        finite_or(self.consensus_spread, DEFAULT_CONSENSUS_SPREAD)
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// Hours since the last odds update, or `None` when the feed never
    /// stamped the prop.
    pub fn age_hours(&self, now: DateTime<Utc>) -> Option<f64> {
        let updated = self.last_update?;
        Some((now - updated).num_seconds() as f64 / 3600.0)
    }

    /// Mean of the most recent observed values (up to five).
    pub fn last5_average(&self) -> Option<f64> {
        if self.season.last5.is_empty() {
            return None;
        }
        let window: Vec<f64> = self
            .season
            .last5
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .take(5)
            .collect();
        if window.is_empty() {
            return None;
        }
        Some(window.iter().sum::<f64>() / window.len() as f64)
    }
}

fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => fallback,
    }
}

/// Parse a slate file: a JSON array of props in the upstream feed shape.
pub fn parse_slate_json(raw: &str) -> Result<Vec<Prop>> {
    serde_json::from_str::<Vec<Prop>>(raw).context("parse slate json")
}
