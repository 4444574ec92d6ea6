use serde::Serialize;

use crate::factors::FactorScores;
use crate::prop::Prop;

/// Letter grade for the final score. Scores of 90 through 95 all collapse to
/// `A`; behavior preserved as built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTier {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl Grade {
    pub fn label(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl ColorTier {
    pub fn label(self) -> &'static str {
        match self {
            ColorTier::Green => "green",
            ColorTier::Yellow => "yellow",
            ColorTier::Red => "red",
        }
    }
}

impl ConfidenceTier {
    pub fn label(self) -> &'static str {
        match self {
            ConfidenceTier::High => "High",
            ConfidenceTier::Medium => "Medium",
            ConfidenceTier::Low => "Low",
        }
    }
}

pub fn grade_for(score: u8) -> Grade {
    if score >= 90 {
        Grade::A
    } else if score >= 80 {
        Grade::B
    } else if score >= 70 {
        Grade::C
    } else if score >= 60 {
        Grade::D
    } else {
        Grade::F
    }
}

pub fn color_for(score: u8) -> ColorTier {
    if score >= 70 {
        ColorTier::Green
    } else if score >= 55 {
        ColorTier::Yellow
    } else {
        ColorTier::Red
    }
}

/// High needs a strong overall score backed by at least three strong
/// factors; Medium a decent score backed by two.
pub fn confidence_for(score: u8, factors: &FactorScores) -> ConfidenceTier {
    let strong = factors.as_array().iter().filter(|&&f| f >= 70.0).count();
    if score >= 75 && strong >= 3 {
        ConfidenceTier::High
    } else if score >= 60 && strong >= 2 {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    }
}

const FAVORABLE: f64 = 80.0;
const UNFAVORABLE: f64 = 30.0;

/// One line per extreme factor, in factor declaration order; a single
/// balanced-analysis line when nothing is extreme either way.
pub fn reasoning_for(factors: &FactorScores, prop: &Prop) -> Vec<String> {
    let mut reasoning = Vec::new();

    if factors.hit_rate >= FAVORABLE {
        reasoning.push(format!(
            "Strong hit-rate profile ({}% blended)",
            factors.hit_rate.round()
        ));
    } else if factors.hit_rate <= UNFAVORABLE {
        reasoning.push("Weak hit-rate history - inconsistent results".to_string());
    }

    if factors.projection_gap >= FAVORABLE {
        reasoning.push("Model projection well clear of the line".to_string());
    } else if factors.projection_gap <= UNFAVORABLE {
        reasoning.push("Projection sits tight to the line".to_string());
    }

    if factors.ai_prediction >= FAVORABLE {
        reasoning.push(format!(
            "Strong model agreement ({}% confidence)",
            prop.ai
                .as_ref()
                .map(|ai| (ai.confidence * 100.0).round())
                .unwrap_or(50.0)
        ));
    } else if factors.ai_prediction <= UNFAVORABLE {
        reasoning.push("Low model confidence - proceed with caution".to_string());
    }

    if factors.opponent >= FAVORABLE {
        reasoning.push(format!("Favorable matchup vs. {}", prop.opponent));
    } else if factors.opponent <= UNFAVORABLE {
        reasoning.push(format!("Tough matchup vs. {}", prop.opponent));
    }

    if factors.market_confidence >= FAVORABLE {
        reasoning.push("Deep market consensus behind this line".to_string());
    } else if factors.market_confidence <= UNFAVORABLE {
        reasoning.push("Thin or stale market data for this line".to_string());
    }

    if factors.recency >= FAVORABLE {
        reasoning.push("Trending well in recent games".to_string());
    } else if factors.recency <= UNFAVORABLE {
        reasoning.push("Struggling in recent games".to_string());
    }

    if reasoning.is_empty() {
        reasoning.push("Balanced analysis across all factors".to_string());
    }

    reasoning
}
