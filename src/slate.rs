use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::factors::{composite_score, compute_factors};
use crate::params::RatingParams;
use crate::prop::{Prop, Side};

// Below this spread the slate is treated as flat and normalization falls
// back to the band midpoint.
const MIN_SPREAD: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SideStats {
    min: f64,
    max: f64,
}

/// Frozen per-slate statistics: the min and max raw composite for each side,
/// computed once per batch. Build a fresh context whenever slate membership
/// changes; the context itself is immutable and shared by reference.
#[derive(Debug, Clone, Copy)]
pub struct SlateContext {
    over: Option<SideStats>,
    under: Option<SideStats>,
}

impl SlateContext {
    /// O(N) over the slate; every prop runs through the factor computers and
    /// composite scorer once per side. Prop evaluations are independent, so
    /// the fan-out is parallel.
    pub fn build(props: &[Prop], now: DateTime<Utc>, params: &RatingParams) -> Self {
        debug_assert!(params.validate().is_ok(), "rating params misconfigured");
        Self {
            over: side_stats(props, Side::Over, now, params),
            under: side_stats(props, Side::Under, now, params),
        }
    }

    /// Map a raw composite into the public band against the matching side's
    /// slate distribution. A side-agnostic request reads the over-side stats.
    /// Degenerate slates (empty, singleton, or zero variance) land on the
    /// band midpoint.
    pub fn normalize(&self, raw: f64, side: Side, params: &RatingParams) -> f64 {
        let band = &params.band;
        let stats = match side {
            Side::Over | Side::Both => self.over,
            Side::Under => self.under,
        };
        let Some(SideStats { min, max }) = stats else {
            return band.midpoint();
        };
        if max - min <= MIN_SPREAD {
            return band.midpoint();
        }
        let scaled = band.min + (raw - min) / (max - min) * band.span();
        scaled.clamp(band.min, band.max)
    }

    /// Per-side (min, max), for diagnostics.
    pub fn stats(&self, side: Side) -> Option<(f64, f64)> {
        let stats = match side {
            Side::Over | Side::Both => self.over,
            Side::Under => self.under,
        };
        stats.map(|s| (s.min, s.max))
    }

    #[cfg(test)]
    fn from_raw(over: Option<(f64, f64)>, under: Option<(f64, f64)>) -> Self {
        let wrap = |pair: Option<(f64, f64)>| pair.map(|(min, max)| SideStats { min, max });
        Self {
            over: wrap(over),
            under: wrap(under),
        }
    }
}

fn side_stats(
    props: &[Prop],
    side: Side,
    now: DateTime<Utc>,
    params: &RatingParams,
) -> Option<SideStats> {
    let composites: Vec<f64> = props
        .par_iter()
        .map(|prop| {
            let factors = compute_factors(prop, side, now, params);
            composite_score(&factors, &params.weights)
        })
        .collect();

    let first = *composites.first()?;
    let (min, max) = composites
        .iter()
        .skip(1)
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    Some(SideStats { min, max })
}
