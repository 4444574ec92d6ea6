use crate::factors::scale;
use crate::params::RatingParams;
use crate::prop::Prop;

/// Bounded post-normalization corrections: a volatility penalty (at most 7
/// points) and a consensus boost (at most 5), applied in that order and
/// clamped back into the band. Both are small relative to the 55-point
/// normalization spread, so slate-relative ordering survives except at the
/// margins. Returns the corrected score unrounded.
pub fn apply_bounded_adjustments(score: f64, prop: &Prop, params: &RatingParams) -> f64 {
    let p = &params.adjust;

    let vol_penalty = scale(
        prop.volatility_or_default(),
        p.vol_low,
        p.vol_high,
        0.0,
        p.vol_max_penalty,
    )
    .clamp(0.0, p.vol_max_penalty);

    let books_boost = scale(
        prop.book_count() as f64,
        p.books_low,
        p.books_high,
        0.0,
        p.books_max_boost,
    );
    let inv_spread = 1.0 / prop.consensus_spread_or_default().max(0.01);
    let tightness_boost = scale(
        inv_spread,
        p.inv_spread_low,
        p.inv_spread_high,
        0.0,
        p.tightness_max_boost,
    );
    let consensus_boost = (books_boost + tightness_boost).clamp(0.0, p.boost_cap);

    (score - vol_penalty + consensus_boost).clamp(params.band.min, params.band.max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prop::BookQuote;

    fn bare_prop() -> Prop {
        serde_json::from_str(
            r#"{"player":"A","team":"T","opponent":"O","propType":"points","line":20}"#,
        )
        .unwrap()
    }

    #[test]
    fn quiet_prop_gets_only_the_default_tightness_drip() {
        // No volatility, no books: the only movement is the tightness boost
        // from the default spread indicator (1/0.05 = 20 on the 10..200 ramp).
        let params = RatingParams::default();
        let adjusted = apply_bounded_adjustments(67.5, &bare_prop(), &params);
        let expected = 67.5 + (20.0 - 10.0) / 190.0 * 2.0;
        assert!((adjusted - expected).abs() < 1e-9);
    }

    #[test]
    fn volatility_penalty_ramps_and_caps() {
        let params = RatingParams::default();
        let mut prop = bare_prop();

        prop.volatility = Some(10.0);
        let at_low = apply_bounded_adjustments(70.0, &prop, &params);
        prop.volatility = Some(35.0);
        let mid = apply_bounded_adjustments(70.0, &prop, &params);
        prop.volatility = Some(200.0);
        let capped = apply_bounded_adjustments(70.0, &prop, &params);

        assert!((at_low - mid - 3.5).abs() < 1e-9);
        assert!((at_low - capped - 7.0).abs() < 1e-9);
    }

    #[test]
    fn consensus_boost_combines_books_and_tightness_under_the_cap() {
        let params = RatingParams::default();
        let mut prop = bare_prop();
        prop.books = (0..12)
            .map(|i| BookQuote {
                book: format!("B{i}"),
                over_price: Some(-110),
                under_price: Some(-110),
            })
            .collect();
        prop.consensus_spread = Some(0.001);

        // 12 books saturate the book ramp at 3. The spread indicator is
        // floored at 0.01, so the tightness ramp tops out at
        // (100 - 10) / 190 * 2 rather than its nominal 2-point max.
        let tightness = (100.0 - 10.0) / 190.0 * 2.0;
        let adjusted = apply_bounded_adjustments(70.0, &prop, &params);
        assert!((adjusted - (70.0 + 3.0 + tightness)).abs() < 1e-9);
        assert!(adjusted - 70.0 <= params.adjust.boost_cap);
    }

    #[test]
    fn corrections_never_leave_the_band() {
        let params = RatingParams::default();
        let mut prop = bare_prop();
        prop.volatility = Some(500.0);
        assert_eq!(apply_bounded_adjustments(41.0, &prop, &params), 40.0);

        prop.volatility = None;
        prop.books = (0..10)
            .map(|i| BookQuote {
                book: format!("B{i}"),
                over_price: Some(-110),
                under_price: Some(-110),
            })
            .collect();
        prop.consensus_spread = Some(0.001);
        assert_eq!(apply_bounded_adjustments(94.0, &prop, &params), 95.0);
    }
}
