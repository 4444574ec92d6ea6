use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::prop::{AiPick, BookQuote, PickSide, Prop, RecentForm, SeasonStats};

const PLAYERS: &[(&str, &str)] = &[
    ("J. Alvarez", "DEN"),
    ("M. Okafor", "BOS"),
    ("T. Brandt", "MIL"),
    ("D. Reyes", "PHX"),
    ("C. Whitfield", "GSW"),
    ("A. Novak", "DAL"),
    ("R. Castellanos", "MIA"),
    ("K. Dupree", "NYK"),
    ("S. Ibarra", "LAC"),
    ("E. Thibodeau", "OKC"),
    ("L. Marsh", "SAC"),
    ("V. Adeyemi", "CLE"),
];

const OPPONENTS: &[&str] = &[
    "MEM", "POR", "UTA", "SAS", "HOU", "ORL", "ATL", "CHI", "TOR", "IND",
];

const BOOKS: &[&str] = &[
    "fanduel", "draftkings", "betmgm", "caesars", "pointsbet", "bet365", "espnbet", "fanatics",
];

// (prop type, typical line center, line spread)
const PROP_TYPES: &[(&str, f64, f64)] = &[
    ("points", 22.0, 10.0),
    ("rebounds", 8.0, 4.0),
    ("assists", 6.0, 3.0),
    ("threes", 2.5, 1.5),
    ("pra", 34.0, 12.0),
];

/// Generate a synthetic slate of plausible props. Optional fields go missing
/// at realistic rates so the defaulting paths get exercised by anything that
/// consumes a demo slate.
pub fn demo_slate(count: usize, now: DateTime<Utc>) -> Vec<Prop> {
    let mut rng = rand::thread_rng();
    (0..count).map(|idx| demo_prop(&mut rng, idx, now)).collect()
}

fn demo_prop(rng: &mut impl Rng, idx: usize, now: DateTime<Utc>) -> Prop {
    let (player, team) = PLAYERS[idx % PLAYERS.len()];
    let opponent = OPPONENTS[rng.gen_range(0..OPPONENTS.len())];
    let (prop_type, center, spread) = PROP_TYPES[rng.gen_range(0..PROP_TYPES.len())];

    let line = round_half(center + rng.gen_range(-spread..spread));
    let projection = if rng.gen_bool(0.85) {
        Some(line + rng.gen_range(-0.25..0.25) * line.abs().max(1.0))
    } else {
        None
    };

    let hit_rate = rng.gen_range(0.25..0.80);
    let last5 = (0..5)
        .map(|_| (line * rng.gen_range(0.6..1.4)).max(0.0))
        .collect();

    let book_count = rng.gen_range(1..=BOOKS.len());
    let anchor = -(rng.gen_range(105..125) as i32);
    let books = BOOKS
        .iter()
        .take(book_count)
        .map(|book| BookQuote {
            book: (*book).to_string(),
            over_price: Some(anchor - rng.gen_range(0..8)),
            under_price: Some(anchor + rng.gen_range(0..8)),
        })
        .collect();

    let ai = if rng.gen_bool(0.8) {
        Some(AiPick {
            recommended: if rng.gen_bool(0.5) {
                PickSide::Over
            } else {
                PickSide::Under
            },
            confidence: rng.gen_range(0.35..0.95),
        })
    } else {
        None
    };

    let recent_form = match rng.gen_range(0..5) {
        0 => Some(RecentForm::Hot),
        1 | 2 => Some(RecentForm::Average),
        3 => Some(RecentForm::Good),
        _ => Some(RecentForm::Cold),
    };

    Prop {
        player: player.to_string(),
        team: team.to_string(),
        opponent: opponent.to_string(),
        prop_type: prop_type.to_string(),
        line,
        projection,
        market_confidence: rng.gen_bool(0.9).then(|| rng.gen_range(0.3..0.9)),
        ai,
        season: SeasonStats {
            hit_rate: Some(hit_rate),
            average: Some(round_half(line + rng.gen_range(-2.0..2.0))),
            last5,
        },
        recent_form,
        opponent_rank: rng.gen_bool(0.9).then(|| rng.gen_range(1..=32)),
        books,
        exact_source: rng.gen_bool(0.6),
        last_update: Some(now - Duration::minutes(rng.gen_range(5..2_000))),
        volatility: rng.gen_bool(0.7).then(|| rng.gen_range(5.0..55.0)),
        consensus_spread: rng.gen_bool(0.7).then(|| rng.gen_range(0.01..0.12)),
        rest_days: rng.gen_bool(0.8).then(|| rng.gen_range(0..8)),
    }
}

fn round_half(v: f64) -> f64 {
    (v * 2.0).round() / 2.0
}
