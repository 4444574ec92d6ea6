use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

use prop_edge::fake_feed;
use prop_edge::params::RatingParams;
use prop_edge::prop::{Prop, Side, parse_slate_json};
use prop_edge::rating::{Rating, rate_prop};
use prop_edge::report;
use prop_edge::slate::SlateContext;

struct CliConfig {
    slate_path: Option<PathBuf>,
    side: Side,
    demo_props: usize,
    report_path: Option<PathBuf>,
}

impl CliConfig {
    fn from_env() -> Self {
        let slate_path = env::args()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| env::var("SLATE_PATH").ok().map(PathBuf::from));
        let side = match env::var("RATE_SIDE")
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "over" => Side::Over,
            "under" => Side::Under,
            _ => Side::Both,
        };
        let demo_props = env::var("DEMO_PROPS")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(12)
            .clamp(1, 500);
        let report_path = env::var("REPORT_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            slate_path,
            side,
            demo_props,
            report_path,
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cfg = CliConfig::from_env();
    let now = Utc::now();

    let props: Vec<Prop> = match &cfg.slate_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read slate file {}", path.display()))?;
            parse_slate_json(&raw)?
        }
        None => {
            eprintln!(
                "[INFO] No slate file given, generating a demo slate of {} props",
                cfg.demo_props
            );
            fake_feed::demo_slate(cfg.demo_props, now)
        }
    };

    if props.is_empty() {
        eprintln!("[WARN] Slate is empty, nothing to rate");
        return Ok(());
    }

    let params = RatingParams::default();
    params.validate().context("rating params")?;

    let ctx = SlateContext::build(&props, now, &params);
    for side in [Side::Over, Side::Under] {
        if let Some((min, max)) = ctx.stats(side) {
            eprintln!(
                "[INFO] Slate stats ({}): composite {:.2}-{:.2}",
                side.label(),
                min,
                max
            );
        }
    }

    let mut rows: Vec<(usize, Rating)> = props
        .iter()
        .enumerate()
        .map(|(idx, prop)| (idx, rate_prop(prop, cfg.side, &ctx, now, &params)))
        .collect();
    rows.sort_by(|a, b| b.1.overall.cmp(&a.1.overall));

    println!(
        "{:<16} {:<9} {:>6}  {:<5} {:>5}  {:<2} {:<6} {:<6}  {}",
        "PLAYER", "PROP", "LINE", "SIDE", "SCORE", "GR", "COLOR", "CONF", "REASONING"
    );
    for (idx, rating) in &rows {
        let prop = &props[*idx];
        println!(
            "{:<16} {:<9} {:>6.1}  {:<5} {:>5}  {:<2} {:<6} {:<6}  {}",
            prop.player,
            prop.prop_type,
            prop.line,
            cfg.side.label(),
            rating.overall,
            rating.grade.label(),
            rating.color.label(),
            rating.confidence.label(),
            rating.reasoning.first().map(String::as_str).unwrap_or(""),
        );
    }

    if let Some(path) = &cfg.report_path {
        let ratings: Vec<Rating> = rows.into_iter().map(|(_, rating)| rating).collect();
        report::write_report(path, cfg.side, now, &ratings)?;
        eprintln!("[INFO] Wrote report to {}", path.display());
    }

    Ok(())
}
