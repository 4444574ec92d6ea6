use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::prop::Side;
use crate::rating::Rating;

#[derive(Debug, Serialize)]
struct SlateReport<'a> {
    generated_at: String,
    side: Side,
    count: usize,
    ratings: &'a [Rating],
}

pub fn report_to_json(
    side: Side,
    generated_at: DateTime<Utc>,
    ratings: &[Rating],
) -> Result<String> {
    let report = SlateReport {
        generated_at: generated_at.to_rfc3339(),
        side,
        count: ratings.len(),
        ratings,
    };
    serde_json::to_string_pretty(&report).context("serialize slate report")
}

/// Write the slate report next to its final path and swap it in, so a
/// half-written file never replaces a good one.
pub fn write_report(
    path: &Path,
    side: Side,
    generated_at: DateTime<Utc>,
    ratings: &[Rating],
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let _ = fs::create_dir_all(parent);
        }
    }
    let json = report_to_json(side, generated_at, ratings)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write slate report")?;
    fs::rename(&tmp, path).context("swap slate report")?;
    Ok(())
}
