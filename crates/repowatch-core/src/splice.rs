// Rewriting the repositories region of the tracker page in place
use std::path::Path;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result};

/// Indentation before the end marker after a rewrite
const CLOSING_INDENT: &str = "                    ";

const LAST_UPDATED_PREFIX: &str = "Last Updated: ";

/// Markers that delimit the replaceable region of the page.
///
/// `start` is found first, then each of `anchors` in order after it. The
/// region runs from the end of the last anchor up to `end`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegionMarkers {
    pub start: String,
    pub anchors: Vec<String>,
    pub end: String,
}

impl Default for RegionMarkers {
    fn default() -> Self {
        Self {
            start: "<!-- GitHub Repositories -->".to_string(),
            anchors: vec![
                r#"<div class="source-category">"#.to_string(),
                "GitHub Repositories</h3>".to_string(),
                r#"<p class="category-description">"#.to_string(),
                "</p>".to_string(),
            ],
            end: "<!-- Archive.org Mirrors -->".to_string(),
        }
    }
}

/// Byte range `(from, to)` of the replaceable region
pub fn region_bounds(document: &str, markers: &RegionMarkers) -> Result<(usize, usize)> {
    let mut cursor = find_after(document, &markers.start, 0)?;

    for anchor in &markers.anchors {
        cursor = find_after(document, anchor, cursor)?;
    }

    let end = document[cursor..]
        .find(markers.end.as_str())
        .map(|offset| cursor + offset)
        .ok_or_else(|| Error::AnchorNotFound(markers.end.clone()))?;

    Ok((cursor, end))
}

/// Index just past `needle`, searching from `from`
fn find_after(document: &str, needle: &str, from: usize) -> Result<usize> {
    document[from..]
        .find(needle)
        .map(|offset| from + offset + needle.len())
        .ok_or_else(|| Error::AnchorNotFound(needle.to_string()))
}

/// Replace the region with `fragment`, leaving every other byte alone
pub fn splice_region(document: &str, fragment: &str, markers: &RegionMarkers) -> Result<String> {
    let (from, to) = region_bounds(document, markers)?;

    let mut out = String::with_capacity(document.len() - (to - from) + fragment.len());
    out.push_str(&document[..from]);
    out.push_str(fragment);
    out.push_str(&document[to..]);
    Ok(out)
}

/// Region content for a set of rendered cards
pub fn wrap_cards(cards: &str) -> String {
    format!("\n{}\n\n{}", cards, CLOSING_INDENT)
}

/// Swap the first `Last Updated: ... |` on a single line for `stamp`.
///
/// Returns the document unchanged when there is no such line.
pub fn replace_last_updated(document: &str, stamp: &str) -> String {
    let mut search_from = 0;

    while let Some(offset) = document[search_from..].find(LAST_UPDATED_PREFIX) {
        let value_start = search_from + offset + LAST_UPDATED_PREFIX.len();
        let line_end = document[value_start..]
            .find('\n')
            .map(|i| value_start + i)
            .unwrap_or(document.len());

        if let Some(pipe) = document[value_start..line_end].find('|') {
            let pipe = value_start + pipe;
            return format!("{}{} {}", &document[..value_start], stamp, &document[pipe..]);
        }

        search_from = value_start;
    }

    debug!("no 'Last Updated' line in template");
    document.to_string()
}

/// Page timestamp, e.g. `March 05, 2025 at 02:30 PM`
pub fn format_scan_time<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    time.format("%B %d, %Y at %I:%M %p").to_string()
}

/// Rewrite the page at `path` with new cards and timestamp.
///
/// Nothing is written unless every marker is found.
pub fn update_html_file(
    path: &Path,
    cards: &str,
    markers: &RegionMarkers,
    stamp: &str,
) -> Result<()> {
    if !path.exists() {
        return Err(Error::TemplateMissing(path.to_path_buf()));
    }

    let document = std::fs::read_to_string(path)?;
    let updated = splice_region(&document, &wrap_cards(cards), markers)?;
    let updated = replace_last_updated(&updated, stamp);

    std::fs::write(path, updated)?;
    info!(path = %path.display(), "HTML tracker updated");
    Ok(())
}
