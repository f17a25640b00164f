//! Filename metadata heuristics.
//!
//! Downloads rarely carry structured metadata, so author and title are
//! inferred from the release name. The patterns are ordered from most to
//! least specific and the first hit wins.

use std::path::Path;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::types::BookMetadata;

/// Sentinel author used when no pattern matches.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

static TITLE_BY_AUTHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*?)\s+by\s+(.*)$").unwrap());
static TITLE_BRACKETED_AUTHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)\s*\[(.*)\]$").unwrap());
static AUTHOR_DASH_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?)\s*[-–—]+\s*(.+)$").unwrap());

/// Infer author and title from a file or directory name.
///
/// The extension (everything after the last dot) is stripped before
/// matching. Patterns tried in order:
///
/// 1. `"<title> by <author>"` (case-insensitive separator)
/// 2. `"<title> [<author>]"`
/// 3. `"<author> - <title>"` (hyphen, en dash or em dash; both sides
///    must be at least 3 characters)
/// 4. Fallback: the whole name is the title, author is a sentinel.
pub fn parse_book_metadata(name: &str) -> BookMetadata {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());

    let (author, title) = match_name_patterns(&stem)
        .unwrap_or_else(|| (UNKNOWN_AUTHOR.to_string(), stem.clone()));

    BookMetadata {
        author: trim_name_edges(&author),
        title: trim_name_edges(&title),
    }
}

fn match_name_patterns(stem: &str) -> Option<(String, String)> {
    // "<title> by <author>"
    if let Some(caps) = TITLE_BY_AUTHOR.captures(stem) {
        return Some((caps[2].trim().to_string(), caps[1].trim().to_string()));
    }

    // "<title> [<author>]"
    if let Some(caps) = TITLE_BRACKETED_AUTHOR.captures(stem) {
        return Some((caps[2].trim().to_string(), caps[1].trim().to_string()));
    }

    // "<author> - <title>", accepting en/em dashes and repeated dashes.
    // Short fragments on either side are more likely initials or track
    // numbering than a real author/title split.
    if let Some(caps) = AUTHOR_DASH_TITLE.captures(stem) {
        let author = caps[1].trim();
        let title = caps[2].trim();
        if author.chars().count() >= 3 && title.chars().count() >= 3 {
            return Some((author.to_string(), title.to_string()));
        }
    }

    None
}

fn trim_name_edges(name: &str) -> String {
    name.trim_matches(['.', ' ']).to_string()
}

/// Make a string safe for use as a single path component.
///
/// Reserved characters are replaced with underscores, leading/trailing
/// dots and spaces are trimmed, and the result is capped at 100
/// characters.
pub fn sanitize_for_filesystem(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect();

    replaced.trim_matches(['.', ' ']).chars().take(100).collect()
}
