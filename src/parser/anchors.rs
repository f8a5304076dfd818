use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

// Best-effort textual scan of alert HTML. Not a markup parser: anchors are
// assumed flat (no nesting) with a single quoted href.
static A_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<a.*?</a>").unwrap());
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href=["']([A-Za-z0-9_:/.?=-]*)"#).unwrap());
static TEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">[A-Za-z0-9_\s-]*<").unwrap());
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]").unwrap());
static WS_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub url: String,
    pub text: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnchorError {
    #[error("anchor has no resolvable href")]
    MissingUrl,
    #[error("anchor text has no word or digit character")]
    NoText,
}

/// Every anchor of `html` that carries both a URL and readable text, in
/// document order. Decorative or icon-only links are dropped.
pub fn extract_anchors(html: &str) -> Vec<Anchor> {
    A_TAG_RE
        .find_iter(html)
        .filter_map(|m| match parse_anchor(m.as_str()) {
            Ok(anchor) => Some(anchor),
            Err(e) => {
                debug!(offset = m.start(), "dropping anchor: {}", e);
                None
            }
        })
        .collect()
}

/// Parse a single `<a …>…</a>` fragment.
pub fn parse_anchor(fragment: &str) -> Result<Anchor, AnchorError> {
    let url = HREF_RE
        .captures(fragment)
        .map(|c| c[1].to_string())
        .filter(|u| !u.is_empty())
        .ok_or(AnchorError::MissingUrl)?;

    let segments: Vec<&str> = TEXT_RE.find_iter(fragment).map(|m| m.as_str()).collect();
    if segments.is_empty() {
        return Err(AnchorError::NoText);
    }
    let joined = segments.join(" ");
    if !WORD_RE.is_match(&joined) {
        return Err(AnchorError::NoText);
    }

    Ok(Anchor {
        url,
        text: clean_text(&joined),
    })
}

/// Strip brackets and newlines, then collapse whitespace runs. Newlines go
/// first, so "a\nb" becomes "ab".
fn clean_text(raw: &str) -> String {
    let stripped = raw.replace(['<', '>', '\n'], "");
    WS_RUN_RE.replace_all(&stripped, " ").trim().to_string()
}
