pub mod anchors;
pub mod origins;

use origins::AttributedEvent;

/// Two-pass extraction: html → anchors → events attributed to their search.
pub fn extract_events(html: &str, marker_label: &str) -> Vec<AttributedEvent> {
    let anchors = anchors::extract_anchors(html);
    origins::assign_origins(&anchors, marker_label)
}
