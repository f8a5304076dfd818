use serde::Serialize;
use tracing::debug;

use super::anchors::Anchor;

/// An event link paired with the saved search that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributedEvent {
    pub search_url: String,
    pub event_url: String,
    pub event_text: String,
}

pub fn is_search_marker(anchor: &Anchor, label: &str) -> bool {
    anchor.text == label
}

/// Positions of the search marker anchors, in order.
pub fn find_marker_positions(anchors: &[Anchor], label: &str) -> Vec<usize> {
    anchors
        .iter()
        .enumerate()
        .filter(|(_, a)| is_search_marker(a, label))
        .map(|(i, _)| i)
        .collect()
}

/// Tag every event anchor with the URL of the marker that closes its block.
///
/// Alerts list events first, then the "go to my searches" link of the search
/// they came from, then the next search's events, and so on. Whatever follows
/// the last marker is footer boilerplate and is dropped; with no marker at all
/// nothing is emitted.
pub fn assign_origins(anchors: &[Anchor], label: &str) -> Vec<AttributedEvent> {
    let markers = find_marker_positions(anchors, label);
    if markers.is_empty() {
        if !anchors.is_empty() {
            debug!(anchors = anchors.len(), "no search marker, dropping all anchors");
        }
        return Vec::new();
    }

    let mut events = Vec::with_capacity(anchors.len() - markers.len());
    let mut start = 0;
    for &pos in &markers {
        let search_url = &anchors[pos].url;
        for anchor in &anchors[start..pos] {
            events.push(AttributedEvent {
                search_url: search_url.clone(),
                event_url: anchor.url.clone(),
                event_text: anchor.text.clone(),
            });
        }
        start = pos + 1;
    }

    let trailing = anchors.len() - start;
    if trailing > 0 {
        debug!(trailing, "dropping anchors after last search marker");
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL: &str = "GO TO MY SEARCHES";

    fn a(url: &str, text: &str) -> Anchor {
        Anchor {
            url: url.into(),
            text: text.into(),
        }
    }

    fn triple(e: &AttributedEvent) -> (&str, &str, &str) {
        (&e.search_url, &e.event_url, &e.event_text)
    }

    #[test]
    fn single_block() {
        let anchors = vec![a("http://e1", "Acme raises cash"), a("http://s1", LABEL)];
        let events = assign_origins(&anchors, LABEL);
        assert_eq!(events.len(), 1);
        assert_eq!(triple(&events[0]), ("http://s1", "http://e1", "Acme raises cash"));
    }

    #[test]
    fn multiple_blocks_and_trailing_links() {
        let anchors = vec![
            a("http://e1", "one"),
            a("http://e2", "two"),
            a("http://s1", LABEL),
            a("http://e3", "three"),
            a("http://s2", LABEL),
            a("http://unsubscribe", "Unsubscribe"),
            a("http://privacy", "Privacy"),
        ];
        let events = assign_origins(&anchors, LABEL);
        let got: Vec<_> = events.iter().map(triple).collect();
        assert_eq!(
            got,
            vec![
                ("http://s1", "http://e1", "one"),
                ("http://s1", "http://e2", "two"),
                ("http://s2", "http://e3", "three"),
            ]
        );
    }

    #[test]
    fn adjacent_markers_make_empty_block() {
        let anchors = vec![
            a("http://e1", "one"),
            a("http://s1", LABEL),
            a("http://s2", LABEL),
            a("http://e2", "two"),
            a("http://s3", LABEL),
        ];
        let got: Vec<_> = assign_origins(&anchors, LABEL)
            .iter()
            .map(|e| e.search_url.clone())
            .collect();
        assert_eq!(got, vec!["http://s1", "http://s3"]);
    }

    #[test]
    fn no_markers_yields_nothing() {
        let anchors = vec![a("http://e1", "one"), a("http://e2", "two")];
        assert!(assign_origins(&anchors, LABEL).is_empty());
        assert!(assign_origins(&[], LABEL).is_empty());
    }

    #[test]
    fn marker_must_match_exactly() {
        let anchors = vec![
            a("http://e1", "one"),
            a("http://s1", "go to my searches"),
            a("http://s2", "GO TO MY SEARCHES now"),
        ];
        assert!(find_marker_positions(&anchors, LABEL).is_empty());
    }

    #[test]
    fn count_is_anchors_minus_markers() {
        let anchors = vec![
            a("http://e1", "one"),
            a("http://s1", LABEL),
            a("http://e2", "two"),
            a("http://e3", "three"),
            a("http://s2", LABEL),
        ];
        assert_eq!(assign_origins(&anchors, LABEL).len(), anchors.len() - 2);
    }
}
