use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::pipeline::RawMessage;

const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// Load every alert saved as an HTML file in `dir`, sorted by file name. The
/// file stem is the message id.
pub fn load_dir(dir: &Path) -> Result<Vec<RawMessage>> {
    let mut paths: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {:?}", dir))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_html(p))
        .collect();
    paths.sort();

    let mut messages = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            debug!("skipping non UTF-8 file name {:?}", path);
            continue;
        };
        let html = fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        messages.push(RawMessage {
            id: id.to_string(),
            html,
        });
    }

    info!("Loaded {} messages from {:?}", messages.len(), dir);
    Ok(messages)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| HTML_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}
