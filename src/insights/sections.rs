use serde::Serialize;
use tracing::debug;

pub const DELIMITER: &str = "###";
pub const FALLBACK_TITLE: &str = "Response";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

fn whole(text: &str) -> Vec<Section> {
    vec![Section {
        title: FALLBACK_TITLE.to_string(),
        body: text.trim().to_string(),
    }]
}

/// Splits model output on `###` headings into titled sections.
///
/// Text without any heading, or whose headings yield no complete section,
/// comes back as a single `Response` section. Blank input yields nothing.
pub fn split(text: &str) -> Vec<Section> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    if !text.contains(DELIMITER) {
        return whole(text);
    }

    // Text ahead of the first heading is held to the same title/body rule.
    let sections: Vec<Section> = text
        .split(DELIMITER)
        .filter_map(|chunk| {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                return None;
            }
            let (title, body) = chunk.split_once('\n').unwrap_or((chunk, ""));
            let (title, body) = (title.trim(), body.trim());
            if title.is_empty() || body.is_empty() {
                debug!(title, "dropping incomplete section");
                return None;
            }
            Some(Section {
                title: title.to_string(),
                body: body.to_string(),
            })
        })
        .collect();

    if sections.is_empty() {
        return whole(text);
    }
    sections
}
