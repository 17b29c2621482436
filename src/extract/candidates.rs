use crate::core::types::{DocumentNode, ImageCandidate, NodeRole, TextCandidate};
use crate::extract::tree_search::walk;

/// Caption length band, in characters. Shorter strings are stray labels,
/// longer ones are body copy.
const CAPTION_MIN_EXCLUSIVE: usize = 2;
const CAPTION_MAX_EXCLUSIVE: usize = 100;

pub fn accepts_caption(text: &str) -> bool {
    let len = text.chars().count();
    len > CAPTION_MIN_EXCLUSIVE && len < CAPTION_MAX_EXCLUSIVE
}

/// Candidate for `node` itself, if it is an in-band TEXT node with a box.
pub fn text_candidate(node: &DocumentNode) -> Option<TextCandidate> {
    let NodeRole::Text { characters } = node.role() else {
        return None;
    };
    if !accepts_caption(characters) {
        return None;
    }
    let bbox = node.absolute_bounding_box?;
    Some(TextCandidate {
        node_id: node.id.clone(),
        text: characters.to_string(),
        bbox,
    })
}

/// Candidate for `node` itself, if its first image fill is usable.
pub fn image_candidate(node: &DocumentNode) -> Option<ImageCandidate> {
    let NodeRole::ImageContainer { .. } = node.role() else {
        return None;
    };
    let bbox = node.absolute_bounding_box?;
    Some(ImageCandidate {
        node_id: node.id.clone(),
        bbox,
    })
}

/// Every caption-sized TEXT node under `node`, `node` included.
pub fn collect_text(node: &DocumentNode) -> Vec<TextCandidate> {
    let mut found = Vec::new();
    walk(node, |current, _| {
        if let Some(candidate) = text_candidate(current) {
            found.push(candidate);
        }
    });
    found
}

/// Every image-filled RECTANGLE/FRAME/INSTANCE/COMPONENT under `node`,
/// `node` included, one entry per carrying node.
pub fn collect_images(node: &DocumentNode) -> Vec<ImageCandidate> {
    let mut found = Vec::new();
    walk(node, |current, _| {
        if let Some(candidate) = image_candidate(current) {
            found.push(candidate);
        }
    });
    found
}
