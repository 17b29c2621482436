use std::collections::HashSet;

use tracing::debug;

use crate::core::{
    config::DEFAULT_MAX_DISTANCE,
    types::{DocumentNode, ImageCandidate, MatchMap, MatchPolicy, TextCandidate},
};
use crate::extract::{
    candidates::{image_candidate, text_candidate},
    tree_search::walk_with_depth_limit,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub max_distance: f64,
    pub policy: MatchPolicy,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            policy: MatchPolicy::FirstWins,
        }
    }
}

/// Image whose centroid is closest to the caption's centroid. Ties keep the
/// earlier image.
pub fn nearest_image<'a>(
    text: &TextCandidate,
    images: &'a [ImageCandidate],
) -> Option<(&'a ImageCandidate, f64)> {
    let origin = text.bbox.center();
    images.iter().fold(None, |best, image| {
        let distance = origin.distance_to(image.bbox.center());
        match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((image, distance)),
        }
    })
}

/// Pairs every caption with its nearest image within `max_distance`.
pub fn match_candidates(
    texts: &[TextCandidate],
    images: &[ImageCandidate],
    options: MatchOptions,
) -> MatchMap {
    fill_gaps(texts, images, options, MatchMap::new())
}

/// Spatial pass on top of `seeded` pairs. A caption whose nearest image is
/// already seeded adds nothing, so seeds are never overridden.
pub fn fill_gaps(
    texts: &[TextCandidate],
    images: &[ImageCandidate],
    options: MatchOptions,
    seeded: MatchMap,
) -> MatchMap {
    let seeded_ids: HashSet<String> = seeded.keys().cloned().collect();
    let mut matches = seeded;

    for text in texts {
        let Some((image, distance)) = nearest_image(text, images) else {
            continue;
        };
        if distance > options.max_distance {
            debug!(caption = %text.text, nearest = %image.node_id, distance, "no image in range");
            continue;
        }
        if seeded_ids.contains(&image.node_id) {
            continue;
        }

        match options.policy {
            MatchPolicy::FirstWins => {
                if let Some(kept) = matches.get(&image.node_id) {
                    debug!(node_id = %image.node_id, kept = %kept, dropped = %text.text, "image already captioned");
                    continue;
                }
                matches.insert(image.node_id.clone(), text.text.clone());
            }
            MatchPolicy::LastWins => {
                if let Some(previous) =
                    matches.insert(image.node_id.clone(), text.text.clone())
                {
                    debug!(node_id = %image.node_id, replaced = %previous, caption = %text.text, "caption overwritten");
                }
            }
        }
        debug!(node_id = %image.node_id, caption = %text.text, distance, "matched");
    }

    matches
}

/// Card-scan pass: each direct child of `region` is treated as one card and
/// its first caption is paired with its first image, looking no deeper than
/// `max_depth` below the card.
pub fn seed_from_cards(region: &DocumentNode, max_depth: usize) -> MatchMap {
    let mut seeds = MatchMap::new();
    for card in &region.children {
        let mut caption: Option<TextCandidate> = None;
        let mut artwork: Option<ImageCandidate> = None;
        walk_with_depth_limit(card, max_depth, |node, _| {
            if caption.is_none() {
                caption = text_candidate(node);
            }
            if artwork.is_none() {
                artwork = image_candidate(node);
            }
        });

        if let (Some(caption), Some(artwork)) = (caption, artwork) {
            debug!(card = %card.id, node_id = %artwork.node_id, caption = %caption.text, "seeded from card");
            seeds.entry(artwork.node_id).or_insert(caption.text);
        }
    }
    seeds
}
