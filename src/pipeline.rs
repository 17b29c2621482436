use tracing::info;

use crate::{
    core::{
        config::Config,
        errors::{AppError, AppResult},
        types::{DocumentNode, MatchMap, NodeRole, RunSummary},
    },
    download::assets::{AssetDownloader, DownloadReport},
    extract::{
        candidates::{collect_images, collect_text},
        matcher::{fill_gaps, seed_from_cards, MatchOptions},
        transliterate::normalize_caption,
        tree_search::{find_first, find_parent},
    },
    providers::design_api::{DesignApi, RenderOptions},
};

#[derive(Debug)]
pub struct ExtractionOutcome {
    pub matches: MatchMap,
    pub report: DownloadReport,
    pub summary: RunSummary,
}

/// Finds the anchor TEXT node and the region that contains it.
pub fn locate_region<'a>(
    root: &'a DocumentNode,
    anchor_text: &str,
) -> AppResult<(&'a DocumentNode, &'a DocumentNode)> {
    let wanted = normalize_caption(anchor_text);
    let anchor = find_first(root, |node| match node.role() {
        NodeRole::Text { characters } => normalize_caption(characters) == wanted,
        _ => false,
    })
    .ok_or_else(|| AppError::AnchorNotFound(anchor_text.to_string()))?;

    let region = find_parent(root, &anchor.id)
        .ok_or_else(|| AppError::ParentNotFound(anchor.id.clone()))?;
    Ok((anchor, region))
}

/// Collects candidates inside `region` and pairs them. The anchor label is
/// never a caption.
pub fn plan_matches(region: &DocumentNode, anchor_id: &str, config: &Config) -> MatchMap {
    let mut texts = collect_text(region);
    texts.retain(|text| text.node_id != anchor_id);
    let images = collect_images(region);
    info!(texts = texts.len(), images = images.len(), "collected candidates");

    let seeded = if config.card_seeding {
        let seeded = seed_from_cards(region, config.max_depth);
        info!(seeded = seeded.len(), "card pass finished");
        seeded
    } else {
        MatchMap::new()
    };

    let options = MatchOptions {
        max_distance: config.max_distance,
        policy: config.match_policy,
    };
    fill_gaps(&texts, &images, options, seeded)
}

/// Full run under the configured deadline.
pub async fn run_extraction<C>(client: &C, config: &Config) -> AppResult<ExtractionOutcome>
where
    C: DesignApi + ?Sized,
{
    match tokio::time::timeout(config.run_deadline, extract_and_download(client, config)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::DeadlineExceeded(config.run_deadline.as_secs())),
    }
}

async fn extract_and_download<C>(client: &C, config: &Config) -> AppResult<ExtractionOutcome>
where
    C: DesignApi + ?Sized,
{
    info!(file_key = %config.file_key, "fetching document");
    let root = client.fetch_document(&config.file_key).await?;

    let (anchor, region) = locate_region(&root, &config.anchor_text)?;
    info!(anchor = %anchor.id, region = %region.id, region_name = %region.name, "anchor located");

    let matches = plan_matches(region, &anchor.id, config);
    if matches.is_empty() {
        info!("no caption matched any image");
    } else {
        info!(
            matched = matches.len(),
            policy = config.match_policy.as_str(),
            "matching finished"
        );
    }

    let downloader = AssetDownloader::new(
        client,
        &config.file_key,
        RenderOptions {
            format: config.image_format,
            scale: config.image_scale,
        },
    );
    let report = downloader
        .resolve_and_save(&matches, &config.output_dir)
        .await?;
    let summary = report.summary(matches.len());

    Ok(ExtractionOutcome {
        matches,
        report,
        summary,
    })
}
