use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::core::{
    errors::{AppError, AppResult},
    types::{MatchMap, RunSummary},
};
use crate::extract::transliterate::{file_stem, normalize_caption};
use crate::providers::design_api::{DesignApi, RenderOptions};

#[derive(Debug, Clone)]
pub struct SavedAsset {
    pub node_id: String,
    pub caption: String,
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug)]
pub struct FailedAsset {
    pub node_id: String,
    pub caption: String,
    pub error: AppError,
}

#[derive(Debug, Default)]
pub struct DownloadReport {
    pub saved: Vec<SavedAsset>,
    pub skipped: Vec<String>,
    pub failed: Vec<FailedAsset>,
}

impl DownloadReport {
    pub fn summary(&self, matched: usize) -> RunSummary {
        RunSummary {
            matched,
            downloaded: self.saved.len(),
            skipped: self.skipped.len(),
            failed: self.failed.len(),
        }
    }
}

/// Turns a [`MatchMap`] into files on disk, one request at a time.
pub struct AssetDownloader<'a, C: DesignApi + ?Sized> {
    client: &'a C,
    file_key: &'a str,
    options: RenderOptions,
}

impl<'a, C: DesignApi + ?Sized> AssetDownloader<'a, C> {
    pub fn new(client: &'a C, file_key: &'a str, options: RenderOptions) -> Self {
        Self {
            client,
            file_key,
            options,
        }
    }

    /// Resolves every matched id in one batch, then downloads sequentially in
    /// match order. `target_dir` is created right before the first write, so
    /// a run that writes nothing leaves the filesystem untouched.
    ///
    /// Only URL resolution and directory creation abort the batch; a failed
    /// download is recorded and the loop moves on.
    pub async fn resolve_and_save(
        &self,
        matches: &MatchMap,
        target_dir: &Path,
    ) -> AppResult<DownloadReport> {
        let mut report = DownloadReport::default();
        if matches.is_empty() {
            info!("no matches, nothing to download");
            return Ok(report);
        }

        let ids: Vec<String> = matches.keys().cloned().collect();
        let urls = self
            .client
            .fetch_image_urls(self.file_key, &ids, self.options)
            .await?;

        let mut dir_ready = false;
        let mut used_stems: HashSet<String> = HashSet::new();

        for (node_id, caption) in matches {
            let caption = normalize_caption(caption);
            let Some(url) = urls.get(node_id).cloned().flatten() else {
                warn!(node_id = %node_id, caption = %caption, "renderer returned no image, skipping");
                report.skipped.push(node_id.clone());
                continue;
            };

            if !dir_ready {
                tokio::fs::create_dir_all(target_dir).await?;
                dir_ready = true;
            }

            let stem = unique_stem(file_stem(&caption, node_id), &mut used_stems);
            let path = target_dir.join(format!("{stem}.{}", self.options.format.extension()));

            match self.client.download_image(&url, &path).await {
                Ok(bytes) => {
                    info!(node_id = %node_id, caption = %caption, file = %path.display(), bytes, "saved");
                    report.saved.push(SavedAsset {
                        node_id: node_id.clone(),
                        caption,
                        path,
                        bytes,
                    });
                }
                Err(error) => {
                    warn!(node_id = %node_id, caption = %caption, code = error.code(), %error, "download failed");
                    report.failed.push(FailedAsset {
                        node_id: node_id.clone(),
                        caption,
                        error,
                    });
                }
            }
        }

        Ok(report)
    }
}

/// Suffixes `_2`, `_3`, … when two captions land on the same slug.
fn unique_stem(stem: String, used: &mut HashSet<String>) -> String {
    if used.insert(stem.clone()) {
        return stem;
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{stem}_{counter}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
