use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Something that handles one image and returns a printable result.
#[async_trait::async_trait]
pub trait ImageProcessor: Send + Sync {
    async fn process(&self, path: &Path) -> Result<String>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Image files directly inside `dir`, sorted by file name.
pub fn find_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory {}", dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Batch: failed to read dir entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if path.is_file() && is_image(&path) {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}

/// Feeds every image in a directory to a processor, one at a time.
pub struct BatchRunner<P: ImageProcessor> {
    processor: P,
}

impl<P: ImageProcessor> BatchRunner<P> {
    pub fn new(processor: P) -> Self {
        Self { processor }
    }

    /// Only a failure to list `dir` is an error; per-image failures are
    /// logged and counted.
    pub async fn run(&self, dir: &Path) -> Result<BatchSummary> {
        let images = find_images(dir)?;
        let mut summary = BatchSummary::default();

        if images.is_empty() {
            log::info!("No images found in {}", dir.display());
        }

        for path in &images {
            log::info!("Processing image: {}", path.display());
            match self.processor.process(path).await {
                Ok(result) => {
                    summary.processed += 1;
                    log::info!("LLM processing result: {}", result);
                }
                Err(e) => {
                    summary.failed += 1;
                    log::error!("Error processing image {}: {:#}", path.display(), e);
                }
            }
        }

        log::info!(
            "Processing complete. {} succeeded, {} failed",
            summary.processed,
            summary.failed
        );
        Ok(summary)
    }
}
