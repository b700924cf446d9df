use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const FIRST_SWEEP_DELAY: Duration = Duration::from_secs(10 * 60);
const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Deletes files in `folder` last modified more than `retention` ago, returning how many went
pub async fn sweep_image_cache(folder: &Path, retention: Duration) -> Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(retention)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut entries = match tokio::fs::read_dir(folder).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() || metadata.modified()? > cutoff {
            continue;
        }
        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!("Failed to delete cached image {}: {e}", entry.path().display()),
        }
    }
    Ok(removed)
}

/// Sweeps the image cache daily, starting ten minutes from now
pub fn spawn_image_janitor(
    runtime: &tokio::runtime::Handle,
    folder: PathBuf,
    retention: Duration,
) -> tokio::task::JoinHandle<()> {
    runtime.spawn(async move {
        let start = tokio::time::Instant::now() + FIRST_SWEEP_DELAY;
        let mut ticker = tokio::time::interval_at(start, SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            match sweep_image_cache(&folder, retention).await {
                Ok(removed) => tracing::debug!("Removed {removed} cached images from {}", folder.display()),
                Err(e) => tracing::error!("Image cache sweep of {} failed: {e:#}", folder.display()),
            }
        }
    })
}
