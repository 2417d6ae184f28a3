use chrono::{DateTime, Local};
use instacaption_core::{CoreError, PostRecord};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const FILE_PREFIX: &str = "instagram_post_";

/// Writes one text file per generated post into a flat directory.
///
/// File names carry a second-resolution timestamp, so two posts saved within
/// the same second share a name and the later one replaces the earlier.
#[derive(Debug, Clone)]
pub struct PostStore {
    dir: PathBuf,
}

impl PostStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(at: &DateTime<Local>) -> String {
        format!("{}{}.txt", FILE_PREFIX, at.format("%Y%m%d_%H%M%S"))
    }

    pub fn path_for(&self, at: &DateTime<Local>) -> PathBuf {
        self.dir.join(Self::file_name(at))
    }

    pub fn render(record: &PostRecord, stamp_generated_at: bool) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = writeln!(out, "--- Instagram Post ---");
        let _ = writeln!(out, "Prompt: {}", record.prompt);
        let _ = writeln!(out, "{}", "-".repeat(30));
        let _ = writeln!(out, "Caption: {}", record.caption);
        let _ = writeln!(out, "Emojis: {}", record.emojis);
        let _ = writeln!(out, "Hashtags: {}", record.hashtags);
        if stamp_generated_at {
            let _ = writeln!(
                out,
                "Generated at: {}",
                record.generated_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
        out
    }

    pub async fn save(
        &self,
        record: &PostRecord,
        stamp_generated_at: bool,
    ) -> Result<PathBuf, CoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&record.generated_at);
        tokio::fs::write(&path, Self::render(record, stamp_generated_at)).await?;
        info!("Saved post to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests;
