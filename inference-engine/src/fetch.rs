use instacaption_core::{CoreError, ModelError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A file a model directory needs. Candidates are tried in order, so BERT-era
/// repos that only ship `vocab.txt` and `pytorch_model.bin` still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelFile {
    pub role: &'static str,
    pub candidates: &'static [&'static str],
}

impl ModelFile {
    pub fn find(&self, model_dir: &Path) -> Option<PathBuf> {
        self.candidates
            .iter()
            .map(|file| model_dir.join(file))
            .find(|path| path.exists())
    }
}

pub const MODEL_FILES: [ModelFile; 3] = [
    ModelFile {
        role: "config",
        candidates: &["config.json"],
    },
    ModelFile {
        role: "tokenizer",
        candidates: &["tokenizer.json", "vocab.txt"],
    },
    ModelFile {
        role: "weights",
        candidates: &["model.safetensors", "pytorch_model.bin"],
    },
];

pub fn missing_model_files(model_dir: &Path) -> Vec<ModelFile> {
    MODEL_FILES
        .into_iter()
        .filter(|file| file.find(model_dir).is_none())
        .collect()
}

pub fn resolve_url(hub_url: &str, repo: &str, file: &str) -> String {
    format!(
        "{}/{}/resolve/main/{}",
        hub_url.trim_end_matches('/'),
        repo,
        file
    )
}

/// `Ok(false)` when the hub does not serve `file`.
async fn download(
    client: &reqwest::Client,
    url: &str,
    model_dir: &Path,
    file: &str,
) -> Result<bool, CoreError> {
    let response = match client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
    {
        Ok(response) => response,
        Err(e) => {
            debug!("{} not available: {}", url, e);
            return Ok(false);
        }
    };
    let content = response.bytes().await.map_err(|_| ModelError::DownloadFailed {
        url: url.to_string(),
    })?;

    let target = model_dir.join(file);
    // write through a temporary name so an interrupted download is not picked up
    let partial = model_dir.join(format!("{file}.part"));
    tokio::fs::write(&partial, &content).await?;
    tokio::fs::rename(&partial, &target).await?;
    debug!("Saved {} ({} bytes)", target.display(), content.len());
    Ok(true)
}

/// Downloads any missing model file of `repo` into `model_dir`.
pub async fn ensure_model_files(
    hub_url: &str,
    repo: &str,
    model_dir: &Path,
) -> Result<PathBuf, CoreError> {
    let missing = missing_model_files(model_dir);
    if missing.is_empty() {
        debug!("All model files present in {}", model_dir.display());
        return Ok(model_dir.to_path_buf());
    }

    tokio::fs::create_dir_all(model_dir).await?;
    let client = reqwest::Client::new();

    for file in missing {
        let mut last_url = String::new();
        let mut fetched = false;
        for candidate in file.candidates {
            last_url = resolve_url(hub_url, repo, candidate);
            info!("Downloading {} {} from {}", file.role, candidate, last_url);
            if download(&client, &last_url, model_dir, candidate).await? {
                fetched = true;
                break;
            }
        }
        if !fetched {
            return Err(ModelError::DownloadFailed { url: last_url }.into());
        }
    }

    Ok(model_dir.to_path_buf())
}

/// Fails with the first missing file when downloads are disabled.
pub fn require_model_files(model_dir: &Path) -> Result<(), CoreError> {
    match missing_model_files(model_dir).first() {
        Some(file) => Err(ModelError::FileNotFound {
            path: model_dir.join(file.candidates[0]).display().to_string(),
        }
        .into()),
        None => Ok(()),
    }
}
