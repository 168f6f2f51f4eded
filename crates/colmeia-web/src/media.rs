//! Stored upload files under the configured media directory.

use std::io;
use std::path::{Component, Path, PathBuf};

pub const ATTACHMENT_DIR: &str = "revision_attachments";
pub const HIVE_PHOTO_DIR: &str = "hive_photos";

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under `dir`, returning the path relative to the root.
    ///
    /// The file name is reduced to safe characters and suffixed with a
    /// counter when it is already taken.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from creating the directory or the file.
    pub async fn save(&self, dir: &str, file_name: &str, bytes: &[u8]) -> io::Result<String> {
        let target_dir = self.root.join(dir);
        tokio::fs::create_dir_all(&target_dir).await?;

        let clean = sanitize_file_name(file_name);
        let (stem, extension) = match clean.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => (stem.to_string(), format!(".{extension}")),
            _ => (clean.clone(), String::new()),
        };
        let mut candidate = clean;
        let mut attempt = 1;
        loop {
            let path = target_dir.join(&candidate);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    tokio::io::AsyncWriteExt::write_all(&mut file, bytes).await?;
                    tracing::debug!(path = %path.display(), size = bytes.len(), "media file stored");
                    return Ok(format!("{dir}/{candidate}"));
                }
                Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
                    candidate = format!("{stem}_{attempt}{extension}");
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Remove stored files, logging and skipping the ones that fail.
    pub async fn remove_all(&self, relative_paths: &[String]) {
        for relative in relative_paths {
            let Some(path) = self.resolve(relative) else {
                tracing::warn!(path = %relative, "refusing to remove a path outside the media root");
                continue;
            };
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "media file removed"),
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => {
                    tracing::warn!(err.msg = %error, path = %path.display(), "media file not removed");
                }
            }
        }
    }

    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
            .then(|| self.root.join(relative))
    }
}

fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(|c| c == '/' || c == '\\').next().unwrap_or_default();
    let clean: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let clean = clean.trim_start_matches('.');
    if clean.is_empty() {
        "arquivo".to_string()
    } else {
        clean.to_string()
    }
}
