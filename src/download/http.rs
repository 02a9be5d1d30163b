//! Streams images over HTTP (or copies local `file://` images) into the
//! output directory

use crate::download::error::{DownloadError, DownloadResult};
use crate::download::provider::{DownloadOutcome, DownloadProvider, DownloadRequest};
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Name used when a URL yields no usable filename
const FALLBACK_FILENAME: &str = "download";

/// Upper bound on ` (n)` suffixes tried before giving up
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Download provider with real completion reporting
///
/// Files are written into the output directory under the requested name.
/// Existing files are never overwritten: `cat.png` becomes `cat (1).png`,
/// `cat (2).png` and so on. A transfer that fails midway removes its
/// partial file. `file://` URLs, as found on local pages, are copied from
/// disk instead of fetched.
pub struct HttpDownloadProvider {
    client: Client,
    output_dir: PathBuf,
}

impl HttpDownloadProvider {
    pub fn new(client: Client, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
        }
    }

    async fn fetch_to_disk(&self, request: &DownloadRequest) -> DownloadResult<PathBuf> {
        if let Ok(url) = Url::parse(&request.url) {
            if url.scheme() == "file" {
                return self.copy_local(request, &url).await;
            }
        }

        let network = |source: reqwest::Error| DownloadError::Network {
            url: request.url.clone(),
            source,
        };

        let mut response = self
            .client
            .get(&request.url)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        let (path, mut file) = self.reserve_destination(&request.filename).await?;

        let io_error = |source: std::io::Error| DownloadError::Io {
            path: path.display().to_string(),
            source,
        };

        let written: DownloadResult<()> = async {
            while let Some(chunk) = response.chunk().await.map_err(network)? {
                file.write_all(&chunk).await.map_err(io_error)?;
            }
            file.flush().await.map_err(io_error)?;
            Ok(())
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(e);
        }

        Ok(path)
    }

    /// Copies an image referenced by a `file://` URL
    async fn copy_local(&self, request: &DownloadRequest, url: &Url) -> DownloadResult<PathBuf> {
        let source_path = url
            .to_file_path()
            .map_err(|_| DownloadError::InvalidFileUrl(request.url.clone()))?;

        let mut source = File::open(&source_path)
            .await
            .map_err(|source| DownloadError::Io {
                path: source_path.display().to_string(),
                source,
            })?;

        let (path, mut file) = self.reserve_destination(&request.filename).await?;

        let copied = async {
            tokio::io::copy(&mut source, &mut file).await?;
            file.flush().await
        }
        .await;

        if let Err(source) = copied {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(DownloadError::Io {
                path: path.display().to_string(),
                source,
            });
        }

        Ok(path)
    }

    /// Creates the output directory and a fresh file for the download
    async fn reserve_destination(&self, filename: &str) -> DownloadResult<(PathBuf, File)> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| DownloadError::Io {
                path: self.output_dir.display().to_string(),
                source,
            })?;

        create_unique(&self.output_dir, &sanitize_filename(filename)).await
    }
}

#[async_trait]
impl DownloadProvider for HttpDownloadProvider {
    async fn download(&self, request: DownloadRequest) -> DownloadOutcome {
        match self.fetch_to_disk(&request).await {
            Ok(path) => {
                tracing::debug!("Saved {} to {}", request.url, path.display());
                DownloadOutcome::Success { path: Some(path) }
            }
            Err(e) => {
                tracing::debug!("Download of {} failed: {}", request.url, e);
                DownloadOutcome::Failure {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Makes a decoded URL segment safe to use as a single file name
///
/// Path separators and control characters become `_`; names that are empty
/// or consist only of dots fall back to a fixed name.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Builds the `n`th alternative of a file name: `cat.png` -> `cat (n).png`
fn numbered_name(name: &str, n: u32) -> String {
    if n == 0 {
        return name.to_string();
    }

    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({}){}", &name[..dot], n, &name[dot..]),
        _ => format!("{} ({})", name, n),
    }
}

/// Creates a new file that did not exist before, picking a free name
async fn create_unique(dir: &Path, name: &str) -> DownloadResult<(PathBuf, File)> {
    for n in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(numbered_name(name, n));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(source) => {
                return Err(DownloadError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        }
    }

    Err(DownloadError::NameExhausted(name.to_string()))
}
