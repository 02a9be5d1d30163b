//! Page sources
//!
//! A [`PageSource`] produces a fresh [`Document`] every time it is loaded,
//! which is how the scanner sees a page that changes over time.

use crate::page::document::Document;
use crate::page::fetcher::fetch_page;
use crate::PageError;
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

/// Something that can be (re)loaded into a [`Document`]
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Loads the current state of the page
    async fn load(&self) -> Result<Document, PageError>;

    /// Human-readable location of the page
    fn location(&self) -> String;
}

/// A page served over HTTP(S)
pub struct HttpPageSource {
    client: Client,
    url: Url,
}

impl HttpPageSource {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn load(&self) -> Result<Document, PageError> {
        let fetched = fetch_page(&self.client, &self.url).await?;
        Ok(Document::parse(&fetched.body, fetched.final_url))
    }

    fn location(&self) -> String {
        self.url.to_string()
    }
}

/// A page stored in a local HTML file
///
/// Relative links resolve against the file's own `file://` URL.
pub struct FilePageSource {
    path: PathBuf,
    url: Url,
}

impl FilePageSource {
    /// Creates a source for the given file
    ///
    /// Relative paths are resolved against the current directory. The file
    /// does not have to exist yet; it is read on every load.
    pub fn new(path: &Path) -> Result<Self, PageError> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|source| PageError::Io {
                    path: path.display().to_string(),
                    source,
                })?
                .join(path)
        };

        let url = Url::from_file_path(&absolute).map_err(|_| {
            PageError::InvalidLocation(format!("cannot build a file URL for {}", absolute.display()))
        })?;

        Ok(Self {
            path: absolute,
            url,
        })
    }
}

#[async_trait]
impl PageSource for FilePageSource {
    async fn load(&self) -> Result<Document, PageError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| PageError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        Ok(Document::parse(&body, self.url.clone()))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Opens a page source from a command-line location
///
/// `http://` and `https://` locations are fetched with `client`; `file://`
/// URLs and anything else are treated as local file paths.
pub fn open_source(location: &str, client: &Client) -> Result<Box<dyn PageSource>, PageError> {
    if let Ok(url) = Url::parse(location) {
        match url.scheme() {
            "http" | "https" => {
                return Ok(Box::new(HttpPageSource::new(client.clone(), url)));
            }
            "file" => {
                let path = url.to_file_path().map_err(|_| {
                    PageError::InvalidLocation(format!("not a local file URL: {}", location))
                })?;
                return Ok(Box::new(FilePageSource::new(&path)?));
            }
            _ => {}
        }
    }

    Ok(Box::new(FilePageSource::new(Path::new(location))?))
}
