use anyhow::{anyhow, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::info;

/// A place a PDF can come from. Fetching writes the file into `dest_dir`
/// and returns the written path.
#[async_trait]
pub trait PdfSource: Send + Sync {
    async fn fetch(&self, dest_dir: &Path) -> Result<PathBuf>;

    /// Human-readable name of the document, used to label the index
    fn label(&self) -> String;
}

/// Download a paper from arXiv by identifier
pub struct ArxivSource {
    id: String,
}

impl ArxivSource {
    /// Validates the identifier before any network call. Only the modern
    /// `NNNN.NNNNN` form (with optional version suffix) is accepted.
    pub fn new(id: &str) -> Result<Self> {
        let re = Regex::new(r"^\d{4}\.\d{4,5}(v\d+)?$")?;
        if !re.is_match(id) {
            return Err(anyhow!("invalid arXiv identifier: {}", id));
        }
        Ok(Self { id: id.to_string() })
    }

    pub fn pdf_url(&self) -> String {
        format!("https://arxiv.org/pdf/{}.pdf", self.id)
    }
}

#[async_trait]
impl PdfSource for ArxivSource {
    async fn fetch(&self, dest_dir: &Path) -> Result<PathBuf> {
        let client = Client::new();
        let url = self.pdf_url();
        info!(%url, "downloading PDF");

        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "failed to download PDF: status {}",
                response.status()
            ));
        }

        let body = response.bytes().await?;
        save_pdf_bytes(dest_dir, &format!("{}.pdf", self.id), &body)
    }

    fn label(&self) -> String {
        format!("arXiv:{}", self.id)
    }
}

/// Use a PDF already on disk
pub struct LocalSource {
    path: PathBuf,
}

impl LocalSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_owned();
        if path.extension().and_then(|e| e.to_str()) != Some("pdf") {
            return Err(anyhow!("not a PDF file: {}", path.display()));
        }
        if !path.is_file() {
            return Err(anyhow!("file not found: {}", path.display()));
        }
        Ok(Self { path })
    }
}

#[async_trait]
impl PdfSource for LocalSource {
    async fn fetch(&self, dest_dir: &Path) -> Result<PathBuf> {
        let filename = self
            .path
            .file_name()
            .ok_or_else(|| anyhow!("invalid filename: {}", self.path.display()))?;
        let dest_path = dest_dir.join(filename);
        std::fs::copy(&self.path, &dest_path)?;
        Ok(dest_path)
    }

    fn label(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.pdf")
            .to_string()
    }
}

/// Write downloaded PDF bytes to disk, exactly as received
pub fn save_pdf_bytes(dest_dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = dest_dir.join(filename);
    std::fs::write(&path, bytes)?;
    Ok(path)
}
