// SPDX-License-Identifier: PMPL-1.0-or-later
//! Document loader.
//!
//! Turns a [`Source`] into the [`ScanUnit`]s the engine checks. This is the
//! only part of a scan that performs I/O.

pub mod github;

pub use github::{GitHubClient, RepositoryFile};

use crate::config::LoaderConfig;
use crate::error::{Result, ScanError};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Where the HTML to scan comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Fetch one page over HTTP(S)
    Url(String),
    /// Literal HTML supplied by the caller, optionally named
    File {
        name: Option<String>,
        content: Option<String>,
    },
    /// One HTML file on disk
    Path(PathBuf),
    /// Every HTML file under a directory
    Directory(PathBuf),
    /// Files fetched from GitHub repositories
    Repository(Vec<RepositoryFile>),
}

impl Source {
    /// Literal HTML with no name
    pub fn html(content: impl Into<String>) -> Self {
        Source::File {
            name: None,
            content: Some(content.into()),
        }
    }
}

/// One document to scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanUnit {
    pub html: String,
    /// Copied onto every issue found in this unit
    pub file_path: Option<String>,
}

impl ScanUnit {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            file_path: None,
        }
    }

    pub fn with_path(html: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            file_path: Some(path.into()),
        }
    }
}

/// Resolves sources into scan units
pub struct Loader {
    client: Client,
    github: GitHubClient,
    config: LoaderConfig,
}

impl Loader {
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ScanError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            github: GitHubClient::new(client.clone(), &config.github_api_url),
            client,
            config: config.clone(),
        })
    }

    /// Replace the GitHub token read from the environment
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github = self.github.with_token(token);
        self
    }

    /// Load every unit of `source`. URL and file modes yield exactly one unit.
    pub async fn load(&self, source: &Source) -> Result<Vec<ScanUnit>> {
        let units = match source {
            Source::Url(url) => vec![ScanUnit::new(self.fetch_url(url).await?)],
            Source::File { name, content } => {
                let html = require_content(content.as_deref(), name.as_deref().unwrap_or("file"))?;
                vec![ScanUnit {
                    html: html.to_string(),
                    file_path: name.clone(),
                }]
            }
            Source::Path(path) => {
                let html = read_html(path)?;
                vec![ScanUnit::with_path(html, path.display().to_string())]
            }
            Source::Directory(root) => self.walk_directory(root)?,
            Source::Repository(files) => self.fetch_repository(files).await?,
        };
        info!("Loaded {} unit(s)", units.len());
        Ok(units)
    }

    async fn fetch_url(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);
        let fetch_error = |reason: String| ScanError::Fetch {
            url: url.to_string(),
            reason,
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }
        response.text().await.map_err(|e| fetch_error(e.to_string()))
    }

    async fn fetch_repository(&self, files: &[RepositoryFile]) -> Result<Vec<ScanUnit>> {
        if files.is_empty() {
            return Err(ScanError::Input("No repository files given".to_string()));
        }
        // Validate everything before the first request
        for file in files {
            file.validate()?;
        }

        let mut units = Vec::with_capacity(files.len());
        for file in files {
            let body = self.github.get_file_content(file).await?;
            require_content(Some(&body), &file.path)?;
            units.push(ScanUnit::with_path(body, file.path.clone()));
        }
        Ok(units)
    }

    fn walk_directory(&self, root: &Path) -> Result<Vec<ScanUnit>> {
        if !root.is_dir() {
            return Err(ScanError::Input(format!("Not a directory: {}", root.display())));
        }
        info!("Scanning directory: {}", root.display());

        let skip_dirs = &self.config.skip_dirs;
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                // Skip hidden and excluded directories below the root
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                let name = e.file_name().to_str().unwrap_or("");
                !skip_dirs.iter().any(|d| d == name) && !name.starts_with('.')
            })
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && self.is_scannable(e.path()))
            .map(|e| e.into_path())
            .collect();
        files.sort();

        let mut units = Vec::with_capacity(files.len());
        for path in files {
            let html = match read_html(&path) {
                Ok(html) => html,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            units.push(ScanUnit::with_path(html, relative_path(root, &path)));
        }

        if units.is_empty() {
            return Err(ScanError::Input(format!(
                "No HTML files found under {}",
                root.display()
            )));
        }
        Ok(units)
    }

    fn is_scannable(&self, path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.config
            .extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

fn require_content<'a>(content: Option<&'a str>, name: &str) -> Result<&'a str> {
    match content {
        None => Err(ScanError::Input(format!("No content supplied for {}", name))),
        Some(c) if c.trim().is_empty() => Err(ScanError::Input(format!("{} is empty", name))),
        Some(c) => Ok(c),
    }
}

fn read_html(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| ScanError::Input(format!("Cannot read {}: {}", path.display(), e)))?;
    let html = String::from_utf8(bytes)
        .map_err(|_| ScanError::Input(format!("{} is not valid UTF-8", path.display())))?;
    require_content(Some(&html), &path.display().to_string())?;
    Ok(html)
}

/// `/`-separated path of `path` relative to `root`
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
