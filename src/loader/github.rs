// SPDX-License-Identifier: PMPL-1.0-or-later

//! GitHub contents API client for repository scans
//!
//! # Security considerations
//!
//! - The GitHub token is read from `GITHUB_TOKEN` and passed only to
//!   `bearer_auth()`. It is never logged or included in error messages.
//! - Owner, repository and file path are validated before any request is built.

use reqwest::Client;
use tracing::debug;

use crate::error::{Result, ScanError};

/// GitHub allows up to 100 characters for org/user names and repo names.
const MAX_NAME_LENGTH: usize = 100;

const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

/// One file to fetch from a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFile {
    /// `owner/name`
    pub repo: String,
    /// Path inside the repository
    pub path: String,
}

impl RepositoryFile {
    pub fn new(repo: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            path: path.into(),
        }
    }

    /// Split and validate `owner/name`, then validate the path
    pub fn validate(&self) -> Result<(&str, &str)> {
        let (owner, name) = self.repo.split_once('/').ok_or_else(|| {
            ScanError::Input(format!("Invalid repository '{}': expected owner/name", self.repo))
        })?;
        validate_github_name(owner, "repository owner")?;
        validate_github_name(name, "repository name")?;
        validate_file_path(&self.path)?;
        Ok((owner, name))
    }
}

/// Validate a GitHub username, organization or repository name.
///
/// Names must be 1-100 characters of ASCII alphanumerics, hyphens, periods or
/// underscores, must not start or end with a hyphen and must not contain
/// consecutive hyphens.
pub fn validate_github_name(name: &str, field_label: &str) -> Result<()> {
    let reject = |reason: String| -> Result<()> {
        Err(ScanError::Input(format!("Invalid {}: {}", field_label, reason)))
    };

    if name.is_empty() {
        return reject("name cannot be empty".to_string());
    }
    if name.len() > MAX_NAME_LENGTH {
        return reject(format!("name exceeds maximum length of {} characters", MAX_NAME_LENGTH));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return reject(format!("'{}' cannot start or end with a hyphen", name));
    }
    if name.contains("--") {
        return reject(format!("'{}' cannot contain consecutive hyphens", name));
    }
    if name == "." || name == ".." {
        return reject(format!("'{}' is not a name", name));
    }
    if let Some(ch) = name
        .chars()
        .find(|ch| !ch.is_ascii_alphanumeric() && !matches!(ch, '-' | '.' | '_'))
    {
        return reject(format!("'{}' contains disallowed character '{}'", name, ch));
    }
    Ok(())
}

/// Validate a repository file path.
///
/// Rejects empty and absolute paths, null bytes, and `..` components.
pub fn validate_file_path(file_path: &str) -> Result<()> {
    let reject = |reason: String| -> Result<()> { Err(ScanError::Input(reason)) };

    if file_path.trim().is_empty() {
        return reject("File path cannot be empty".to_string());
    }
    if file_path.contains('\0') {
        return reject("File path contains null byte".to_string());
    }
    if file_path.starts_with('/') || file_path.starts_with('\\') {
        return reject(format!("File path cannot be absolute: '{}'", file_path));
    }
    if file_path.split(['/', '\\']).any(|component| component == "..") {
        return reject(format!("File path contains traversal sequence: '{}'", file_path));
    }
    Ok(())
}

/// Fetches raw file bodies through `GET /repos/{owner}/{repo}/contents/{path}`
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Client against `base_url`, authenticated with `GITHUB_TOKEN` when set
    pub fn new(client: Client, base_url: &str) -> Self {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Replace the token read from the environment
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Fetch one file's raw content. Exactly one request, no retries.
    pub async fn get_file_content(&self, file: &RepositoryFile) -> Result<String> {
        let (owner, name) = file.validate()?;
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url,
            owner,
            name,
            file.path.trim_start_matches("./")
        );
        debug!("Fetching {}:{}", file.repo, file.path);

        let mut request = self.client.get(&url).header("Accept", RAW_MEDIA_TYPE);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let fetch_error = |reason: String| ScanError::Fetch {
            url: url.clone(),
            reason,
        };
        let response = request.send().await.map_err(|e| fetch_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }
        response.text().await.map_err(|e| fetch_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_valid_github_names() {
        assert!(validate_github_name("hyperpolymath", "owner").is_ok());
        assert!(validate_github_name("test-org", "owner").is_ok());
        assert!(validate_github_name("user.name", "owner").is_ok());
        assert!(validate_github_name("my_repo", "repo").is_ok());
    }

    #[test]
    fn test_invalid_github_names() {
        assert!(validate_github_name("", "owner").is_err());
        assert!(validate_github_name(&"a".repeat(MAX_NAME_LENGTH + 1), "owner").is_err());
        assert!(validate_github_name("-bad", "owner").is_err());
        assert!(validate_github_name("bad-", "owner").is_err());
        assert!(validate_github_name("bad--name", "owner").is_err());
        assert!(validate_github_name("bad name", "owner").is_err());
        assert!(validate_github_name("..", "repo").is_err());
    }

    #[test]
    fn test_file_paths() {
        assert!(validate_file_path("index.html").is_ok());
        assert!(validate_file_path("docs/about/index.html").is_ok());
        assert!(validate_file_path(".github/templates/page.html").is_ok());
        assert!(validate_file_path("").is_err());
        assert!(validate_file_path("/etc/passwd").is_err());
        assert!(validate_file_path("../secret.html").is_err());
        assert!(validate_file_path("docs/../../x.html").is_err());
        assert!(validate_file_path("docs\\..\\x.html").is_err());
        assert!(validate_file_path("a\0.html").is_err());
    }

    #[test]
    fn test_repository_identifier() {
        let file = RepositoryFile::new("acme/site", "index.html");
        assert_eq!(file.validate().unwrap(), ("acme", "site"));
        assert!(matches!(
            RepositoryFile::new("acme", "index.html").validate(),
            Err(ScanError::Input(_))
        ));
        assert!(RepositoryFile::new("acme/si/te", "index.html").validate().is_err());
    }

    #[tokio::test]
    async fn test_fetch_raw_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/site/contents/docs/index.html"))
            .and(header("Accept", RAW_MEDIA_TYPE))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html lang=\"en\"></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GitHubClient::new(Client::new(), &format!("{}/", server.uri()))
            .with_token(Some("test-token".to_string()));
        let body = client
            .get_file_content(&RepositoryFile::new("acme/site", "docs/index.html"))
            .await
            .unwrap();
        assert_eq!(body, "<html lang=\"en\"></html>");
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = GitHubClient::new(Client::new(), &server.uri()).with_token(None);
        let err = client
            .get_file_content(&RepositoryFile::new("acme/site", "missing.html"))
            .await
            .unwrap_err();
        match err {
            ScanError::Fetch { url, reason } => {
                assert!(url.ends_with("/repos/acme/site/contents/missing.html"));
                assert!(reason.contains("404"));
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_path_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = GitHubClient::new(Client::new(), &server.uri());
        let result = client
            .get_file_content(&RepositoryFile::new("acme/site", "../etc/passwd"))
            .await;
        assert!(matches!(result, Err(ScanError::Input(_))));
    }
}
