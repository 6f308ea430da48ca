//! Release-server access.
//!
//! The server publishes a plain-text `LATEST` manifest and one zip archive
//! per version/OS/architecture triple. Fetches are single attempts; any
//! transport error or non-success status is fatal.

use shub_core::platform::Platform;
use shub_core::{Error, Result};
use tracing::debug;

/// Base URL of the SecretHub release server.
pub const DEFAULT_BASE_URL: &str = "https://get.secrethub.io/releases";

/// Client for the SecretHub release server.
#[derive(Debug, Clone)]
pub struct ReleaseServer {
    http: reqwest::Client,
    base_url: String,
}

impl Default for ReleaseServer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseServer {
    /// Client against the production release host.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against an arbitrary base URL (tests point this at a local
    /// server).
    ///
    /// # Panics
    ///
    /// Building the HTTP client only fails when the TLS backend cannot
    /// initialize, which is a broken environment rather than a recoverable
    /// condition.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent(concat!("shub/", env!("CARGO_PKG_VERSION")))
                .connect_timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client: TLS backend unavailable"),
            base_url: base_url.into(),
        }
    }

    /// Fetch the latest published version.
    ///
    /// The whole response body is the version string; the manifest carries
    /// no trailing newline.
    pub async fn latest(&self) -> Result<String> {
        let url = format!("{}/LATEST", self.base_url);
        debug!(%url, "fetching latest release version");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::network(&url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(&url, format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| Error::network(&url, e.to_string()))
    }

    /// Name of the archive artifact for `version` on `platform`.
    #[must_use]
    pub fn archive_name(version: &str, platform: &Platform) -> String {
        format!(
            "secrethub-{version}-{os}-{arch}.zip",
            os = platform.os,
            arch = platform.arch
        )
    }

    /// URL of the archive artifact for `version` on `platform`.
    #[must_use]
    pub fn archive_url(&self, version: &str, platform: &Platform) -> String {
        format!(
            "{base}/{version}/{name}",
            base = self.base_url,
            name = Self::archive_name(version, platform)
        )
    }

    /// Download the archive for `version` on `platform`.
    pub async fn download(&self, version: &str, platform: &Platform) -> Result<Vec<u8>> {
        let url = self.archive_url(version, platform);
        debug!(%url, "downloading release archive");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::network(&url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(&url, format!("HTTP {status}")));
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| Error::network(&url, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shub_core::platform::{Arch, Os};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_archive_url_encodes_version_os_and_arch() {
        let server = ReleaseServer::with_base_url("https://get.secrethub.io/releases");
        let platform = Platform::new(Os::Linux, Arch::Amd64);
        assert_eq!(
            server.archive_url("0.27.0", &platform),
            "https://get.secrethub.io/releases/0.27.0/secrethub-0.27.0-linux-amd64.zip"
        );

        let platform = Platform::new(Os::Windows, Arch::X86);
        assert_eq!(
            server.archive_url("1.0.0", &platform),
            "https://get.secrethub.io/releases/1.0.0/secrethub-1.0.0-windows-x86.zip"
        );
    }

    #[tokio::test]
    async fn test_latest_returns_manifest_body_verbatim() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/LATEST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0.27.0"))
            .expect(1)
            .mount(&mock)
            .await;

        let server = ReleaseServer::with_base_url(mock.uri());
        assert_eq!(server.latest().await.unwrap(), "0.27.0");
    }

    #[tokio::test]
    async fn test_latest_maps_http_failure_to_network_error() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/LATEST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock)
            .await;

        let server = ReleaseServer::with_base_url(mock.uri());
        let err = server.latest().await.unwrap_err();
        match err {
            shub_core::Error::Network { url, message } => {
                assert!(url.ends_with("/LATEST"));
                assert!(message.contains("503"));
            }
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_download_fetches_archive_bytes() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/0.27.0/secrethub-0.27.0-linux-amd64.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip-bytes".to_vec()))
            .expect(1)
            .mount(&mock)
            .await;

        let server = ReleaseServer::with_base_url(mock.uri());
        let platform = Platform::new(Os::Linux, Arch::Amd64);
        let bytes = server.download("0.27.0", &platform).await.unwrap();
        assert_eq!(bytes, b"zip-bytes");
    }

    #[tokio::test]
    async fn test_download_of_unknown_version_is_a_network_error() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock)
            .await;

        let server = ReleaseServer::with_base_url(mock.uri());
        let platform = Platform::new(Os::Linux, Arch::Amd64);
        let err = server.download("9.9.9", &platform).await.unwrap_err();
        assert!(matches!(err, shub_core::Error::Network { .. }));
    }
}
