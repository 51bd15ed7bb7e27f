//! Source dataset download.
//!
//! The pipeline starts from upstream world datasets (Natural Earth admin-0
//! at several scales). Downloads run concurrently and every source gets an
//! independent outcome: one failing mirror must not sink the batch. The
//! report lists successes and failures side by side for the end-of-run
//! print.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

/// Default timeout for dataset downloads.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Errors from downloading a single dataset.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Could not write the downloaded file.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A named upstream dataset.
#[derive(Debug, Clone)]
pub struct DatasetSource {
    /// Short name used in logs and the report.
    pub name: String,
    /// Download URL.
    pub url: String,
    /// Filename to store the dataset under.
    pub filename: String,
}

impl DatasetSource {
    /// Create a dataset source.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            filename: filename.into(),
        }
    }
}

/// The default world boundary datasets.
pub fn default_sources() -> Vec<DatasetSource> {
    const BASE: &str =
        "https://raw.githubusercontent.com/nvkelso/natural-earth-vector/master/geojson";
    vec![
        DatasetSource::new(
            "admin0-110m",
            format!("{}/ne_110m_admin_0_countries.geojson", BASE),
            "world-110m.geojson",
        ),
        DatasetSource::new(
            "admin0-50m",
            format!("{}/ne_50m_admin_0_countries.geojson", BASE),
            "world-50m.geojson",
        ),
        DatasetSource::new(
            "admin0-10m",
            format!("{}/ne_10m_admin_0_countries.geojson", BASE),
            "world-10m.geojson",
        ),
    ]
}

/// A successfully downloaded dataset.
#[derive(Debug)]
pub struct Downloaded {
    /// Source name.
    pub name: String,
    /// Where the file landed.
    pub path: PathBuf,
    /// Downloaded size in bytes.
    pub bytes: u64,
}

/// Outcome of a download batch.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Datasets that downloaded and were written.
    pub succeeded: Vec<Downloaded>,
    /// Datasets that failed, with their errors.
    pub failed: Vec<(String, DownloadError)>,
}

impl DownloadReport {
    /// Returns true when every source succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Download all sources into `dest_dir` concurrently.
///
/// Each source resolves independently; failures are collected in the
/// report rather than aborting the batch. Only an unusable destination
/// directory fails the call itself.
pub async fn download_all(
    sources: &[DatasetSource],
    dest_dir: &Path,
) -> Result<DownloadReport, DownloadError> {
    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| DownloadError::Io {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;

    let client = Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()?;

    let tasks = sources.iter().map(|source| {
        let client = client.clone();
        let dest = dest_dir.join(&source.filename);
        async move {
            let result = download_one(&client, &source.url, &dest).await;
            (source.name.clone(), dest, result)
        }
    });

    let mut report = DownloadReport::default();
    for (name, path, result) in join_all(tasks).await {
        match result {
            Ok(bytes) => {
                info!(source = %name, path = %path.display(), bytes, "dataset downloaded");
                report.succeeded.push(Downloaded { name, path, bytes });
            }
            Err(e) => {
                warn!(source = %name, error = %e, "dataset download failed");
                report.failed.push((name, e));
            }
        }
    }

    Ok(report)
}

async fn download_one(client: &Client, url: &str, dest: &Path) -> Result<u64, DownloadError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| DownloadError::Io {
            path: dest.to_path_buf(),
            source: e,
        })?;
    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_default_sources_are_consistent() {
        let sources = default_sources();
        assert_eq!(sources.len(), 3);
        for source in &sources {
            assert!(source.url.ends_with(".geojson"));
            assert!(source.filename.ends_with(".geojson"));
        }
    }

    #[tokio::test]
    async fn test_download_all_success() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/a.geojson");
                then.status(200).body("{\"type\":\"FeatureCollection\",\"features\":[]}");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let sources = vec![DatasetSource::new(
            "a",
            server.url("/a.geojson"),
            "a.geojson",
        )];

        let report = download_all(&sources, dir.path()).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.succeeded.len(), 1);
        assert!(dir.path().join("a.geojson").exists());
        assert!(report.succeeded[0].bytes > 0);
    }

    #[tokio::test]
    async fn test_download_all_partial_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/good.geojson");
                then.status(200).body("{}");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/bad.geojson");
                then.status(500);
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let sources = vec![
            DatasetSource::new("good", server.url("/good.geojson"), "good.geojson"),
            DatasetSource::new("bad", server.url("/bad.geojson"), "bad.geojson"),
        ];

        let report = download_all(&sources, dir.path()).await.unwrap();

        // One failing source must not sink the other
        assert!(!report.is_complete());
        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "bad");
        assert!(dir.path().join("good.geojson").exists());
        assert!(!dir.path().join("bad.geojson").exists());
    }

    #[tokio::test]
    async fn test_download_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let report = download_all(&[], dir.path()).await.unwrap();
        assert!(report.is_complete());
        assert!(report.succeeded.is_empty());
    }
}
