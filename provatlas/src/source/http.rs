//! HTTP-backed tile source.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use super::{tile_rel_path, BoxFuture, SourceError, TileSource};
use crate::coord::{DetailLevel, TileCoord};

/// Default timeout for tile requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tile source fetching a published tile tree from a static HTTP host.
///
/// Requests `{base_url}/{level}/{z}/{x}/{y}.pbf`. A 404 means the tile does
/// not exist (ocean); any other non-success status is an error.
#[derive(Debug, Clone)]
pub struct HttpTileSource {
    client: Client,
    base_url: String,
}

impl HttpTileSource {
    /// Create a source for the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a source with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { client, base_url })
    }

    fn tile_url(&self, level: DetailLevel, tile: &TileCoord) -> String {
        format!("{}/{}", self.base_url, tile_rel_path(level, tile))
    }
}

impl TileSource for HttpTileSource {
    fn fetch(
        &self,
        level: DetailLevel,
        tile: TileCoord,
    ) -> BoxFuture<'_, Result<Option<Vec<u8>>, SourceError>> {
        let url = self.tile_url(level, &tile);
        Box::pin(async move {
            let response = self.client.get(&url).send().await?;
            match response.status() {
                StatusCode::NOT_FOUND => Ok(None),
                status if status.is_success() => {
                    let bytes = response.bytes().await?;
                    Ok(Some(bytes.to_vec()))
                }
                status => Err(SourceError::Status {
                    url,
                    status: status.as_u16(),
                }),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn tile() -> TileCoord {
        TileCoord { x: 4, y: 2, zoom: 3 }
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let source = HttpTileSource::new("http://tiles.example/base/").unwrap();
        assert_eq!(
            source.tile_url(DetailLevel::Overview, &tile()),
            "http://tiles.example/base/overview/3/4/2.pbf"
        );
    }

    #[tokio::test]
    async fn test_fetch_existing_tile() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/overview/3/4/2.pbf");
                then.status(200).body(vec![9, 8, 7]);
            })
            .await;

        let source = HttpTileSource::new(server.base_url()).unwrap();
        let result = source.fetch(DetailLevel::Overview, tile()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, Some(vec![9, 8, 7]));
    }

    #[tokio::test]
    async fn test_fetch_missing_tile_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/overview/3/4/2.pbf");
                then.status(404);
            })
            .await;

        let source = HttpTileSource::new(server.base_url()).unwrap();
        let result = source.fetch(DetailLevel::Overview, tile()).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/overview/3/4/2.pbf");
                then.status(500);
            })
            .await;

        let source = HttpTileSource::new(server.base_url()).unwrap();
        let result = source.fetch(DetailLevel::Overview, tile()).await;
        assert!(matches!(
            result,
            Err(SourceError::Status { status: 500, .. })
        ));
    }
}
