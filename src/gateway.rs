//! Content gateway: where the catalog comes from.
//!
//! [`ContentGateway`] is the read-only contract the configurator depends on.
//! [`PocketBaseGateway`] implements it against a PocketBase server and
//! [`StaticGateway`] serves records held in memory.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::catalog::{Asset, AssetRecord, CategoryRecord};
use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Collection holding categories.
pub const CATEGORY_COLLECTION: &str = "CustomizationGroups";

/// Collection holding assets.
pub const ASSET_COLLECTION: &str = "CustomizationAssets";

/// Category sort: explicit position, ascending.
pub const CATEGORY_SORT: &str = "+position";

/// Relations expanded inline on category records.
pub const CATEGORY_EXPAND: &str = "colorPalette,cameraPlacement";

/// Asset sort: newest first.
pub const ASSET_SORT: &str = "-created";

/// Read-only access to the content backend.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// All categories, ordered by position, with palette and camera expanded.
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, GatewayError>;

    /// All assets, newest first.
    async fn list_assets(&self) -> Result<Vec<AssetRecord>, GatewayError>;

    /// Download URL of a file attached to a record.
    fn file_url(
        &self,
        collection_id: &str,
        record_id: &str,
        filename: &str,
    ) -> Result<Url, GatewayError>;

    /// URL of an asset's model file, if it has one.
    fn model_url(&self, asset: &Asset) -> Result<Option<Url>, GatewayError> {
        asset
            .model
            .as_deref()
            .map(|file| self.file_url(&asset.collection_id, &asset.id, file))
            .transpose()
    }

    /// URL of an asset's thumbnail, if it has one.
    fn thumbnail_url(&self, asset: &Asset) -> Result<Option<Url>, GatewayError> {
        asset
            .thumbnail
            .as_deref()
            .map(|file| self.file_url(&asset.collection_id, &asset.id, file))
            .transpose()
    }
}

/// Builds `{base}/api/files/{collection}/{record}/{file}`.
fn build_file_url(
    base: &Url,
    collection_id: &str,
    record_id: &str,
    filename: &str,
) -> Result<Url, GatewayError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GatewayError::Url(url::ParseError::RelativeUrlWithoutBase))?
        .pop_if_empty()
        .extend(["api", "files", collection_id, record_id, filename]);
    Ok(url)
}

// ============================================================================
// PocketBase
// ============================================================================

/// One page of a PocketBase list response, items still undecoded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    #[serde(default)]
    page: u32,
    items: Vec<Value>,
}

/// A decoded page. `received` counts every item the server sent, including
/// records that failed to decode.
#[derive(Debug)]
struct ListPage<T> {
    page: u32,
    received: usize,
    items: Vec<T>,
}

/// Gateway backed by a PocketBase server's REST API.
pub struct PocketBaseGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl PocketBaseGateway {
    /// Creates a gateway. The config is validated first.
    pub fn new(config: GatewayConfig) -> crate::Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("avatar-configurator/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(GatewayError::from)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// URL of a collection's record listing.
    fn records_url(&self, collection: &str) -> Result<Url, GatewayError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Url(url::ParseError::RelativeUrlWithoutBase))?
            .pop_if_empty()
            .extend(["api", "collections", collection, "records"]);
        Ok(url)
    }

    /// Builds the request for one page of a collection.
    fn page_request(
        &self,
        collection: &str,
        page: u32,
        sort: &str,
        expand: Option<&str>,
    ) -> Result<reqwest::Request, GatewayError> {
        let page = page.to_string();
        let per_page = self.config.page_size.to_string();

        let mut query = vec![
            ("page", page.as_str()),
            ("perPage", per_page.as_str()),
            ("sort", sort),
            ("skipTotal", "1"),
        ];
        if let Some(expand) = expand {
            query.push(("expand", expand));
        }

        Ok(self
            .client
            .get(self.records_url(collection)?)
            .query(&query)
            .build()?)
    }

    /// Fetches every record of a collection, one page at a time.
    async fn full_list<T: DeserializeOwned>(
        &self,
        collection: &str,
        sort: &str,
        expand: Option<&str>,
    ) -> Result<Vec<T>, GatewayError> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let request = self.page_request(collection, page, sort, expand)?;
            debug!("GET {}", request.url());

            let response = self.client.execute(request).await?;
            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(GatewayError::Status { status, body });
            }

            let body = response.text().await?;
            let batch: ListPage<T> = decode_page(&body)?;
            records.extend(batch.items);

            if batch.received == 0 || batch.received < self.config.page_size as usize {
                break;
            }
            page = batch.page.max(page) + 1;
        }

        debug!("Fetched {} records from {}", records.len(), collection);
        Ok(records)
    }
}

/// Decodes a page record by record. A record that does not decode is
/// skipped with a warning; only a malformed envelope fails the page.
fn decode_page<T: DeserializeOwned>(body: &str) -> Result<ListPage<T>, GatewayError> {
    let raw: RawPage =
        serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))?;
    let received = raw.items.len();

    let items = raw
        .items
        .into_iter()
        .filter_map(|item| {
            let id = item
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("<no id>")
                .to_string();
            match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping record {}: {}", id, e);
                    None
                }
            }
        })
        .collect();

    Ok(ListPage {
        page: raw.page,
        received,
        items,
    })
}

#[async_trait]
impl ContentGateway for PocketBaseGateway {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, GatewayError> {
        self.full_list(CATEGORY_COLLECTION, CATEGORY_SORT, Some(CATEGORY_EXPAND))
            .await
    }

    async fn list_assets(&self) -> Result<Vec<AssetRecord>, GatewayError> {
        self.full_list(ASSET_COLLECTION, ASSET_SORT, None).await
    }

    fn file_url(
        &self,
        collection_id: &str,
        record_id: &str,
        filename: &str,
    ) -> Result<Url, GatewayError> {
        build_file_url(&self.config.base_url, collection_id, record_id, filename)
    }
}

// ============================================================================
// Static
// ============================================================================

/// Gateway serving a fixed set of records.
///
/// Records are returned in the same order the server would use. Useful for
/// offline previews and tests.
#[derive(Debug, Clone)]
pub struct StaticGateway {
    base_url: Url,
    categories: Vec<CategoryRecord>,
    assets: Vec<AssetRecord>,
}

impl StaticGateway {
    pub fn new(
        base_url: Url,
        mut categories: Vec<CategoryRecord>,
        mut assets: Vec<AssetRecord>,
    ) -> Self {
        categories.sort_by(|a, b| a.position.total_cmp(&b.position));
        // Backend timestamps sort lexicographically.
        assets.sort_by(|a, b| b.created.cmp(&a.created));

        Self {
            base_url,
            categories,
            assets,
        }
    }
}

#[async_trait]
impl ContentGateway for StaticGateway {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, GatewayError> {
        Ok(self.categories.clone())
    }

    async fn list_assets(&self) -> Result<Vec<AssetRecord>, GatewayError> {
        Ok(self.assets.clone())
    }

    fn file_url(
        &self,
        collection_id: &str,
        record_id: &str,
        filename: &str,
    ) -> Result<Url, GatewayError> {
        build_file_url(&self.base_url, collection_id, record_id, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, Error};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn gateway(base: &str) -> PocketBaseGateway {
        let mut config = GatewayConfig::new(Url::parse(base).unwrap());
        config.page_size = 2;
        PocketBaseGateway::new(config).unwrap()
    }

    #[test]
    fn category_page_request() {
        let gateway = gateway("https://pb.example.com");
        let request = gateway
            .page_request(CATEGORY_COLLECTION, 1, CATEGORY_SORT, Some(CATEGORY_EXPAND))
            .unwrap();
        let url = request.url();

        assert_eq!(url.path(), "/api/collections/CustomizationGroups/records");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("sort".into(), "+position".into())));
        assert!(query.contains(&("expand".into(), "colorPalette,cameraPlacement".into())));
        assert!(query.contains(&("perPage".into(), "2".into())));
        assert!(query.contains(&("page".into(), "1".into())));
    }

    #[test]
    fn asset_page_request_has_no_expand() {
        let gateway = gateway("https://pb.example.com/");
        let request = gateway
            .page_request(ASSET_COLLECTION, 3, ASSET_SORT, None)
            .unwrap();

        let query: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert!(query.contains(&("sort".into(), "-created".into())));
        assert!(query.contains(&("page".into(), "3".into())));
        assert!(!query.iter().any(|(k, _)| k == "expand"));
    }

    #[test]
    fn base_path_is_preserved() {
        let gateway = gateway("https://example.com/pb/");
        let url = gateway.records_url(ASSET_COLLECTION).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/pb/api/collections/CustomizationAssets/records"
        );
    }

    #[test]
    fn file_urls() {
        let gateway = gateway("https://pb.example.com");
        let url = gateway.file_url("assets01", "a1", "cap.glb").unwrap();
        assert_eq!(url.as_str(), "https://pb.example.com/api/files/assets01/a1/cap.glb");
    }

    #[test]
    fn asset_urls() {
        let gateway = gateway("https://pb.example.com");
        let record = AssetRecord {
            id: "a1".into(),
            collection_id: "assets01".into(),
            name: "Cap".into(),
            group: "c_hat".into(),
            url: "cap.glb".into(),
            ..Default::default()
        };
        let asset = Asset::try_from(record).unwrap();

        assert_eq!(
            gateway.model_url(&asset).unwrap().unwrap().as_str(),
            "https://pb.example.com/api/files/assets01/a1/cap.glb"
        );
        assert!(gateway.thumbnail_url(&asset).unwrap().is_none());
    }

    #[test]
    fn decodes_list_page() {
        let body = r#"{
            "page": 1, "perPage": 2, "totalItems": -1, "totalPages": -1,
            "items": [
                { "id": "a1", "collectionId": "assets01", "name": "Cap", "group": "c_hat",
                  "url": "cap.glb", "created": "2024-05-01 10:00:00.000Z" }
            ]
        }"#;

        let page: ListPage<AssetRecord> = decode_page(body).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.items[0].url, "cap.glb");
        assert!(page.items[0].locked_groups.is_empty());
    }

    #[test]
    fn malformed_page_is_a_decode_error() {
        let err = decode_page::<AssetRecord>(r#"{ "message": "Not found" }"#).unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn bad_records_are_skipped_not_fatal() {
        let body = r#"{
            "page": 1, "perPage": 500,
            "items": [
                { "id": "c_head", "name": "Head", "position": 1,
                  "expand": { "cameraPlacement": { "position": null, "target": null } } },
                { "id": "c_hair", "name": "Hair", "position": 2.5 },
                { "id": "c_broken", "name": ["not", "a", "string"] }
            ]
        }"#;

        let page: ListPage<CategoryRecord> = decode_page(body).unwrap();
        assert_eq!(page.received, 3);
        let ids: Vec<_> = page.items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c_head", "c_hair"]);
        assert_eq!(page.items[1].position, 2.5);
    }

    #[test]
    fn gateway_rejects_zero_page_size() {
        let mut config = GatewayConfig::new(Url::parse("https://pb.example.com").unwrap());
        config.page_size = 0;

        let err = PocketBaseGateway::new(config).err().unwrap();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { ref field, .. }) if field == "page_size"
        ));
    }

    /// Serves one canned response per connection on a local port.
    async fn serve<F>(respond: F) -> Url
    where
        F: Fn(&Url) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let respond = Arc::new(respond);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let respond = Arc::clone(&respond);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        let n = socket.read(&mut chunk).await.unwrap();
                        if n == 0 {
                            return;
                        }
                        request.extend_from_slice(&chunk[..n]);
                    }

                    let head = String::from_utf8_lossy(&request);
                    let target = head.split_whitespace().nth(1).unwrap_or("/");
                    let url = Url::parse(&format!("http://localhost{}", target)).unwrap();
                    let (status, body) = respond(&url);

                    let response = format!(
                        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    socket.write_all(response.as_bytes()).await.unwrap();
                    let _ = socket.shutdown().await;
                });
            }
        });

        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    fn asset_json(id: &str) -> String {
        format!(
            r#"{{ "id": "{id}", "collectionId": "assets01", "name": "{id}", "group": "c_hat", "url": "{id}.glb" }}"#
        )
    }

    #[tokio::test]
    async fn lists_every_page_until_a_short_one() {
        let requested = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requested);

        let base = serve(move |url| {
            let page: u32 = query_value(url, "page").and_then(|p| p.parse().ok()).unwrap_or(0);
            log.lock().push(page);

            let items = match page {
                1 => vec![asset_json("a1"), asset_json("a2")],
                2 => vec![asset_json("a3"), asset_json("a4")],
                3 => vec![asset_json("a5")],
                _ => vec![],
            };
            (200, format!(r#"{{ "page": {}, "items": [{}] }}"#, page, items.join(",")))
        })
        .await;

        let gateway = gateway(base.as_str());
        let assets = gateway.list_assets().await.unwrap();

        let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a2", "a3", "a4", "a5"]);
        assert_eq!(*requested.lock(), [1, 2, 3]);
    }

    #[tokio::test]
    async fn categories_request_expands_relations() {
        let base = serve(|url| {
            assert_eq!(url.path(), "/api/collections/CustomizationGroups/records");
            assert_eq!(
                query_value(url, "expand").as_deref(),
                Some("colorPalette,cameraPlacement")
            );
            (200, r#"{ "page": 1, "items": [{ "id": "c_head", "name": "Head" }] }"#.to_string())
        })
        .await;

        let categories = gateway(base.as_str()).list_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Head");
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let base = serve(|_| (404, r#"{"message":"Missing collection"}"#.to_string())).await;

        let err = gateway(base.as_str()).list_assets().await.unwrap_err();
        match err {
            GatewayError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("Missing collection"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn static_gateway_orders_like_the_server() {
        let category = |id: &str, position| CategoryRecord {
            id: id.into(),
            name: id.into(),
            position,
            ..Default::default()
        };
        let asset = |id: &str, created: &str| AssetRecord {
            id: id.into(),
            name: id.into(),
            group: "g".into(),
            created: created.into(),
            ..Default::default()
        };

        let gateway = StaticGateway::new(
            Url::parse("http://localhost:8090").unwrap(),
            vec![category("b", 2.0), category("a", 1.0)],
            vec![
                asset("old", "2024-01-01 00:00:00.000Z"),
                asset("new", "2024-06-01 00:00:00.000Z"),
            ],
        );

        let categories = gateway.list_categories().await.unwrap();
        let assets = gateway.list_assets().await.unwrap();
        assert_eq!(categories[0].id, "a");
        assert_eq!(assets[0].id, "new");
        assert_eq!(
            gateway.file_url("c", "r", "t.png").unwrap().as_str(),
            "http://localhost:8090/api/files/c/r/t.png"
        );
    }
}
