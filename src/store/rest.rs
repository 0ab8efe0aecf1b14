use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Listing, NewListing, NewShop, Shop};

use super::CatalogStore;

const REST_PATH: &str = "rest/v1/";
const USER_AGENT: &str = "reef-admin/0.1";

const SHOPS_TABLE: &str = "shops";
const LISTINGS_TABLE: &str = "listings";

const SHOP_COLUMNS: &str = "id,name,website_url,created_at";
const LISTING_COLUMNS: &str = "id,shop_id,title_raw,url,price_cad,sale_price_cad,status,category,coral_type,variant,image_url,created_at";

// id breaks created_at ties so equal timestamps still come back in a stable order
const NEWEST_FIRST: &str = "created_at.desc,id.desc";

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Client for a PostgREST (Supabase-style) data service.
pub struct RestStore {
    client: Client,
    rest_root: Url,
    api_key: Option<String>,
}

impl RestStore {
    pub fn new(config: &Config) -> Result<Self> {
        let rest_root = rest_root(config.store_url()?)?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            rest_root,
            api_key: config.store_key.clone(),
        })
    }

    fn select_url(&self, table: &str, columns: &str, limit: Option<usize>) -> Result<Url> {
        let mut url = self.rest_root.join(table)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", columns);
            query.append_pair("order", NEWEST_FIRST);
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }

    fn delete_url(&self, table: &str, id: &str) -> Result<Url> {
        let mut url = self.rest_root.join(table)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    async fn select<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
        tracing::debug!("GET {}", url);
        let response = self.request(Method::GET, url).send().await?;
        let rows = check(response).await?.json().await?;
        Ok(rows)
    }

    async fn insert<B, T>(&self, table: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.rest_root.join(table)?;
        tracing::debug!("POST {}", url);
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(body)
            .send()
            .await?;

        let rows: Vec<T> = check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Insert into {table} returned no row").into())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<()> {
        let url = self.delete_url(table, id)?;
        tracing::debug!("DELETE {}", url);
        let response = self
            .request(Method::DELETE, url)
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

impl CatalogStore for RestStore {
    async fn list_shops(&self) -> Result<Vec<Shop>> {
        let url = self.select_url(SHOPS_TABLE, SHOP_COLUMNS, None)?;
        self.select(url).await
    }

    async fn insert_shop(&self, shop: &NewShop) -> Result<Shop> {
        self.insert(SHOPS_TABLE, shop).await
    }

    async fn delete_shop(&self, id: &str) -> Result<()> {
        self.delete(SHOPS_TABLE, id).await
    }

    async fn recent_listings(&self, limit: usize) -> Result<Vec<Listing>> {
        let url = self.select_url(LISTINGS_TABLE, LISTING_COLUMNS, Some(limit))?;
        self.select(url).await
    }

    async fn insert_listing(&self, listing: &NewListing) -> Result<Listing> {
        self.insert(LISTINGS_TABLE, listing).await
    }

    async fn delete_listing(&self, id: &str) -> Result<()> {
        self.delete(LISTINGS_TABLE, id).await
    }
}

fn rest_root(store_url: &str) -> Result<Url> {
    let mut base = Url::parse(store_url.trim())?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(REST_PATH)?)
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(store_error(status, &body))
}

/// Builds the operator-facing error for a rejected request. The service's
/// own message is preferred; the raw body and then the status are fallbacks.
fn store_error(status: StatusCode, body: &str) -> AppError {
    let parsed = serde_json::from_str::<PostgrestError>(body).ok();
    let message = parsed
        .and_then(|e| {
            [e.message, e.details, e.hint]
                .into_iter()
                .flatten()
                .find(|m| !m.trim().is_empty())
        })
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| format!("HTTP {status}"));

    tracing::debug!(status = status.as_u16(), "Store rejected request: {}", message);

    AppError::Store {
        status: Some(status.as_u16()),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn store(url: &str) -> RestStore {
        let config = Config {
            store_url: Some(url.to_string()),
            store_key: Some("anon-key".to_string()),
            ..Config::default()
        };
        RestStore::new(&config).unwrap()
    }

    /// Store pointed at a local responder, bypassing any proxy set in the
    /// environment.
    fn local_store(base: &str) -> RestStore {
        RestStore {
            client: Client::builder().no_proxy().build().unwrap(),
            rest_root: rest_root(base).unwrap(),
            api_key: Some("anon-key".to_string()),
        }
    }

    /// Serves a single canned response on a local port. The handle yields the
    /// raw request as received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (format!("http://{addr}"), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn has_header(request: &str, name: &str, value: &str) -> bool {
        request.lines().any(|line| {
            line.split_once(':').is_some_and(|(n, v)| {
                n.eq_ignore_ascii_case(name) && v.trim() == value
            })
        })
    }

    fn query(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn rest_root_appends_api_path() {
        assert_eq!(
            rest_root("https://abc.supabase.co").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/"
        );
        assert_eq!(
            rest_root(" http://localhost:54321/proxy ").unwrap().as_str(),
            "http://localhost:54321/proxy/rest/v1/"
        );
        assert!(matches!(rest_root("not a url"), Err(AppError::Url(_))));
    }

    #[test]
    fn missing_store_url_fails_construction() {
        let result = RestStore::new(&Config::default());
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn shop_select_is_newest_first_without_limit() {
        let store = store("https://abc.supabase.co");
        let url = store.select_url(SHOPS_TABLE, SHOP_COLUMNS, None).unwrap();

        assert_eq!(url.path(), "/rest/v1/shops");
        assert_eq!(
            query(&url),
            vec![
                ("select".to_string(), SHOP_COLUMNS.to_string()),
                ("order".to_string(), "created_at.desc,id.desc".to_string()),
            ]
        );
    }

    #[test]
    fn listing_select_carries_limit() {
        let store = store("https://abc.supabase.co");
        let url = store
            .select_url(LISTINGS_TABLE, LISTING_COLUMNS, Some(50))
            .unwrap();

        assert_eq!(url.path(), "/rest/v1/listings");
        assert!(query(&url).contains(&("limit".to_string(), "50".to_string())));
    }

    #[test]
    fn delete_filters_by_id() {
        let store = store("https://abc.supabase.co");
        let url = store.delete_url(SHOPS_TABLE, "3f2a&x=1").unwrap();

        assert_eq!(
            query(&url),
            vec![("id".to_string(), "eq.3f2a&x=1".to_string())]
        );
    }

    #[test]
    fn store_error_prefers_service_message() {
        let body = r#"{"code":"23503","details":"Key is still referenced","hint":null,
            "message":"insert or update on table \"listings\" violates foreign key constraint"}"#;
        let err = store_error(StatusCode::CONFLICT, body);

        match err {
            AppError::Store { status, message } => {
                assert_eq!(status, Some(409));
                assert!(message.starts_with("insert or update on table"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn store_error_falls_back_to_body_then_status() {
        let err = store_error(StatusCode::BAD_GATEWAY, "upstream timed out");
        assert_eq!(err.to_string(), "upstream timed out");

        let err = store_error(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.to_string(), "HTTP 401 Unauthorized");
    }

    #[test]
    fn store_error_skips_blank_message() {
        let body = r#"{"message":"","details":"Key (id)=(7) is still referenced","hint":"drop listings first"}"#;
        let err = store_error(StatusCode::CONFLICT, body);
        assert_eq!(err.to_string(), "Key (id)=(7) is still referenced");

        let body = r#"{"message":"  ","details":null,"hint":"check the shop id"}"#;
        let err = store_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.to_string(), "check the shop id");
    }

    #[tokio::test]
    async fn insert_shop_sends_credentials_and_decodes_row() {
        let (base, server) = serve_once(
            "201 Created",
            r#"[{"id":"s1","name":"Reef Co","website_url":null,"created_at":"2025-01-01T00:00:00+00:00"}]"#,
        )
        .await;
        let store = local_store(&base);

        let shop = store
            .insert_shop(&NewShop {
                name: "Reef Co".to_string(),
                website_url: None,
            })
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert_eq!(shop.id, "s1");
        assert_eq!(shop.name, "Reef Co");
        assert!(shop.created_at.is_some());

        assert!(request.starts_with("POST /rest/v1/shops HTTP/1.1\r\n"), "{request}");
        assert!(has_header(&request, "apikey", "anon-key"));
        assert!(has_header(&request, "authorization", "Bearer anon-key"));
        assert!(has_header(&request, "prefer", "return=representation"));
        assert!(has_header(&request, "content-type", "application/json"));
        assert!(request.ends_with(r#"{"name":"Reef Co","website_url":null}"#), "{request}");
    }

    #[tokio::test]
    async fn recent_listings_requests_window_and_decodes_rows() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"id":"l1","shop_id":"s1","title_raw":"Holy Grail Torch","url":null,
                "price_cad":120,"sale_price_cad":99.5,"status":"available","category":"torch",
                "coral_type":"torch","variant":"holy grail","image_url":null,
                "created_at":"2025-01-02T00:00:00+00:00"}]"#,
        )
        .await;
        let store = local_store(&base);

        let listings = store.recent_listings(50).await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title_raw, "Holy Grail Torch");
        assert_eq!(listings[0].sale_price_cad, Some(99.5));

        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /rest/v1/listings?"), "{request_line}");
        assert!(request_line.contains("limit=50"), "{request_line}");
        assert!(has_header(&request, "apikey", "anon-key"));
    }

    #[tokio::test]
    async fn empty_insert_response_is_an_error() {
        let (base, server) = serve_once("201 Created", "[]").await;
        let store = local_store(&base);

        let result = store
            .insert_shop(&NewShop {
                name: "Reef Co".to_string(),
                website_url: None,
            })
            .await;
        server.await.unwrap();

        match result {
            Err(AppError::Other(e)) => assert!(e.to_string().contains("returned no row")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_delete_surfaces_service_message() {
        let (base, server) = serve_once(
            "409 Conflict",
            r#"{"code":"23503","message":"update or delete on table \"shops\" violates foreign key constraint","details":null,"hint":null}"#,
        )
        .await;
        let store = local_store(&base);

        let result = store.delete_shop("s1").await;
        let request = server.await.unwrap();

        assert!(request.starts_with("DELETE /rest/v1/shops?id=eq.s1 HTTP/1.1\r\n"), "{request}");
        match result {
            Err(AppError::Store { status, message }) => {
                assert_eq!(status, Some(409));
                assert!(message.starts_with("update or delete on table"), "{message}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
