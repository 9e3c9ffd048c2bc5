//! GraphQL client for the Hardcover API

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::queries;
use crate::{
    CatalogProvider, Item, Lookup, ProviderError, ProviderResult, ReadingStatus, StatusUpdate,
};

/// Public Hardcover GraphQL endpoint
pub const DEFAULT_API_URL: &str = "https://api.hardcover.app/v1/graphql";

/// Longest slice of an error body kept in [`ProviderError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Catalog provider backed by the Hardcover GraphQL API
#[derive(Debug, Clone)]
pub struct HardcoverClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    books: Option<Vec<Item>>,
}

#[derive(Debug, Deserialize)]
struct BookData {
    books_by_pk: Option<Item>,
}

#[derive(Debug, Deserialize)]
struct LibraryData {
    user_books: Option<Vec<Item>>,
}

#[derive(Debug, Deserialize)]
struct InsertData {
    insert_user_books_one: Option<Item>,
}

#[derive(Debug, Deserialize)]
struct UpdateData {
    update_user_books_by_pk: Option<Item>,
}

impl HardcoverClient {
    /// Create a client for the public endpoint
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        Self::with_endpoint(api_key, DEFAULT_API_URL)
    }

    /// Create a client for an explicit GraphQL endpoint
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: &str) -> ProviderResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ProviderError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("hardcover-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, endpoint, api_key: api_key.into() })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Send one GraphQL document and decode its `data` member
    async fn request<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> ProviderResult<T> {
        if !self.has_credential() {
            return Err(ProviderError::MissingCredential);
        }

        let started = Instant::now();
        debug!(operation, endpoint = %self.endpoint, "sending GraphQL request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(
            operation,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "GraphQL response received"
        );

        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "GraphQL request rejected");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let parsed: GraphQlResponse<T> = serde_json::from_str(&body)?;
        if !parsed.errors.is_empty() {
            let messages: Vec<&str> = parsed.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ProviderError::GraphQl(messages.join("; ")));
        }

        parsed
            .data
            .ok_or_else(|| ProviderError::MalformedResponse("response carries no data".to_string()))
    }
}

#[async_trait]
impl CatalogProvider for HardcoverClient {
    async fn search_books(&self, query: &str, limit: u32) -> ProviderResult<Vec<Item>> {
        let variables = json!({
            "query": like_pattern(query.trim()),
            "limit": limit,
        });
        let data: SearchData = self.request("SearchBooks", queries::SEARCH_BOOKS, variables).await?;
        Ok(data.books.unwrap_or_default())
    }

    async fn get_book_details(&self, id: i64) -> ProviderResult<Lookup<Item>> {
        let data: BookData =
            self.request("GetBook", queries::GET_BOOK_DETAILS, json!({ "id": id })).await?;
        Ok(data.books_by_pk.filter(|book| !book.is_null()).into())
    }

    async fn get_user_library(&self, user_id: Option<i64>) -> ProviderResult<Vec<Item>> {
        let variables = match user_id {
            Some(id) => json!({ "userId": id }),
            None => json!({}),
        };
        let data: LibraryData =
            self.request("GetUserLibrary", queries::GET_USER_LIBRARY, variables).await?;
        Ok(data.user_books.unwrap_or_default())
    }

    async fn add_to_library(&self, book_id: i64, status: ReadingStatus) -> ProviderResult<Item> {
        let variables = json!({ "bookId": book_id, "status": status.as_str() });
        let data: InsertData =
            self.request("AddBookToLibrary", queries::ADD_BOOK_TO_LIBRARY, variables).await?;
        data.insert_user_books_one.ok_or_else(|| {
            ProviderError::MalformedResponse("insert returned no library entry".to_string())
        })
    }

    async fn update_reading_status(&self, update: StatusUpdate) -> ProviderResult<Lookup<Item>> {
        let mut changes = Map::new();
        if let Some(progress) = update.progress {
            changes.insert("progress".into(), number(progress));
        }
        if let Some(rating) = update.rating {
            changes.insert("rating".into(), number(rating));
        }
        changes.insert("status".into(), Value::String(update.status.as_str().to_string()));

        let variables = json!({ "id": update.id, "changes": Value::Object(changes) });
        let data: UpdateData =
            self.request("UpdateReadingStatus", queries::UPDATE_READING_STATUS, variables).await?;
        Ok(data.update_user_books_by_pk.filter(|row| !row.is_null()).into())
    }

    async fn close(&self) {
        debug!(endpoint = %self.endpoint, "releasing Hardcover client");
    }
}

/// Substring pattern for `_ilike`; `%`, `_` and `\\` in the query match literally
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Whole values go out as integers
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut cut = max_len;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_endpoint() {
        let err = HardcoverClient::with_endpoint("token", "not a url").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidEndpoint(_)));
    }

    #[test]
    fn blank_credential_is_reported() {
        let client = HardcoverClient::new("   ").unwrap();
        assert!(!client.has_credential());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééé", 3), "é...");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("dune"), "%dune%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn whole_numbers_are_sent_as_integers() {
        assert_eq!(number(4.0), json!(4));
        assert_eq!(number(42.5), json!(42.5));
    }
}
