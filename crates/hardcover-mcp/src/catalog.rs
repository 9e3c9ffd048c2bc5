//! The fixed tool catalog and its handlers

use async_trait::async_trait;
use hardcover_client::{CatalogProvider, Lookup, ReadingStatus, StatusUpdate};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::dispatcher::{ToolError, ToolHandler, ToolOutput};
use crate::registry::{
    ParamKind, ParameterSchema, ParameterSpec, RegistryError, ToolDefinition, ToolRegistry,
};
use crate::validator::{ValidatedArguments, ValidationError};

pub const SEARCH_BOOKS: &str = "search_books";
pub const GET_BOOK_DETAILS: &str = "get_book_details";
pub const GET_USER_LIBRARY: &str = "get_user_library";
pub const ADD_TO_LIBRARY: &str = "add_to_library";
pub const UPDATE_READING_STATUS: &str = "update_reading_status";

pub const DEFAULT_SEARCH_LIMIT: i64 = 10;

/// Which tools a session exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogProfile {
    /// Read-only catalog served over HTTP
    Hosted,
    /// Read-only catalog plus library mutations, for locally spawned agents
    Local,
}

impl CatalogProfile {
    pub fn tool_names(&self) -> &'static [&'static str] {
        match self {
            CatalogProfile::Hosted => &[SEARCH_BOOKS, GET_BOOK_DETAILS, GET_USER_LIBRARY],
            CatalogProfile::Local => &[
                SEARCH_BOOKS,
                GET_BOOK_DETAILS,
                GET_USER_LIBRARY,
                ADD_TO_LIBRARY,
                UPDATE_READING_STATUS,
            ],
        }
    }
}

/// Build the registry for `profile`, binding every handler to `provider`
pub fn build_registry(
    provider: Arc<dyn CatalogProvider>,
    profile: CatalogProfile,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    for name in profile.tool_names() {
        registry.register(definition(name, provider.clone()))?;
        debug!(tool = *name, "registered tool");
    }
    Ok(registry)
}

fn definition(name: &str, provider: Arc<dyn CatalogProvider>) -> ToolDefinition {
    match name {
        SEARCH_BOOKS => ToolDefinition::new(
            SEARCH_BOOKS,
            "Search for books on Hardcover by title or author",
            ParameterSchema::new(vec![
                ParameterSpec::required(
                    "query",
                    ParamKind::String,
                    "The book title or author name to search for",
                ),
                ParameterSpec::optional("limit", ParamKind::Integer, "Maximum number of results to return")
                    .with_default(json!(DEFAULT_SEARCH_LIMIT))
                    .with_minimum(1.0),
            ]),
            Arc::new(SearchBooks { provider }),
        ),
        GET_BOOK_DETAILS => ToolDefinition::new(
            GET_BOOK_DETAILS,
            "Get detailed information about a specific book by ID",
            ParameterSchema::new(vec![ParameterSpec::required(
                "id",
                ParamKind::Integer,
                "The Hardcover book ID",
            )
            .with_aliases(&["book_id"])]),
            Arc::new(GetBookDetails { provider }),
        ),
        GET_USER_LIBRARY => ToolDefinition::new(
            GET_USER_LIBRARY,
            "Get the books in a user's reading library",
            ParameterSchema::new(vec![ParameterSpec::optional(
                "user_id",
                ParamKind::Integer,
                "Hardcover user ID (defaults to the authenticated user)",
            )]),
            Arc::new(GetUserLibrary { provider }),
        ),
        ADD_TO_LIBRARY => ToolDefinition::new(
            ADD_TO_LIBRARY,
            "Add a book to the user's library with a specific status",
            ParameterSchema::new(vec![
                ParameterSpec::required("bookId", ParamKind::Integer, "The ID of the book to add"),
                ParameterSpec::required(
                    "status",
                    ParamKind::Enum(ReadingStatus::NAMES),
                    "Reading status for the book",
                ),
            ]),
            Arc::new(AddToLibrary { provider }),
        ),
        UPDATE_READING_STATUS => ToolDefinition::new(
            UPDATE_READING_STATUS,
            "Update the reading status, rating, or progress of a book in the library",
            ParameterSchema::new(vec![
                ParameterSpec::required("id", ParamKind::Integer, "The user book ID to update"),
                ParameterSpec::required(
                    "status",
                    ParamKind::Enum(ReadingStatus::NAMES),
                    "New reading status",
                ),
                ParameterSpec::optional("rating", ParamKind::Number, "Book rating (1-5 stars)")
                    .with_range(1.0, 5.0),
                ParameterSpec::optional("progress", ParamKind::Number, "Reading progress percentage")
                    .with_range(0.0, 100.0),
            ]),
            Arc::new(UpdateReadingStatus { provider }),
        ),
        other => unreachable!("no definition for tool {other}"),
    }
}

fn required_i64(args: &ValidatedArguments, name: &str) -> Result<i64, ToolError> {
    args.i64(name)
        .ok_or_else(|| ValidationError::new(name, "required parameter is missing").into())
}

fn required_str<'a>(args: &'a ValidatedArguments, name: &str) -> Result<&'a str, ToolError> {
    args.str(name)
        .ok_or_else(|| ValidationError::new(name, "required parameter is missing").into())
}

fn required_status(args: &ValidatedArguments) -> Result<ReadingStatus, ToolError> {
    required_str(args, "status")?
        .parse()
        .map_err(|e: String| ValidationError::new("status", e).into())
}

struct SearchBooks {
    provider: Arc<dyn CatalogProvider>,
}

#[async_trait]
impl ToolHandler for SearchBooks {
    async fn call(&self, args: ValidatedArguments) -> Result<ToolOutput, ToolError> {
        let query = required_str(&args, "query")?;
        let limit = args.i64("limit").unwrap_or(DEFAULT_SEARCH_LIMIT);
        let limit = u32::try_from(limit)
            .map_err(|_| ValidationError::new("limit", format!("expected a positive count, got {}", limit)))?;

        let books = self
            .provider
            .search_books(query, limit)
            .await
            .map_err(ToolError::provider("search books"))?;
        Ok(ToolOutput::Json(Value::Array(books)))
    }
}

struct GetBookDetails {
    provider: Arc<dyn CatalogProvider>,
}

#[async_trait]
impl ToolHandler for GetBookDetails {
    async fn call(&self, args: ValidatedArguments) -> Result<ToolOutput, ToolError> {
        let id = required_i64(&args, "id")?;
        match self
            .provider
            .get_book_details(id)
            .await
            .map_err(ToolError::provider("get book details"))?
        {
            Lookup::Found(book) => Ok(ToolOutput::Json(book)),
            Lookup::NotFound => Err(ToolError::NotFound(format!("Book with ID {} not found", id))),
        }
    }
}

struct GetUserLibrary {
    provider: Arc<dyn CatalogProvider>,
}

#[async_trait]
impl ToolHandler for GetUserLibrary {
    async fn call(&self, args: ValidatedArguments) -> Result<ToolOutput, ToolError> {
        let entries = self
            .provider
            .get_user_library(args.i64("user_id"))
            .await
            .map_err(ToolError::provider("get user library"))?;
        Ok(ToolOutput::Json(Value::Array(entries)))
    }
}

struct AddToLibrary {
    provider: Arc<dyn CatalogProvider>,
}

#[async_trait]
impl ToolHandler for AddToLibrary {
    async fn call(&self, args: ValidatedArguments) -> Result<ToolOutput, ToolError> {
        let book_id = required_i64(&args, "bookId")?;
        let status = required_status(&args)?;

        self.provider
            .add_to_library(book_id, status)
            .await
            .map_err(ToolError::provider("add book to library"))?;
        Ok(ToolOutput::Text(format!("Added book {} to library with status: {}", book_id, status)))
    }
}

struct UpdateReadingStatus {
    provider: Arc<dyn CatalogProvider>,
}

#[async_trait]
impl ToolHandler for UpdateReadingStatus {
    async fn call(&self, args: ValidatedArguments) -> Result<ToolOutput, ToolError> {
        let update = StatusUpdate {
            id: required_i64(&args, "id")?,
            status: required_status(&args)?,
            rating: args.f64("rating"),
            progress: args.f64("progress"),
        };
        let summary = format!(
            "Updated book {} - Status: {}, Rating: {}, Progress: {}%",
            update.id,
            update.status,
            or_na(update.rating),
            or_na(update.progress),
        );

        let id = update.id;
        match self
            .provider
            .update_reading_status(update)
            .await
            .map_err(ToolError::provider("update reading status"))?
        {
            Lookup::Found(_) => Ok(ToolOutput::Text(summary)),
            Lookup::NotFound => Err(ToolError::NotFound(format!("Library entry {} not found", id))),
        }
    }
}

fn or_na(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}
