#![allow(dead_code)]

use async_trait::async_trait;
use hardcover_client::{
    CatalogProvider, Item, Lookup, ProviderError, ProviderResult, ReadingStatus, StatusUpdate,
};
use hardcover_mcp::{CatalogProfile, McpServer, Session};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Search { query: String, limit: u32 },
    Details(i64),
    Library(Option<i64>),
    Add(i64, ReadingStatus),
    Update(StatusUpdate),
}

/// In-memory provider that records every call
#[derive(Default)]
pub struct RecordingProvider {
    pub books: Vec<Item>,
    pub details: HashMap<i64, Item>,
    pub library: Vec<Item>,
    pub fail_with: Option<String>,
    /// Block search calls forever; `search_dropped` flips when such a call is cancelled
    pub hang_search: bool,
    pub search_started: Arc<AtomicBool>,
    pub search_dropped: Arc<AtomicBool>,
    pub calls: Mutex<Vec<ProviderCall>>,
    pub closed: AtomicBool,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(mut self, books: Vec<Item>) -> Self {
        self.books = books;
        self
    }

    pub fn with_detail(mut self, id: i64, book: Item) -> Self {
        self.details.insert(id, book);
        self
    }

    pub fn with_library(mut self, entries: Vec<Item>) -> Self {
        self.library = entries;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn hanging(mut self) -> Self {
        self.hang_search = true;
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn record(&self, call: ProviderCall) -> ProviderResult<()> {
        self.calls.lock().unwrap().push(call);
        match &self.fail_with {
            Some(message) => Err(ProviderError::GraphQl(message.clone())),
            None => Ok(()),
        }
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogProvider for RecordingProvider {
    async fn search_books(&self, query: &str, limit: u32) -> ProviderResult<Vec<Item>> {
        self.record(ProviderCall::Search { query: query.to_string(), limit })?;
        if self.hang_search {
            let _flag = DropFlag(self.search_dropped.clone());
            self.search_started.store(true, Ordering::SeqCst);
            std::future::pending::<()>().await;
        }
        Ok(self.books.iter().take(limit as usize).cloned().collect())
    }

    async fn get_book_details(&self, id: i64) -> ProviderResult<Lookup<Item>> {
        self.record(ProviderCall::Details(id))?;
        Ok(self.details.get(&id).cloned().into())
    }

    async fn get_user_library(&self, user_id: Option<i64>) -> ProviderResult<Vec<Item>> {
        self.record(ProviderCall::Library(user_id))?;
        Ok(self.library.clone())
    }

    async fn add_to_library(&self, book_id: i64, status: ReadingStatus) -> ProviderResult<Item> {
        self.record(ProviderCall::Add(book_id, status))?;
        Ok(json!({ "id": 1000 + book_id, "status": status.as_str() }))
    }

    async fn update_reading_status(&self, update: StatusUpdate) -> ProviderResult<Lookup<Item>> {
        let id = update.id;
        self.record(ProviderCall::Update(update))?;
        Ok(if self.library.iter().any(|entry| entry["id"] == id) {
            Lookup::Found(json!({ "id": id }))
        } else {
            Lookup::NotFound
        })
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

pub fn sample_books() -> Vec<Item> {
    vec![
        json!({ "id": 1, "title": "Dune", "author_users": [ { "user": { "name": "Frank Herbert" } } ] }),
        json!({ "id": 2, "title": "Dune Messiah", "rating": 3.9 }),
    ]
}

pub fn server_with(provider: Arc<RecordingProvider>, profile: CatalogProfile) -> Arc<McpServer> {
    Session::new(provider, profile).unwrap().server()
}

pub fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

pub fn tools_call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
}
