//! Stub collaborators for engine tests.

use askdesk_core::error::{AskDeskError, Result};
use askdesk_core::traits::{Encoder, GenerateParams, MissedQueryLog, Provider, SnippetSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Encoder backed by a lookup table. Unknown texts map to `fallback`.
pub struct MapEncoder {
    dims: usize,
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    fail_on: HashSet<String>,
}

impl MapEncoder {
    pub fn new(fallback: Vec<f32>) -> Self {
        Self {
            dims: fallback.len(),
            vectors: HashMap::new(),
            fallback,
            fail_on: HashSet::new(),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.fail_on.insert(text.to_string());
        self
    }
}

#[async_trait]
impl Encoder for MapEncoder {
    fn name(&self) -> &str {
        "map"
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail_on.contains(text) {
            return Err(AskDeskError::Encoder(format!("cannot encode {text}")));
        }
        Ok(self.vectors.get(text).cloned().unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Snippet source that returns a fixed page, or fails when `page` is `None`.
pub struct StubSnippet {
    pub page: Option<String>,
    pub calls: AtomicUsize,
}

impl StubSnippet {
    pub fn page(text: &str) -> Self {
        Self {
            page: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn down() -> Self {
        Self {
            page: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SnippetSource for StubSnippet {
    fn provenance(&self) -> &str {
        "hirebie.com"
    }

    async fn fetch(&self, _identifier: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.page
            .clone()
            .ok_or_else(|| AskDeskError::ExternalFetch("connection refused".into()))
    }
}

/// Provider that returns a fixed reply, or fails when `reply` is `None`.
pub struct StubProvider {
    pub reply: Option<String>,
    pub calls: AtomicUsize,
    pub last: Mutex<Option<(String, String, GenerateParams)>>,
}

impl StubProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_query: &str,
        params: &GenerateParams,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((
            system_prompt.to_string(),
            user_query.to_string(),
            params.clone(),
        ));
        self.reply
            .clone()
            .ok_or_else(|| AskDeskError::Generative("insufficient_quota".into()))
    }
}

#[derive(Default)]
pub struct RecordingLog {
    pub queries: Mutex<Vec<(String, DateTime<Utc>)>>,
}

impl RecordingLog {
    pub fn logged(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _)| q.clone())
            .collect()
    }
}

impl MissedQueryLog for RecordingLog {
    fn record(&self, query: &str, at: DateTime<Utc>) {
        self.queries.lock().unwrap().push((query.to_string(), at));
    }
}

/// Accepts connections and never answers. Returns its base URL.
pub async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}
