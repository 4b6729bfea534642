//! The Driver abstraction (spec.md §4.1, component C1).

use async_trait::async_trait;
use tokio::sync::broadcast;
use vulcn_types::{PageId, Step};

use crate::error::DriverError;
use vulcn_event_bus::PageEvent;

/// Opaque handle to a single browser tab/page owned by a Driver. A Session
/// Runner acquires one of these per `Session` and executes all of that
/// session's steps against it.
#[derive(Clone, Debug)]
pub struct PageHandle {
    pub id: PageId,
}

impl PageHandle {
    pub fn new() -> Self {
        Self { id: PageId::new() }
    }
}

impl Default for PageHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of executing a single (possibly substituted) `Step`.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    pub ok: bool,
    pub url_after: Option<String>,
    pub title_after: Option<String>,
    pub status_code: Option<u16>,
    pub body_excerpt: Option<String>,
    pub latency_ms: u64,
    pub error: Option<DriverError>,
}

impl StepOutcome {
    pub fn success(latency_ms: u64) -> Self {
        Self {
            ok: true,
            url_after: None,
            title_after: None,
            status_code: None,
            body_excerpt: None,
            latency_ms,
            error: None,
        }
    }

    pub fn failure(latency_ms: u64, error: DriverError) -> Self {
        Self {
            ok: false,
            url_after: None,
            title_after: None,
            status_code: None,
            body_excerpt: None,
            latency_ms,
            error: Some(error),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url_after = Some(url.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title_after = Some(title.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body_excerpt = Some(body.into());
        self
    }
}

/// One browser instance, shared across every session in a scan (spec.md
/// §4.5: the orchestrator launches exactly one Driver and runs sessions
/// against it sequentially — never in parallel).
#[async_trait]
pub trait Driver: Send + Sync {
    async fn new_session_context(&self) -> Result<PageHandle, DriverError>;

    async fn execute_step(&self, page: &PageHandle, step: &Step) -> Result<StepOutcome, DriverError>;

    async fn close_session_context(&self, page: PageHandle) -> Result<(), DriverError>;

    /// Subscribe to dialog/console/network-response events for a page. The
    /// Session Runner drains this during each step's settle window.
    fn subscribe_events(&self, page: &PageHandle) -> broadcast::Receiver<PageEvent>;

    /// Shut the browser process down. Must be safe to call more than once
    /// and must be called on every orchestrator exit path, including panics
    /// (spec.md §4.5).
    async fn close(&self) -> Result<(), DriverError>;
}
