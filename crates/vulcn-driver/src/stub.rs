//! In-memory `Driver` implementation used by every test and the CLI demo
//! path. Behavior is supplied by a pluggable `StubBackend`, the same way the
//! teacher's test suites plug in `MockActionPrimitives`/`MockRegistry`
//! (`action-flow/src/executor.rs`, `scheduler/src/orchestrator.rs`).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use vulcn_types::{PageId, Step, StepKind};

use crate::driver::{Driver, PageHandle, StepOutcome};
use crate::error::DriverError;
use vulcn_event_bus::{ConsoleEvent, DialogEvent, EventBus, InMemoryBus, NetworkResponseEvent, PageEvent};

#[derive(Clone, Debug, Default)]
pub struct StubResponse {
    pub url_after: Option<String>,
    pub title_after: Option<String>,
    pub status_code: Option<u16>,
    pub body: String,
    pub dialog: Option<DialogEvent>,
    pub console: Vec<ConsoleEvent>,
    pub network: Option<NetworkResponseEvent>,
    pub delay_ms: u64,
    pub error: Option<DriverError>,
}

pub trait StubBackend: Send + Sync {
    fn respond(&self, page: &PageId, step: &Step) -> StubResponse;
}

/// Default backend: reflects navigated URLs and typed values directly into
/// the page body, with no SQL-error strings or dialogs. Good enough for
/// wiring smoke tests; security-behavior tests supply a purpose-built
/// backend instead.
pub struct ReflectingBackend;

impl StubBackend for ReflectingBackend {
    fn respond(&self, _page: &PageId, step: &Step) -> StubResponse {
        match &step.kind {
            StepKind::Navigate { url, .. } => StubResponse {
                url_after: Some(url.clone()),
                status_code: Some(200),
                body: format!("<html><body>{url}</body></html>"),
                ..Default::default()
            },
            StepKind::Input { value, .. } => StubResponse {
                body: format!("input received: {value}"),
                status_code: Some(200),
                ..Default::default()
            },
            StepKind::Click { .. } => StubResponse {
                status_code: Some(200),
                ..Default::default()
            },
            StepKind::Wait(_) | StepKind::Assert(_) => StubResponse::default(),
        }
    }
}

/// A backend driven by a closure, for tests that want one-off scripted
/// behavior without declaring a named struct.
pub struct ClosureBackend<F>(pub F)
where
    F: Fn(&PageId, &Step) -> StubResponse + Send + Sync;

impl<F> StubBackend for ClosureBackend<F>
where
    F: Fn(&PageId, &Step) -> StubResponse + Send + Sync,
{
    fn respond(&self, page: &PageId, step: &Step) -> StubResponse {
        (self.0)(page, step)
    }
}

struct PageState {
    url: String,
    title: String,
    bus: Arc<InMemoryBus<PageEvent>>,
}

pub struct StubDriver {
    backend: Arc<dyn StubBackend>,
    pages: DashMap<PageId, PageState>,
    closed: AtomicBool,
}

impl StubDriver {
    pub fn new(backend: Arc<dyn StubBackend>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            pages: DashMap::new(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn reflecting() -> Arc<Self> {
        Self::new(Arc::new(ReflectingBackend))
    }
}

#[async_trait]
impl Driver for StubDriver {
    async fn new_session_context(&self) -> Result<PageHandle, DriverError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DriverError::Closed);
        }
        let handle = PageHandle::new();
        self.pages.insert(
            handle.id.clone(),
            PageState {
                url: String::new(),
                title: String::new(),
                bus: InMemoryBus::new(256),
            },
        );
        Ok(handle)
    }

    async fn execute_step(&self, page: &PageHandle, step: &Step) -> Result<StepOutcome, DriverError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DriverError::Closed);
        }
        let started = Instant::now();
        let resp = self.backend.respond(&page.id, step);

        if resp.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(resp.delay_ms)).await;
        }

        {
            let mut state = self
                .pages
                .get_mut(&page.id)
                .ok_or_else(|| DriverError::Unreachable(format!("unknown page {}", page.id)))?;
            if let Some(url) = &resp.url_after {
                state.url = url.clone();
            }
            if let Some(title) = &resp.title_after {
                state.title = title.clone();
            }
            if let Some(dialog) = resp.dialog.clone() {
                let _ = state.bus.publish(PageEvent::Dialog(dialog)).await;
            }
            for console in &resp.console {
                let _ = state.bus.publish(PageEvent::Console(console.clone())).await;
            }
            if let Some(net) = resp.network.clone() {
                let _ = state.bus.publish(PageEvent::NetworkResponse(net)).await;
            }
        }

        let latency_ms = started.elapsed().as_millis() as u64;

        if let Some(err) = resp.error {
            return Ok(StepOutcome::failure(latency_ms, err));
        }

        let mut outcome = StepOutcome::success(latency_ms).with_body(resp.body);
        if let Some(url) = resp.url_after {
            outcome = outcome.with_url(url);
        }
        if let Some(title) = resp.title_after {
            outcome = outcome.with_title(title);
        }
        if let Some(status) = resp.status_code {
            outcome = outcome.with_status(status);
        }
        Ok(outcome)
    }

    async fn close_session_context(&self, page: PageHandle) -> Result<(), DriverError> {
        self.pages.remove(&page.id);
        Ok(())
    }

    fn subscribe_events(&self, page: &PageHandle) -> broadcast::Receiver<PageEvent> {
        match self.pages.get(&page.id) {
            Some(state) => state.bus.subscribe(),
            None => {
                // No such page: hand back a channel with no publishers.
                let bus: Arc<InMemoryBus<PageEvent>> = InMemoryBus::new(1);
                bus.subscribe()
            }
        }
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.closed.store(true, Ordering::SeqCst);
        self.pages.clear();
        Ok(())
    }
}

/// Convenience builder for scripted per-URL/per-selector responses, handy
/// when a test wants table-driven fixtures instead of a closure.
#[derive(Default)]
pub struct ScriptedBackend {
    by_url_substring: HashMap<String, StubResponse>,
    default: StubResponse,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_url_contains(mut self, needle: impl Into<String>, response: StubResponse) -> Self {
        self.by_url_substring.insert(needle.into(), response);
        self
    }

    pub fn default_response(mut self, response: StubResponse) -> Self {
        self.default = response;
        self
    }
}

impl StubBackend for ScriptedBackend {
    fn respond(&self, _page: &PageId, step: &Step) -> StubResponse {
        let url = match &step.kind {
            StepKind::Navigate { url, .. } => Some(url.clone()),
            _ => None,
        };
        if let Some(url) = url {
            for (needle, resp) in &self.by_url_substring {
                if url.contains(needle.as_str()) {
                    let mut r = resp.clone();
                    if r.url_after.is_none() {
                        r.url_after = Some(url.clone());
                    }
                    return r;
                }
            }
        }
        self.default.clone()
    }
}
