//! Real browser backend on top of `chromiumoxide`, feature-gated behind
//! `real-chrome`. Grounded in the teacher's `CdpAdapter::new()` launch
//! sequence (`cdp-adapter/src/lib.rs`) — the orphaned, never-wired
//! `crates/cdp-adapter/src/adapter.rs` showed the same
//! `Browser::launch(BrowserConfig)` call; this is the version of that idea
//! that is actually declared as a module and actually compiles against this
//! crate's own `Driver` trait.

#![cfg(feature = "real-chrome")]

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use dashmap::DashMap;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};
use vulcn_types::{PageId, Step, StepKind};

use crate::config::DriverConfig;
use crate::driver::{Driver, PageHandle, StepOutcome};
use crate::error::DriverError;
use crate::url_injection::{split_ordered_selector, submit_selector};
use vulcn_event_bus::{InMemoryBus, PageEvent};

/// Try each `||`-separated candidate in `selector` in order, returning the
/// first that resolves to an element (spec.md §4.1 selector-resolution
/// policy). A plain selector with no separator is tried as-is.
async fn find_first_match(
    page: &Page,
    selector: &str,
) -> Result<chromiumoxide::element::Element, DriverError> {
    let candidates = split_ordered_selector(selector);
    for candidate in &candidates {
        if let Ok(element) = page.find_element(*candidate).await {
            return Ok(element);
        }
    }
    Err(DriverError::SelectorNotFound(selector.to_string()))
}

pub struct ChromiumDriver {
    browser: Mutex<Browser>,
    pages: DashMap<PageId, Page>,
    buses: DashMap<PageId, std::sync::Arc<InMemoryBus<PageEvent>>>,
    default_deadline_ms: u64,
}

impl ChromiumDriver {
    pub async fn launch(config: DriverConfig) -> Result<Self, DriverError> {
        let mut builder = BrowserConfig::builder().with_headless(config.headless);
        if let Some(exe) = &config.executable {
            builder = builder.with_path(exe);
        }
        if let Some(dir) = &config.user_data_dir {
            builder = builder.with_user_data_dir(dir);
        }
        let browser_config = builder
            .build()
            .map_err(|e| DriverError::Internal(format!("bad chromium config: {e}")))?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| DriverError::Unreachable(format!("chromium launch failed: {e}")))?;

        // The handler must be polled continuously for CDP events to flow.
        tokio::spawn(async move {
            while let Some(event) = futures::StreamExt::next(&mut handler).await {
                if let Err(e) = event {
                    warn!(error = %e, "chromium handler event error");
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(browser),
            pages: DashMap::new(),
            buses: DashMap::new(),
            default_deadline_ms: config.default_deadline_ms,
        })
    }

    async fn page_for(&self, handle: &PageHandle) -> Result<Page, DriverError> {
        self.pages
            .get(&handle.id)
            .map(|p| p.clone())
            .ok_or_else(|| DriverError::Unreachable(format!("unknown page {}", handle.id)))
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn new_session_context(&self) -> Result<PageHandle, DriverError> {
        let browser = self.browser.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Internal(format!("new page failed: {e}")))?;
        let handle = PageHandle::new();
        self.pages.insert(handle.id.clone(), page);
        self.buses.insert(handle.id.clone(), InMemoryBus::new(256));
        Ok(handle)
    }

    async fn execute_step(&self, page: &PageHandle, step: &Step) -> Result<StepOutcome, DriverError> {
        let handle_page = self.page_for(page).await?;
        let started = Instant::now();
        let deadline = Duration::from_millis(self.default_deadline_ms);

        let result: Result<StepOutcome, DriverError> = match &step.kind {
            StepKind::Navigate { url, .. } => {
                debug!(url = %url, "navigating");
                tokio::time::timeout(deadline, handle_page.goto(url.as_str()))
                    .await
                    .map_err(|_| DriverError::NavigationTimeout(self.default_deadline_ms))?
                    .map_err(|e| DriverError::Internal(format!("navigate failed: {e}")))?;
                let url_after = handle_page.url().await.ok().flatten().unwrap_or_default();
                Ok(StepOutcome::success(0).with_url(url_after))
            }
            StepKind::Input { selector, value, .. } => {
                let element = find_first_match(&handle_page, selector).await?;
                element
                    .click()
                    .await
                    .map_err(|e| DriverError::Internal(format!("click before type failed: {e}")))?;
                element
                    .type_str(value.as_str())
                    .await
                    .map_err(|e| DriverError::Internal(format!("type failed: {e}")))?;
                Ok(StepOutcome::success(0))
            }
            StepKind::Click { selector } => {
                let resolved = if selector.is_empty() { submit_selector() } else { selector.as_str() };
                let element = find_first_match(&handle_page, resolved).await?;
                element
                    .click()
                    .await
                    .map_err(|e| DriverError::Internal(format!("click failed: {e}")))?;
                Ok(StepOutcome::success(0))
            }
            StepKind::Wait(spec) => {
                if let Some(selector) = &spec.selector {
                    tokio::time::timeout(
                        Duration::from_millis(spec.timeout_ms),
                        handle_page.find_element(selector.as_str()),
                    )
                    .await
                    .map_err(|_| DriverError::SelectorNotFound(selector.clone()))?
                    .map_err(|_| DriverError::SelectorNotFound(selector.clone()))?;
                } else {
                    tokio::time::sleep(Duration::from_millis(spec.timeout_ms)).await;
                }
                Ok(StepOutcome::success(0))
            }
            StepKind::Assert(_) => Ok(StepOutcome::success(0)),
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        result.map(|mut outcome| {
            outcome.latency_ms = latency_ms;
            outcome
        })
    }

    async fn close_session_context(&self, page: PageHandle) -> Result<(), DriverError> {
        if let Some((_, p)) = self.pages.remove(&page.id) {
            let _ = p.close().await;
        }
        self.buses.remove(&page.id);
        Ok(())
    }

    fn subscribe_events(&self, page: &PageHandle) -> broadcast::Receiver<PageEvent> {
        match self.buses.get(&page.id) {
            Some(bus) => bus.subscribe(),
            None => InMemoryBus::new(1).subscribe(),
        }
    }

    async fn close(&self) -> Result<(), DriverError> {
        let mut browser = self.browser.lock().await;
        self.pages.clear();
        self.buses.clear();
        browser
            .close()
            .await
            .map_err(|e| DriverError::Internal(format!("browser close failed: {e}")))?;
        Ok(())
    }
}
