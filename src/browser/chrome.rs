use crate::error::{BrowserError, Result};
use crate::wait::{poll_until, WaitOptions};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{EventLoadEventFired, NavigateParams};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::cell::RefCell;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Script body: checked state of `el` or of the first input inside it
const CHECKED_JS: &str = "const input = el.matches('input') ? el : el.querySelector('input'); \
                          return !!(input && input.checked);";

pub struct ChromeDriver {
    browser: Browser,
    temp_dir: Option<PathBuf>,
}

/// Connection mode for Chrome browser
pub enum ConnectionMode {
    /// Sandboxed mode - launches Chrome using system installation
    Sandboxed {
        chrome_path: Option<String>,
        no_sandbox: bool,
        headless: bool,
    },
    /// Advanced mode - connects to existing Chrome on debug port
    DebugPort(u16),
}

/// True when running under a known CI system
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "JENKINS_HOME", "CIRCLECI"]
        .iter()
        .any(|var| std::env::var(var).is_ok())
}

impl ChromeDriver {
    /// Helper method to get the current active page, excluding Chrome's new-tab-page
    async fn get_active_page(&self) -> Result<Page> {
        let pages = self.browser.pages().await?;

        for page in pages.iter() {
            if let Ok(Some(url)) = page.url().await {
                if !url.starts_with("chrome://") {
                    return Ok(page.clone());
                }
            }
        }

        if let Some(page) = pages.last() {
            return Ok(page.clone());
        }

        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Other(format!("Failed to create page: {}", e)))
    }

    /// Launch a headless Chrome without the sandbox, as used by the test suite
    pub async fn launch_headless() -> Result<Self> {
        Self::new(ConnectionMode::Sandboxed {
            chrome_path: None,
            no_sandbox: true,
            headless: true,
        })
        .await
    }

    /// Create new ChromeDriver with specified connection mode
    pub async fn new(mode: ConnectionMode) -> Result<Self> {
        let (browser, temp_dir) = match mode {
            ConnectionMode::Sandboxed {
                chrome_path,
                no_sandbox,
                headless,
            } => {
                // Unique profile directory so parallel scenarios never share state
                let unique_id = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_nanos())
                    .unwrap_or_default();
                let temp_dir = std::env::temp_dir().join(format!(
                    "datepicker-webdriver-{}-{}",
                    std::process::id(),
                    unique_id
                ));
                std::fs::create_dir_all(&temp_dir).map_err(|e| {
                    BrowserError::LaunchFailed(format!("Failed to create temp directory: {}", e))
                })?;

                let mut config = if headless {
                    BrowserConfig::builder()
                } else {
                    BrowserConfig::builder().with_head()
                };
                config = config.user_data_dir(&temp_dir);

                if no_sandbox {
                    config = config.arg("--no-sandbox");
                }
                if let Some(path) = chrome_path {
                    config = config.chrome_executable(path);
                }

                let config = config.build().map_err(|e| {
                    BrowserError::LaunchFailed(format!(
                        "{}. Install Chrome/Chromium or pass --chrome-path",
                        e
                    ))
                })?;

                log::info!(
                    "Launching Chrome (headless: {}, no-sandbox: {})",
                    headless,
                    no_sandbox
                );
                let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
                    BrowserError::LaunchFailed(format!(
                        "{}. Linux sandbox issue? Try --no-sandbox",
                        e
                    ))
                })?;

                tokio::spawn(async move {
                    while (handler.next().await).is_some() {
                        // Drain browser events
                    }
                });

                (browser, Some(temp_dir))
            }
            ConnectionMode::DebugPort(port) => {
                let url = format!("http://localhost:{}", port);
                let (browser, mut handler) = Browser::connect(&url).await.map_err(|e| {
                    BrowserError::ConnectionFailed(format!(
                        "Failed to connect to Chrome on port {}. \
                             Make sure Chrome is running with --remote-debugging-port={}: {}",
                        port, port, e
                    ))
                })?;

                tokio::spawn(async move {
                    while (handler.next().await).is_some() {
                        // Drain browser events
                    }
                });

                (browser, None)
            }
        };

        Ok(Self { browser, temp_dir })
    }

    /// Navigate to a URL and wait for its load event
    pub async fn navigate(&self, url: &str) -> Result<()> {
        let normalized_url = if !url.contains("://")
            && !url.starts_with("about:")
            && !url.starts_with("data:")
        {
            format!("https://{}", url)
        } else {
            url.to_string()
        };

        log::info!("Navigating to {}", normalized_url);
        let page = self.get_active_page().await?;

        // Subscribe before navigating so a fast load is not missed
        let mut loads = page.event_listener::<EventLoadEventFired>().await?;

        let params = NavigateParams::builder()
            .url(&normalized_url)
            .build()
            .map_err(|e| {
                BrowserError::NavigationFailed(format!("Invalid URL {}: {}", normalized_url, e))
            })?;

        let response = page.execute(params).await.map_err(|e| {
            if e.to_string().contains("oneshot canceled") {
                BrowserError::NavigationFailed(
                    "Browser connection lost. The browser may have been closed or crashed."
                        .to_string(),
                )
            } else {
                BrowserError::NavigationFailed(format!(
                    "Failed to navigate to {}: {}",
                    normalized_url, e
                ))
            }
        })?;

        if let Some(error_text) = &response.result.error_text {
            return Err(BrowserError::NavigationFailed(format!(
                "Navigation error: {}",
                error_text
            )));
        }

        match tokio::time::timeout(LOAD_TIMEOUT, loads.next()).await {
            Ok(Some(_)) => log::debug!("Load event fired for {}", normalized_url),
            Ok(None) => log::warn!("Load event stream closed before {} loaded", normalized_url),
            Err(_) => {
                return Err(BrowserError::Timeout {
                    what: format!("load event of {}", normalized_url),
                    elapsed: LOAD_TIMEOUT,
                })
            }
        }

        Ok(())
    }

    /// Get page title
    pub async fn title(&self) -> Result<String> {
        let page = self.get_active_page().await?;
        page.get_title().await?.ok_or(BrowserError::NoPage)
    }

    /// Find the first element matching `selector`
    pub async fn find(&self, selector: &str) -> Result<Element> {
        let page = self.get_active_page().await?;
        page.find_element(selector)
            .await
            .map_err(|_e| BrowserError::ElementNotFound(selector.to_string()))
    }

    /// Run `body` against the first element matching `selector`, bound as `el`
    ///
    /// Yields `None` when nothing matches. `body` must end with a `return`.
    async fn eval_on<T: serde::de::DeserializeOwned>(
        &self,
        selector: &str,
        body: &str,
    ) -> Result<Option<T>> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return null; {} }})()",
            js_string(selector)?,
            body
        );
        self.execute_script_typed::<Option<T>>(&script).await
    }

    /// String form of a DOM property (`textContent`, `value`, ...) of the first match
    async fn read_property(&self, selector: &str, property: &str) -> Result<String> {
        let body = format!(
            "const v = el[{}]; return v == null ? '' : String(v);",
            js_string(property)?
        );
        self.eval_on::<String>(selector, &body)
            .await?
            .ok_or(BrowserError::ElementNotFound(selector.to_string()))
    }

    /// Raw `textContent` of the first element matching `selector`
    ///
    /// Unlike `innerText` this keeps surrounding whitespace, which calendar
    /// headers rely on.
    pub async fn text_content(&self, selector: &str) -> Result<String> {
        self.read_property(selector, "textContent").await
    }

    /// `textContent` of the first match with surrounding whitespace trimmed
    pub async fn text(&self, selector: &str) -> Result<String> {
        Ok(self.text_content(selector).await?.trim().to_string())
    }

    /// Trimmed `textContent` of every element matching `selector`, in document order
    pub async fn all_texts(&self, selector: &str) -> Result<Vec<String>> {
        let script = format!(
            "Array.from(document.querySelectorAll({})).map(el => (el.textContent || '').trim())",
            js_string(selector)?
        );
        self.execute_script_typed::<Vec<String>>(&script).await
    }

    /// Current `value` of the input matching `selector`
    pub async fn input_value(&self, selector: &str) -> Result<String> {
        self.read_property(selector, "value").await
    }

    /// Attribute `name` of the first match, `None` when the attribute is absent
    pub async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        #[derive(serde::Deserialize)]
        struct AttributeValue {
            value: Option<String>,
        }

        let body = format!("return {{ value: el.getAttribute({}) }};", js_string(name)?);
        self.eval_on::<AttributeValue>(selector, &body)
            .await?
            .map(|attr| attr.value)
            .ok_or(BrowserError::ElementNotFound(selector.to_string()))
    }

    /// Whether the first match is checked
    ///
    /// Works on a checkbox/radio input or on a wrapper (`nb-radio`,
    /// `nb-checkbox`) holding one.
    pub async fn is_checked(&self, selector: &str) -> Result<bool> {
        self.eval_on::<bool>(selector, CHECKED_JS)
            .await?
            .ok_or(BrowserError::ElementNotFound(selector.to_string()))
    }

    /// Trimmed text and checked state of every option matching `selector`
    pub async fn checked_by_label(&self, selector: &str) -> Result<Vec<(String, bool)>> {
        let script = format!(
            "Array.from(document.querySelectorAll({})).map(el => [(el.textContent || '').trim(), (() => {{ {} }})()])",
            js_string(selector)?,
            CHECKED_JS
        );
        self.execute_script_typed::<Vec<(String, bool)>>(&script).await
    }

    /// Whether the first match is rendered: attached, laid out and not `visibility: hidden`
    ///
    /// A missing element counts as not visible.
    pub async fn is_visible(&self, selector: &str) -> Result<bool> {
        let visible = self
            .eval_on::<bool>(
                selector,
                "const style = getComputedStyle(el); \
                 return style.display !== 'none' && style.visibility !== 'hidden' \
                 && (el.offsetParent !== null || el.getClientRects().length > 0);",
            )
            .await?;
        Ok(visible.unwrap_or(false))
    }

    /// Replace the value of the input under `selector`, firing `input` and `change`
    pub async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let body = format!(
            "el.focus(); el.value = {}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true;",
            js_string(value)?
        );
        self.eval_on::<bool>(selector, &body)
            .await?
            .map(|_| ())
            .ok_or(BrowserError::ElementNotFound(selector.to_string()))
    }

    /// Empty the input under `selector`
    pub async fn clear(&self, selector: &str) -> Result<()> {
        self.fill(selector, "").await
    }

    /// Type `text` into the element one key at a time, pausing `delay` between keys
    pub async fn type_text(&self, selector: &str, text: &str, delay: Duration) -> Result<()> {
        let element = self.find(selector).await?;
        element.focus().await?;

        let mut buf = [0u8; 4];
        for (i, ch) in text.chars().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            element.type_str(ch.encode_utf8(&mut buf)).await?;
        }
        Ok(())
    }

    /// Click the first element matching `selector`
    pub async fn click(&self, selector: &str) -> Result<()> {
        self.find(selector).await?.click().await?;
        Ok(())
    }

    /// Dispatch a click from script, for controls that are visually hidden
    pub async fn force_click(&self, selector: &str) -> Result<()> {
        self.eval_on::<bool>(selector, "el.click(); return true;")
            .await?
            .map(|_| ())
            .ok_or(BrowserError::ElementNotFound(selector.to_string()))
    }

    /// Click the element under `selector` whose trimmed text equals `text` exactly
    pub async fn click_exact_text(&self, selector: &str, text: &str) -> Result<()> {
        let page = self.get_active_page().await?;
        let elements = page
            .find_elements(selector)
            .await
            .map_err(|_e| BrowserError::ElementNotFound(selector.to_string()))?;

        for element in elements {
            if let Some(inner) = element.inner_text().await? {
                if inner.trim() == text {
                    element.click().await?;
                    return Ok(());
                }
            }
        }

        Err(BrowserError::ElementNotFound(format!(
            "{} with text '{}'",
            selector, text
        )))
    }

    /// Click sidebar entries (matched by `item_selector`) in order
    pub async fn click_menu_path(
        &self,
        item_selector: &str,
        path: &[String],
        options: WaitOptions,
    ) -> Result<()> {
        for entry in path {
            log::debug!("Clicking menu entry '{}'", entry);
            self.wait_for_selector(item_selector, options).await?;
            self.click_exact_text(item_selector, entry).await?;
        }
        Ok(())
    }

    /// Wait until an element matching `selector` is attached to the DOM
    pub async fn wait_for_selector(&self, selector: &str, options: WaitOptions) -> Result<Element> {
        let what = format!("selector '{}'", selector);
        poll_until(&what, options, move || async move {
            match self.find(selector).await {
                Ok(element) => Ok(Some(element)),
                Err(BrowserError::ElementNotFound(_)) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
    }

    /// Wait until the first match of `selector` is visible
    pub async fn expect_visible(&self, selector: &str, options: WaitOptions) -> Result<()> {
        let what = format!("'{}' to be visible", selector);
        poll_until(&what, options, move || async move {
            Ok(self.is_visible(selector).await?.then_some(()))
        })
        .await
    }

    /// Wait until the trimmed text of the first match of `selector` equals `expected`
    ///
    /// Fails with `AssertionFailed` carrying the last observed text.
    pub async fn expect_text(
        &self,
        selector: &str,
        expected: &str,
        options: WaitOptions,
    ) -> Result<String> {
        let what = format!("text '{}' in '{}'", expected, selector);
        self.expect_eventually(&what, expected.trim(), options, move || async move {
            match self.text(selector).await {
                Ok(text) => Ok(Some(text)),
                Err(BrowserError::ElementNotFound(_)) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
    }

    /// Wait until the input under `selector` holds exactly `expected`
    ///
    /// Fails with `AssertionFailed` carrying the last observed value.
    pub async fn expect_input_value(
        &self,
        selector: &str,
        expected: &str,
        options: WaitOptions,
    ) -> Result<String> {
        let what = format!("value '{}' in '{}'", expected, selector);
        self.expect_eventually(&what, expected, options, move || async move {
            self.input_value(selector).await.map(Some)
        })
        .await
    }

    /// Poll `read` until it yields `expected`; a timeout becomes `AssertionFailed`
    ///
    /// `read` yields `None` while the element is not there yet.
    async fn expect_eventually<F, Fut>(
        &self,
        what: &str,
        expected: &str,
        options: WaitOptions,
        read: F,
    ) -> Result<String>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Option<String>>>,
    {
        let last = RefCell::new(String::new());
        let last_ref = &last;
        let result = poll_until(what, options, move || {
            let observed = read();
            async move {
                let Some(value) = observed.await? else {
                    return Ok(None);
                };
                let done = value == expected;
                *last_ref.borrow_mut() = value.clone();
                Ok(done.then_some(value))
            }
        })
        .await;

        match result {
            Err(BrowserError::Timeout { .. }) => Err(BrowserError::AssertionFailed {
                expected: expected.to_string(),
                actual: last.into_inner(),
            }),
            other => other,
        }
    }

    /// Execute JavaScript and return a specific type
    pub async fn execute_script_typed<T: serde::de::DeserializeOwned>(
        &self,
        script: &str,
    ) -> Result<T> {
        let page = self.get_active_page().await?;

        let result = page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Other(format!("Script execution failed: {}", e)))?;

        result
            .into_value()
            .map_err(|e| BrowserError::Other(format!("Failed to deserialize result: {}", e)))
    }

    /// Close the browser connection
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| BrowserError::Other(e.to_string()))?;
        Ok(())
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        if let Some(temp_dir) = &self.temp_dir {
            if temp_dir.exists() {
                let _ = std::fs::remove_dir_all(temp_dir);
            }
        }
    }
}

/// Quote a value as a JavaScript string literal
fn js_string(value: &str) -> Result<String> {
    serde_json::to_string(value).map_err(|e| BrowserError::Other(e.to_string()))
}
