//! AJAX-data scenario
//!
//! Clicks a button that starts a slow request and waits for the response
//! to be rendered as a `.bg-success` paragraph.

use super::chrome::ChromeDriver;
use crate::error::Result;
use crate::wait::WaitOptions;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AjaxSelectors {
    /// "Button Triggering AJAX Request"
    pub trigger: String,
    /// Paragraph rendered once data arrives
    pub result: String,
}

impl Default for AjaxSelectors {
    fn default() -> Self {
        Self {
            trigger: "#ajaxButton".to_string(),
            result: ".bg-success".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AjaxConfig {
    pub selectors: AjaxSelectors,
    pub expected_text: String,
    /// The server answers slowly; allow well beyond its delay
    pub wait: WaitOptions,
}

impl Default for AjaxConfig {
    fn default() -> Self {
        Self {
            selectors: AjaxSelectors::default(),
            expected_text: "Data loaded with AJAX get request.".to_string(),
            wait: WaitOptions::default().with_timeout(Duration::from_secs(20)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AjaxOutcome {
    pub text: String,
    /// Time from the click until the text matched
    pub waited_ms: u64,
}

pub struct AjaxPage<'a> {
    driver: &'a ChromeDriver,
    config: AjaxConfig,
}

impl<'a> AjaxPage<'a> {
    pub fn new(driver: &'a ChromeDriver, config: AjaxConfig) -> Self {
        Self { driver, config }
    }

    /// Click the trigger and wait for the loaded-data paragraph
    pub async fn load_data(&self) -> Result<AjaxOutcome> {
        let selectors = &self.config.selectors;
        self.driver
            .wait_for_selector(&selectors.trigger, self.config.wait)
            .await?;

        let started = Instant::now();
        self.driver.click(&selectors.trigger).await?;
        log::info!("AJAX request triggered, waiting for '{}'", selectors.result);

        self.driver
            .expect_visible(&selectors.result, self.config.wait)
            .await?;
        let text = self
            .driver
            .expect_text(
                &selectors.result,
                &self.config.expected_text,
                self.config.wait,
            )
            .await?;

        let waited_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!("AJAX data shown after {} ms", waited_ms);
        Ok(AjaxOutcome { text, waited_ms })
    }
}
