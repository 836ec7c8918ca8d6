//! Form-layouts scenario
//!
//! Works the "Using the Grid" card (email typing, radio group) and the
//! "Basic form" card (email, password, "Check me out", Submit) of the demo
//! app's Form Layouts page.

use super::chrome::ChromeDriver;
use crate::error::{BrowserError, Result};
use crate::wait::WaitOptions;
use serde::Serialize;
use std::time::Duration;

/// CSS selectors for the two form cards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLayoutsSelectors {
    /// Email input of the "Using the Grid" card
    pub grid_email: String,
    /// Radio options of the "Using the Grid" card
    pub grid_radios: String,
    pub basic_email: String,
    pub basic_password: String,
    /// "Check me out" checkbox wrapper
    pub basic_checkbox: String,
    pub basic_submit: String,
    pub menu_item: String,
}

impl Default for FormLayoutsSelectors {
    fn default() -> Self {
        Self {
            grid_email: "#inputEmail1".to_string(),
            grid_radios: "nb-card:has(#inputEmail1) nb-radio".to_string(),
            basic_email: "#exampleInputEmail1".to_string(),
            basic_password: "#exampleInputPassword1".to_string(),
            basic_checkbox: "nb-card:has(#exampleInputEmail1) nb-checkbox".to_string(),
            basic_submit: "nb-card:has(#exampleInputEmail1) button".to_string(),
            menu_item: ".menu-title".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormsConfig {
    pub selectors: FormLayoutsSelectors,
    pub menu_path: Vec<String>,
    /// Pause between keystrokes when typing key by key
    pub key_delay: Duration,
    pub wait: WaitOptions,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            selectors: FormLayoutsSelectors::default(),
            menu_path: vec!["Forms".to_string(), "Form Layouts".to_string()],
            key_delay: Duration::from_millis(500),
            wait: WaitOptions::default(),
        }
    }
}

/// One radio option and whether it is selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadioState {
    pub label: String,
    pub checked: bool,
}

/// What the basic form showed after submitting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicFormReport {
    pub email: String,
    pub email_placeholder: Option<String>,
    pub remember_me: bool,
    pub submit_label: String,
}

/// Full run over both cards, as reported by the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormsReport {
    pub grid_email: String,
    pub radios: Vec<RadioState>,
    pub basic: BasicFormReport,
}

pub struct FormLayoutsPage<'a> {
    driver: &'a ChromeDriver,
    config: FormsConfig,
}

impl<'a> FormLayoutsPage<'a> {
    pub fn new(driver: &'a ChromeDriver, config: FormsConfig) -> Self {
        Self { driver, config }
    }

    pub async fn open_from_menu(&self) -> Result<()> {
        self.driver
            .click_menu_path(
                &self.config.selectors.menu_item,
                &self.config.menu_path,
                self.config.wait,
            )
            .await
    }

    /// Replace the grid email in one go and confirm the input holds it
    pub async fn fill_grid_email(&self, email: &str) -> Result<String> {
        let selector = &self.config.selectors.grid_email;
        self.driver
            .wait_for_selector(selector, self.config.wait)
            .await?;
        self.driver.fill(selector, email).await?;
        self.driver
            .expect_input_value(selector, email, self.config.wait)
            .await
    }

    /// Clear the grid email, then type `email` key by key
    pub async fn type_grid_email(&self, email: &str) -> Result<String> {
        let selector = &self.config.selectors.grid_email;
        self.driver
            .wait_for_selector(selector, self.config.wait)
            .await?;
        self.driver.clear(selector).await?;
        self.driver
            .type_text(selector, email, self.config.key_delay)
            .await?;
        self.driver
            .expect_input_value(selector, email, self.config.wait)
            .await
    }

    /// Labels of the grid radio options in page order
    pub async fn radio_labels(&self) -> Result<Vec<String>> {
        self.driver
            .all_texts(&self.config.selectors.grid_radios)
            .await
    }

    pub async fn radio_states(&self) -> Result<Vec<RadioState>> {
        let states = self
            .driver
            .checked_by_label(&self.config.selectors.grid_radios)
            .await?;
        Ok(states
            .into_iter()
            .map(|(label, checked)| RadioState { label, checked })
            .collect())
    }

    /// Click the radio labelled `label` and check it is the only one selected
    pub async fn select_radio(&self, label: &str) -> Result<Vec<RadioState>> {
        let selector = &self.config.selectors.grid_radios;
        self.driver
            .wait_for_selector(selector, self.config.wait)
            .await?;
        self.driver.click_exact_text(selector, label).await?;

        let states = self.radio_states().await?;
        let selected: Vec<&str> = states
            .iter()
            .filter(|s| s.checked)
            .map(|s| s.label.as_str())
            .collect();
        if selected != [label] {
            return Err(BrowserError::AssertionFailed {
                expected: format!("only '{}' checked", label),
                actual: format!("checked: {:?}", selected),
            });
        }

        log::info!("Radio '{}' selected", label);
        Ok(states)
    }

    /// Fill and submit the basic form, ticking "Check me out"
    pub async fn submit_basic_form(&self, email: &str, password: &str) -> Result<BasicFormReport> {
        let selectors = &self.config.selectors;
        self.driver
            .wait_for_selector(&selectors.basic_email, self.config.wait)
            .await?;

        let email_placeholder = self
            .driver
            .attribute(&selectors.basic_email, "placeholder")
            .await?;

        self.driver.fill(&selectors.basic_email, email).await?;
        self.driver.fill(&selectors.basic_password, password).await?;

        if !self.driver.is_checked(&selectors.basic_checkbox).await? {
            self.driver.click(&selectors.basic_checkbox).await?;
        }
        let remember_me = self.driver.is_checked(&selectors.basic_checkbox).await?;

        let submit_label = self.driver.text(&selectors.basic_submit).await?;
        self.driver.click(&selectors.basic_submit).await?;

        let email = self
            .driver
            .expect_input_value(&selectors.basic_email, email, self.config.wait)
            .await?;

        log::info!("Basic form submitted as '{}'", email);
        Ok(BasicFormReport {
            email,
            email_placeholder,
            remember_me,
            submit_label,
        })
    }

    /// Type the grid email, pick each radio in turn, then submit the basic form
    pub async fn run(&self, email: &str, password: &str) -> Result<FormsReport> {
        let grid_email = self.type_grid_email(email).await?;

        let mut radios = Vec::new();
        for label in self.radio_labels().await? {
            if label.is_empty() || label.starts_with("Disabled") {
                continue;
            }
            radios = self.select_radio(&label).await?;
        }

        let basic = self.submit_basic_form(email, password).await?;
        Ok(FormsReport {
            grid_email,
            radios,
            basic,
        })
    }
}
