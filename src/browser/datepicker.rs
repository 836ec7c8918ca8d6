//! Date-picker scenario
//!
//! Opens the "Form Picker" calendar, pages forward to the month of a target
//! date, clicks the day and checks that the input shows the date the way
//! `format_date` renders it.

use super::chrome::ChromeDriver;
use crate::calendar::{format_date, CalendarDate, CalendarScanner, MonthYearLabel, ScanOutcome};
use crate::error::Result;
use crate::wait::{with_deadline, WaitOptions};
use serde::Serialize;
use std::time::Duration;

/// CSS selectors for the pieces of the picker the scenario touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatepickerSelectors {
    /// Text input that opens the calendar and receives the picked date
    pub input: String,
    /// Calendar header showing ` <Month> <Year> `
    pub month_label: String,
    /// Button moving the calendar one month forward
    pub next_button: String,
    /// Day cells of the visible month
    pub day_cells: String,
    /// Sidebar entries used by `menu_path`
    pub menu_item: String,
}

impl Default for DatepickerSelectors {
    fn default() -> Self {
        Self {
            input: r#"input[placeholder="Form Picker"]"#.to_string(),
            month_label: "nb-calendar-view-mode".to_string(),
            next_button: r#"nb-calendar-pageable-navigation [data-name="chevron-right"]"#
                .to_string(),
            day_cells: r#"[class="day-cell ng-star-inserted"]"#.to_string(),
            menu_item: ".menu-title".to_string(),
        }
    }
}

/// Everything a date-picker run can be tuned with
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub selectors: DatepickerSelectors,
    /// Sidebar entries clicked in order to reach the picker page
    pub menu_path: Vec<String>,
    /// Deadline for the whole calendar scan
    pub scan_timeout: Duration,
    /// Optional cap on calendar pages; `None` scans until `scan_timeout`
    pub max_steps: Option<usize>,
    /// Retry policy for element lookups and the final value check
    pub wait: WaitOptions,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            selectors: DatepickerSelectors::default(),
            menu_path: vec!["Forms".to_string(), "Datepicker".to_string()],
            scan_timeout: Duration::from_secs(30),
            max_steps: None,
            wait: WaitOptions::default(),
        }
    }
}

/// What a successful pick observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickOutcome {
    pub date: CalendarDate,
    pub expected: String,
    pub actual: String,
    pub steps: usize,
}

/// The picker page, driven through a `ChromeDriver`
pub struct DatepickerPage<'a> {
    driver: &'a ChromeDriver,
    config: ScenarioConfig,
}

impl<'a> DatepickerPage<'a> {
    pub fn new(driver: &'a ChromeDriver, config: ScenarioConfig) -> Self {
        Self { driver, config }
    }

    /// Click through the sidebar entries in `menu_path`
    pub async fn open_from_menu(&self) -> Result<()> {
        self.driver
            .click_menu_path(
                &self.config.selectors.menu_item,
                &self.config.menu_path,
                self.config.wait,
            )
            .await
    }

    /// Focus the input so the calendar pops up
    pub async fn open_calendar(&self) -> Result<()> {
        let selectors = &self.config.selectors;
        self.driver
            .wait_for_selector(&selectors.input, self.config.wait)
            .await?;
        self.driver.click(&selectors.input).await?;
        self.driver
            .wait_for_selector(&selectors.month_label, self.config.wait)
            .await?;
        Ok(())
    }

    /// Raw calendar header, surrounding spaces included
    pub async fn current_label(&self) -> Result<String> {
        self.driver
            .text_content(&self.config.selectors.month_label)
            .await
    }

    /// Page the open calendar forward until it shows the month of `date`
    pub async fn show_month(&self, date: &CalendarDate) -> Result<ScanOutcome> {
        let mut scanner = CalendarScanner::new(MonthYearLabel::for_date(date));
        if let Some(max) = self.config.max_steps {
            scanner = scanner.with_max_steps(max);
        }
        let what = format!("calendar to show '{}'", scanner.target().as_str().trim());

        let driver = self.driver;
        let selectors = &self.config.selectors;
        let read = move || async move { driver.text_content(&selectors.month_label).await };
        let advance = move || async move { driver.click(&selectors.next_button).await };

        with_deadline(&what, self.config.scan_timeout, scanner.scan(read, advance)).await
    }

    /// Click the cell for `day` in the visible month
    pub async fn select_day(&self, day: u32) -> Result<()> {
        self.driver
            .click_exact_text(&self.config.selectors.day_cells, &day.to_string())
            .await
    }

    /// Pick `date` in an already open calendar and verify the input value
    pub async fn pick(&self, date: CalendarDate) -> Result<PickOutcome> {
        let expected = format_date(&date);
        log::info!("Picking {} (expecting '{}')", date, expected);

        self.open_calendar().await?;
        let scan = self.show_month(&date).await?;
        self.select_day(date.day()).await?;

        let actual = self
            .driver
            .expect_input_value(&self.config.selectors.input, &expected, self.config.wait)
            .await?;

        log::info!("Input shows '{}' after {} page(s)", actual, scan.steps);
        Ok(PickOutcome {
            date,
            expected,
            actual,
            steps: scan.steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selectors_target_form_picker() {
        let selectors = DatepickerSelectors::default();
        assert!(selectors.input.contains("Form Picker"));
        assert_eq!(selectors.month_label, "nb-calendar-view-mode");
        assert!(selectors.next_button.contains("chevron-right"));
    }

    #[test]
    fn test_default_config_is_unbounded_with_deadline() {
        let config = ScenarioConfig::default();
        assert_eq!(config.max_steps, None);
        assert_eq!(config.scan_timeout, Duration::from_secs(30));
        assert_eq!(config.menu_path, vec!["Forms", "Datepicker"]);
    }

    #[test]
    fn test_pick_outcome_serialization() {
        let outcome = PickOutcome {
            date: CalendarDate::from_ymd(2024, 11, 1).unwrap(),
            expected: "Nov 1, 2024".to_string(),
            actual: "Nov 1, 2024".to_string(),
            steps: 1,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["date"], "2024-11-01");
        assert_eq!(json["expected"], "Nov 1, 2024");
        assert_eq!(json["steps"], 1);
    }
}
