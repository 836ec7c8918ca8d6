//! End-to-end date-picker scenarios in headless Chrome
//!
//! Runs against the local fixture server, so no network access is needed.
//! Chrome or Chromium must be installed:
//!
//! ```text
//! cargo test --test datepicker_e2e -- --ignored
//! ```


use datepicker_webdriver::{
    format_date, BrowserError, CalendarDate, ChromeDriver, Clock, DatepickerPage, FixedClock,
    ScenarioConfig,
};
use std::time::Duration;
use test_server::TestServer;

async fn create_headless_driver() -> anyhow::Result<ChromeDriver> {
    ChromeDriver::launch_headless()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to launch Chrome: {}", e))
}

fn fixed_today() -> FixedClock {
    FixedClock(CalendarDate::from_ymd(2024, 10, 15).unwrap())
}

#[tokio::test]
#[ignore = "requires a Chrome installation"]
async fn test_pick_date_on_next_month() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;

    let driver = create_headless_driver().await?;
    driver.navigate(&server.datepicker_url("2024-10")).await?;

    let page = DatepickerPage::new(&driver, ScenarioConfig::default());
    page.open_from_menu().await?;

    let target = fixed_today().days_from_today(17)?;
    let outcome = page.pick(target).await;
    driver.close().await?;

    let outcome = outcome?;
    assert_eq!(outcome.expected, "Nov 1, 2024");
    assert_eq!(outcome.actual, format_date(&target));
    assert_eq!(outcome.steps, 1);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Chrome installation"]
async fn test_pick_date_in_current_month_does_not_page() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;

    let driver = create_headless_driver().await?;
    driver.navigate(&server.datepicker_url("2024-10")).await?;

    let page = DatepickerPage::new(&driver, ScenarioConfig::default());
    page.open_from_menu().await?;

    let target = fixed_today().days_from_today(5)?;
    let outcome = page.pick(target).await;
    driver.close().await?;

    let outcome = outcome?;
    assert_eq!(outcome.actual, "Oct 20, 2024");
    assert_eq!(outcome.steps, 0);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Chrome installation"]
async fn test_header_keeps_padding_spaces() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;

    let driver = create_headless_driver().await?;
    driver.navigate(&server.datepicker_url("2025-02")).await?;
    assert_eq!(driver.title().await?, "Datepicker Fixture");

    let page = DatepickerPage::new(&driver, ScenarioConfig::default());
    page.open_from_menu().await?;
    page.open_calendar().await?;
    let label = page.current_label().await;
    driver.close().await?;

    assert_eq!(label?, " February 2025 ");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Chrome installation"]
async fn test_past_month_hits_step_limit() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;

    let driver = create_headless_driver().await?;
    driver.navigate(&server.datepicker_url("2024-10")).await?;

    let config = ScenarioConfig {
        max_steps: Some(3),
        ..ScenarioConfig::default()
    };
    let page = DatepickerPage::new(&driver, config);
    page.open_from_menu().await?;

    let target = fixed_today().days_from_today(-40)?;
    let result = page.pick(target).await;
    driver.close().await?;

    match result {
        Err(BrowserError::ScanLimitExceeded { steps, .. }) => assert_eq!(steps, 3),
        other => anyhow::bail!("expected ScanLimitExceeded, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Chrome installation"]
async fn test_unbounded_scan_times_out() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;

    let driver = create_headless_driver().await?;
    driver.navigate(&server.datepicker_url("2024-10")).await?;

    let config = ScenarioConfig {
        scan_timeout: Duration::from_secs(2),
        ..ScenarioConfig::default()
    };
    let page = DatepickerPage::new(&driver, config);
    page.open_from_menu().await?;

    let target = fixed_today().days_from_today(-40)?;
    let result = page.pick(target).await;
    driver.close().await?;

    assert!(
        matches!(result, Err(BrowserError::Timeout { .. })),
        "expected timeout, got {:?}",
        result
    );
    Ok(())
}
