//! End-to-end form-layouts scenarios in headless Chrome
//!
//! ```text
//! cargo test --test forms_e2e -- --ignored
//! ```


use datepicker_webdriver::{ChromeDriver, FormLayoutsPage, FormsConfig, RadioState};
use std::time::Duration;
use test_server::TestServer;

async fn create_headless_driver() -> anyhow::Result<ChromeDriver> {
    ChromeDriver::launch_headless()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to launch Chrome: {}", e))
}

fn fast_config() -> FormsConfig {
    FormsConfig {
        key_delay: Duration::from_millis(20),
        ..FormsConfig::default()
    }
}

async fn open_forms(server: &TestServer) -> anyhow::Result<ChromeDriver> {
    let driver = create_headless_driver().await?;
    driver.navigate(&server.forms_url()).await?;
    FormLayoutsPage::new(&driver, fast_config())
        .open_from_menu()
        .await?;
    Ok(driver)
}

#[tokio::test]
#[ignore = "requires a Chrome installation"]
async fn test_fill_then_type_grid_email() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;
    let driver = open_forms(&server).await?;

    let page = FormLayoutsPage::new(&driver, fast_config());
    let filled = page.fill_grid_email("test@test.com").await;
    let typed = page.type_grid_email("test2@test.com").await;
    driver.close().await?;

    assert_eq!(filled?, "test@test.com");
    assert_eq!(typed?, "test2@test.com");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Chrome installation"]
async fn test_radio_selection_is_exclusive() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;
    let driver = open_forms(&server).await?;

    let page = FormLayoutsPage::new(&driver, fast_config());
    let first = page.select_radio("Option 1").await;
    let second = page.select_radio("Option 2").await;
    driver.close().await?;

    let first = first?;
    assert!(first.contains(&RadioState {
        label: "Option 1".to_string(),
        checked: true,
    }));

    let second = second?;
    assert_eq!(
        second[..2],
        [
            RadioState {
                label: "Option 1".to_string(),
                checked: false,
            },
            RadioState {
                label: "Option 2".to_string(),
                checked: true,
            },
        ]
    );
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Chrome installation"]
async fn test_hidden_radio_input_takes_forced_click() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;
    let driver = open_forms(&server).await?;

    let input = r#"nb-card:has(#inputEmail1) input[value="2"]"#;
    let before = driver.is_checked(input).await;
    driver.force_click(input).await?;
    let after = driver.is_checked(input).await;
    let other = driver
        .is_checked(r#"nb-card:has(#inputEmail1) input[value="1"]"#)
        .await;
    driver.close().await?;

    assert!(!before?);
    assert!(after?);
    assert!(!other?);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Chrome installation"]
async fn test_reads_button_text_labels_and_placeholder() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;
    let driver = open_forms(&server).await?;

    let page = FormLayoutsPage::new(&driver, fast_config());
    let button = driver.text("#basic-submit").await;
    let labels = page.radio_labels().await;
    let placeholder = driver.attribute("#exampleInputEmail1", "placeholder").await;
    let missing = driver.attribute("#exampleInputEmail1", "data-missing").await;
    driver.close().await?;

    assert_eq!(button?, "Submit");
    let labels = labels?;
    assert!(labels.contains(&"Option 2".to_string()));
    assert_eq!(labels.len(), 3);
    assert_eq!(placeholder?.as_deref(), Some("Email"));
    assert_eq!(missing?, None);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Chrome installation"]
async fn test_submit_basic_form() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;
    let driver = open_forms(&server).await?;

    let page = FormLayoutsPage::new(&driver, fast_config());
    let report = page.submit_basic_form("test@test.com", "Welcome123").await;
    let status = driver
        .expect_text(
            "#basic-status",
            "Submitted test@test.com",
            Default::default(),
        )
        .await;
    driver.close().await?;

    let report = report?;
    assert_eq!(report.email, "test@test.com");
    assert_eq!(report.email_placeholder.as_deref(), Some("Email"));
    assert!(report.remember_me);
    assert_eq!(report.submit_label, "Submit");
    status?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Chrome installation"]
async fn test_full_run_ends_on_last_enabled_radio() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;
    let driver = open_forms(&server).await?;

    let report = FormLayoutsPage::new(&driver, fast_config())
        .run("test@test.com", "Welcome123")
        .await;
    driver.close().await?;

    let report = report?;
    assert_eq!(report.grid_email, "test@test.com");
    let checked: Vec<&str> = report
        .radios
        .iter()
        .filter(|r| r.checked)
        .map(|r| r.label.as_str())
        .collect();
    assert_eq!(checked, ["Option 2"]);
    assert!(report.basic.remember_me);
    Ok(())
}
