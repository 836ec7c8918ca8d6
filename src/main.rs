use anyhow::Context;
use clap::{Parser, Subcommand};
use datepicker_webdriver::browser::chrome::{is_ci, ChromeDriver, ConnectionMode};
use datepicker_webdriver::{
    format_date, AjaxConfig, AjaxPage, CalendarDate, Clock, DatepickerPage, FormLayoutsPage,
    FormsConfig, MonthYearLabel, ScenarioConfig, SystemClock,
};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

/// How to get a Chrome to drive
#[derive(clap::Args, Debug)]
struct BrowserArgs {
    /// Path to Chrome executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Attach to a Chrome already listening on this debug port
    #[arg(long)]
    debug_port: Option<u16>,

    /// Run without a visible window (implied on CI)
    #[arg(long)]
    headless: bool,

    /// Disable the Chrome sandbox (implied on CI)
    #[arg(long)]
    no_sandbox: bool,
}

impl BrowserArgs {
    async fn connect(self) -> anyhow::Result<ChromeDriver> {
        let ci = is_ci();
        let mode = match self.debug_port {
            Some(port) => ConnectionMode::DebugPort(port),
            None => ConnectionMode::Sandboxed {
                chrome_path: self.chrome_path,
                no_sandbox: self.no_sandbox || ci,
                headless: self.headless || ci,
            },
        };
        Ok(ChromeDriver::new(mode).await?)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the input text and calendar header expected for a date
    Format {
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Days to add to the date
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset_days: i64,
    },

    /// Pick a date in a live date-picker and verify the input
    Pick {
        /// Page hosting the picker
        #[arg(long, env = "DATEPICKER_URL", default_value = "http://localhost:4200/")]
        url: String,

        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Days to add to the date
        #[arg(long, default_value_t = 14, allow_hyphen_values = true)]
        offset_days: i64,

        #[command(flatten)]
        browser: BrowserArgs,

        /// Stop after this many calendar pages without a match
        #[arg(long)]
        max_steps: Option<usize>,

        /// Deadline for paging the calendar, in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,

        /// The URL already shows the picker; skip the sidebar navigation
        #[arg(long)]
        skip_menu: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Type into the form-layouts page, toggle its radios and submit the basic form
    Forms {
        /// Page hosting the form layouts
        #[arg(long, env = "DATEPICKER_URL", default_value = "http://localhost:4200/")]
        url: String,

        #[arg(long, default_value = "test@test.com")]
        email: String,

        #[arg(long, default_value = "Welcome123")]
        password: String,

        /// Pause between keystrokes, in milliseconds
        #[arg(long, default_value_t = 500)]
        key_delay_ms: u64,

        #[command(flatten)]
        browser: BrowserArgs,

        /// The URL already shows the forms; skip the sidebar navigation
        #[arg(long)]
        skip_menu: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Trigger the AJAX button and wait for the loaded data
    Ajax {
        #[arg(long, env = "AJAX_URL", default_value = "http://uitestingplayground.com/ajax")]
        url: String,

        /// How long to wait for the data, in seconds
        #[arg(long, default_value_t = 20)]
        timeout_secs: u64,

        #[command(flatten)]
        browser: BrowserArgs,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

fn resolve_date(date: Option<&str>, offset_days: i64) -> anyhow::Result<CalendarDate> {
    let base = match date {
        Some(raw) => raw.parse::<CalendarDate>()?,
        None => SystemClock.today(),
    };
    base.offset_days(offset_days)
        .with_context(|| format!("{} offset by {} days is out of range", base, offset_days))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Format { date, offset_days } => {
            let date = resolve_date(date.as_deref(), offset_days)?;
            println!("{}", format_date(&date));
            println!("'{}'", MonthYearLabel::for_date(&date));
        }
        Command::Pick {
            url,
            date,
            offset_days,
            browser,
            max_steps,
            timeout_secs,
            skip_menu,
            json,
        } => {
            let date = resolve_date(date.as_deref(), offset_days)?;
            let driver = browser.connect().await?;
            let config = ScenarioConfig {
                scan_timeout: Duration::from_secs(timeout_secs),
                max_steps,
                menu_path: if skip_menu {
                    Vec::new()
                } else {
                    ScenarioConfig::default().menu_path
                },
                ..ScenarioConfig::default()
            };

            let outcome = async {
                driver.navigate(&url).await?;
                let page = DatepickerPage::new(&driver, config);
                page.open_from_menu().await?;
                page.pick(date).await
            }
            .await;
            close_quietly(driver).await;

            let outcome = outcome.with_context(|| format!("Picking {} failed", date))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!(
                    "OK: input shows '{}' after {} calendar page(s)",
                    outcome.actual, outcome.steps
                );
            }
        }
        Command::Forms {
            url,
            email,
            password,
            key_delay_ms,
            browser,
            skip_menu,
            json,
        } => {
            let driver = browser.connect().await?;
            let config = FormsConfig {
                key_delay: Duration::from_millis(key_delay_ms),
                menu_path: if skip_menu {
                    Vec::new()
                } else {
                    FormsConfig::default().menu_path
                },
                ..FormsConfig::default()
            };

            let report = async {
                driver.navigate(&url).await?;
                let page = FormLayoutsPage::new(&driver, config);
                page.open_from_menu().await?;
                page.run(&email, &password).await
            }
            .await;
            close_quietly(driver).await;

            let report = report.context("Form layouts run failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let selected = report
                    .radios
                    .iter()
                    .find(|r| r.checked)
                    .map(|r| r.label.as_str())
                    .unwrap_or("none");
                println!(
                    "OK: typed '{}', radio '{}' selected, basic form submitted",
                    report.grid_email, selected
                );
            }
        }
        Command::Ajax {
            url,
            timeout_secs,
            browser,
            json,
        } => {
            let driver = browser.connect().await?;
            let defaults = AjaxConfig::default();
            let config = AjaxConfig {
                wait: defaults.wait.with_timeout(Duration::from_secs(timeout_secs)),
                ..defaults
            };

            let outcome = async {
                driver.navigate(&url).await?;
                AjaxPage::new(&driver, config).load_data().await
            }
            .await;
            close_quietly(driver).await;

            let outcome = outcome.context("AJAX data did not load")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("OK: '{}' after {} ms", outcome.text, outcome.waited_ms);
            }
        }
    }

    Ok(())
}

async fn close_quietly(driver: ChromeDriver) {
    if let Err(e) = driver.close().await {
        log::warn!("Failed to close Chrome cleanly: {}", e);
    }
}
