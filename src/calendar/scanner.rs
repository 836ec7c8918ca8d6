//! Calendar page scanning
//!
//! A paginated calendar widget only exposes "what page am I on" and "go to
//! the next page". `CalendarScanner` walks it forward until the header shows
//! the target month.
//!
//! The scan reads before it advances, so it never steps past a match. It
//! never navigates backwards: a target earlier than the starting page, or a
//! label the widget never renders, keeps it scanning forever unless a step
//! limit is set or the caller wraps it in a deadline (`tokio::time::timeout`).

use super::date::MonthYearLabel;
use crate::error::{BrowserError, Result};
use serde::Serialize;
use std::future::Future;

/// Where a scan currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    /// The displayed label does not contain the target yet
    Scanning,
    /// The displayed label contains the target; terminal
    Matched,
}

/// Result of a finished scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    /// How many times the calendar was advanced
    pub steps: usize,
    /// Header text at the time of the match
    pub label: String,
}

/// Drives a calendar forward until it shows `target`
#[derive(Debug, Clone)]
pub struct CalendarScanner {
    target: MonthYearLabel,
    max_steps: Option<usize>,
    state: ScanState,
    steps: usize,
}

impl CalendarScanner {
    /// Unbounded scanner for `target`
    pub fn new(target: MonthYearLabel) -> Self {
        Self {
            target,
            max_steps: None,
            state: ScanState::Scanning,
            steps: 0,
        }
    }

    /// Give up with `ScanLimitExceeded` after `max_steps` advances without a match
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn target(&self) -> &MonthYearLabel {
        &self.target
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Advances performed so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Feed one observed label; returns the resulting state
    ///
    /// A mismatch leaves the scanner in `Scanning`. The caller then checks
    /// `ensure_step_budget`, advances the calendar once and calls
    /// `record_advance`.
    pub fn observe(&mut self, displayed: &str) -> ScanState {
        if self.state == ScanState::Scanning && self.target.matches(displayed) {
            self.state = ScanState::Matched;
        }
        self.state
    }

    /// Fail with `ScanLimitExceeded` if another advance would pass the step limit
    pub fn ensure_step_budget(&self) -> Result<()> {
        match self.max_steps {
            Some(max) if self.steps >= max => Err(BrowserError::ScanLimitExceeded {
                target: self.target.to_string(),
                steps: self.steps,
            }),
            _ => Ok(()),
        }
    }

    /// Count one completed forward page
    pub fn record_advance(&mut self) {
        self.steps += 1;
    }

    /// Run the read-then-maybe-advance loop to completion
    ///
    /// `read` returns the calendar header text; `advance` moves one page
    /// forward. Errors from either callback end the scan and are returned
    /// as-is.
    pub async fn scan<R, RF, A, AF>(&mut self, mut read: R, mut advance: A) -> Result<ScanOutcome>
    where
        R: FnMut() -> RF,
        RF: Future<Output = Result<String>>,
        A: FnMut() -> AF,
        AF: Future<Output = Result<()>>,
    {
        loop {
            let displayed = read().await?;
            log::debug!(
                "Calendar shows '{}' (looking for '{}', {} step(s) so far)",
                displayed,
                self.target,
                self.steps
            );

            if self.observe(&displayed) == ScanState::Matched {
                log::info!(
                    "Calendar reached '{}' after {} step(s)",
                    self.target.as_str().trim(),
                    self.steps
                );
                return Ok(ScanOutcome {
                    steps: self.steps,
                    label: displayed,
                });
            }

            self.ensure_step_budget()?;
            advance().await?;
            self.record_advance();
        }
    }
}

/// Advance a calendar until its header contains `target`, with no step limit
///
/// Returns only once the target is displayed. See the module docs for why an
/// unreachable target needs an outer deadline.
pub async fn scan_to_month<R, RF, A, AF>(
    target: &MonthYearLabel,
    read: R,
    advance: A,
) -> Result<ScanOutcome>
where
    R: FnMut() -> RF,
    RF: Future<Output = Result<String>>,
    A: FnMut() -> AF,
    AF: Future<Output = Result<()>>,
{
    CalendarScanner::new(target.clone()).scan(read, advance).await
}
