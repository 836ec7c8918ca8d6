pub mod browser;
pub mod calendar;
pub mod error;
pub mod wait;

//  Re-export commonly used items
pub use browser::ajax::{AjaxConfig, AjaxOutcome, AjaxPage, AjaxSelectors};
pub use browser::chrome::{ChromeDriver, ConnectionMode};
pub use browser::datepicker::{DatepickerPage, DatepickerSelectors, PickOutcome, ScenarioConfig};
pub use browser::forms::{
    BasicFormReport, FormLayoutsPage, FormLayoutsSelectors, FormsConfig, FormsReport, RadioState,
};
pub use calendar::{
    format_date, scan_to_month, CalendarDate, CalendarScanner, Clock, FixedClock, MonthYearLabel,
    ScanOutcome, ScanState, SystemClock,
};
pub use error::BrowserError;
pub use wait::{poll_until, with_deadline, WaitOptions};
