pub mod date;
pub mod scanner;

pub use date::{format_date, CalendarDate, Clock, FixedClock, MonthYearLabel, SystemClock};
pub use scanner::{scan_to_month, CalendarScanner, ScanOutcome, ScanState};
