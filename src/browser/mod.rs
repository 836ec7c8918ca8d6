pub mod ajax;
pub mod chrome;
pub mod datepicker;
pub mod forms;

pub use ajax::{AjaxConfig, AjaxPage};
pub use chrome::ChromeDriver;
pub use datepicker::{DatepickerPage, ScenarioConfig};
pub use forms::{FormLayoutsPage, FormsConfig};
