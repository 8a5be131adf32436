pub mod cache;
pub mod page_report;
pub mod report_model;

pub use cache::ReportCache;
pub use page_report::PageStorage;
pub use report_model::{ObjectCategory, ReportedEvent, ReportedObject};
