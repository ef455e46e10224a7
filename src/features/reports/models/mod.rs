mod report;
mod report_update;

pub use report::{CreateReport, Report, ReportCategory, ReportStatus};
pub use report_update::{ReportUpdate, UpdateChangeType};
