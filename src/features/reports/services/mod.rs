mod report_service;
mod routing_service;
mod update_service;

pub use report_service::ReportService;
pub use routing_service::RoutingService;
pub use update_service::UpdateService;
