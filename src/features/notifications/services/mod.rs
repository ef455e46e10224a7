mod escalation_service;
mod notification_service;

pub use escalation_service::EscalationService;
pub use notification_service::NotificationService;
