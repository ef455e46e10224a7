pub mod dtos;
pub mod handlers;
pub mod models;
pub mod realtime;
pub mod routes;
pub mod services;

pub use realtime::RealtimeHub;
pub use services::{EscalationService, NotificationService};
