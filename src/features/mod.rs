pub mod analysis;
pub mod auth;
pub mod departments;
pub mod notifications;
pub mod reports;
pub mod users;
