pub mod audit;
pub mod auth;
pub mod files;
pub mod notifications;
pub mod users;
