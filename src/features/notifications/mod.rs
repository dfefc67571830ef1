//! Email: best-effort notifications for newly granted file access, plus an
//! admin delivery check.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/admin/mail/test` | Admin + CSRF | Send a test email |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::NotificationDispatcher;
