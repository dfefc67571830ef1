//! Activity log: append-only audit trail with admin query and retention.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/admin/logs` | Admin | Filtered, paginated listing |
//! | GET | `/api/admin/logs/stats` | Admin | Counters and action list |
//! | POST | `/api/admin/logs/cleanup` | Admin + CSRF | Retention purge |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::AuditLog;
