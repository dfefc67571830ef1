//! Payroll files: batch upload, per-user read grants, download and soft delete.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/files` | User | Files the caller may read |
//! | GET | `/api/files/{id}` | User | File metadata |
//! | GET | `/api/files/{id}/download` | User | Bytes (`?inline=true` to view) |
//! | POST | `/api/admin/files/upload` | Admin + CSRF | Multipart batch upload |
//! | GET | `/api/admin/files` | Admin | Files with grantees |
//! | DELETE | `/api/admin/files/{id}` | Admin + CSRF | Soft delete |
//! | GET | `/api/admin/files/{id}/access` | Admin | Grantees |
//! | POST | `/api/admin/files/{id}/access/grant` | Admin + CSRF | Grant to users |
//! | POST | `/api/admin/files/{id}/access/revoke` | Admin + CSRF | Revoke from users |
//! | POST | `/api/admin/files/{id}/access/grant-all` | Admin + CSRF | Grant to all users |
//! | POST | `/api/admin/files/{id}/access/revoke-all` | Admin + CSRF | Revoke all |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::{access_routes, routes, upload_routes};
pub use services::{AccessController, FileService, UploadTransaction};
