//! User directory: identity, role, active status and credentials.
//!
//! Administrators create accounts and reset passwords here. Passwords are
//! stored only as digests produced by the configured `CredentialHasher`.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/admin/users` | Admin | Users with access counters |
//! | POST | `/api/admin/users` | Admin + CSRF | Create an account |
//! | GET | `/api/admin/users/active` | Admin | Grant candidates |
//! | PATCH | `/api/admin/users/{id}/status` | Admin + CSRF | Activate/deactivate |
//! | PUT | `/api/admin/users/{id}/password` | Admin + CSRF | Reset password |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserDirectory;
