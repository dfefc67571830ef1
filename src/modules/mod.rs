//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for blob storage and outbound mail.

pub mod mailer;
pub mod storage;
