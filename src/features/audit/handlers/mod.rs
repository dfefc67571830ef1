mod audit_handler;

pub use audit_handler::*;
