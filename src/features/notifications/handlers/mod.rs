mod mail_handler;

pub use mail_handler::*;
