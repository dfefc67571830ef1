mod access_controller;
mod file_service;
mod upload_transaction;

pub use access_controller::AccessController;
pub use file_service::FileService;
pub use upload_transaction::UploadTransaction;
