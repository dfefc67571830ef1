mod mail_dto;

pub use mail_dto::{TestEmailDto, TestEmailResponseDto};
