mod user_dto;

pub use user_dto::{
    CreateUserDto, ResetPasswordDto, UpdateUserStatusDto, UserOverviewDto, UserResponseDto,
};
