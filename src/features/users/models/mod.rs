mod user;

pub use user::{NewUser, User, UserCredentials, UserOverview, UserRole};
