mod validator;

pub mod csrf;
pub mod dto;
pub mod guards;
pub mod handler;
pub mod model;
pub mod password;
pub mod routes;
pub mod service;
pub mod token;

pub use csrf::{CsrfTokenStore, HmacCsrfTokenStore};
pub use guards::RequestGuard;
pub use model::{AuthenticatedUser, ClientInfo, RequestContext};
pub use password::{Argon2Hasher, CredentialHasher};
pub use service::AuthService;
pub use token::TokenIssuer;
pub use validator::{JwtValidator, SessionClaims};
