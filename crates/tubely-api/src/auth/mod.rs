pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtService;
pub use models::{AuthContext, JwtClaims};
