pub mod jwt;
pub mod password;
pub mod strategy;
pub mod token;

pub use jwt::{Claims, JwtKeys};
pub use strategy::{Authenticator, Credentials};
