//! Sign-in: credential checks and session tokens

pub mod authenticator;
pub mod token;

pub use authenticator::{Authenticator, BasicAuthenticator};
pub use token::{Claims, IssuedToken, TokenIssuer};
