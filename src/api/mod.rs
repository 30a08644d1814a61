//! REST API for players, matches and sign-in

pub mod handlers;
pub mod response;
pub mod server;

pub use response::{ApiError, ApiResult};
pub use server::{router, ApiServer};
