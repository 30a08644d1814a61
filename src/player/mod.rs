//! Player validation and use cases

pub mod service;
pub mod validation;

pub use service::PlayerService;
pub use validation::validate_player;
