//! Table-tennis match simulation
//!
//! The rendezvous table, the referee, the engine that plays a match and the
//! service that runs matches between stored players.

pub mod engine;
pub mod referee;
pub mod rendezvous;
pub mod service;

pub use engine::{MatchEngine, FATAL_NUMBER};
pub use referee::{Referee, SeededReferee};
pub use service::MatchService;
