//! Player validation
//!
//! Every rule is checked and all violations are reported together, one per
//! line, in a fixed order.

use crate::error::{ArenaError, Result};
use crate::types::Player;
use tracing::debug;

pub const EMPTY_NAMES: &str = "Player names cannot be empty";
pub const BLANK_NAMES: &str = "Player names cannot contain only spaces";
pub const NEGATIVE_WINS: &str = "Player wins cannot be less than zero";
pub const NEGATIVE_LOSSES: &str = "Player losses cannot be less than zero";

/// Check a player before it is stored
pub fn validate_player(player: &Player) -> Result<()> {
    let mut messages = Vec::new();

    if player.names.is_empty() {
        messages.push(EMPTY_NAMES);
    } else if player.names.trim().is_empty() {
        messages.push(BLANK_NAMES);
    }
    if player.wins < 0 {
        messages.push(NEGATIVE_WINS);
    }
    if player.losses < 0 {
        messages.push(NEGATIVE_LOSSES);
    }

    if messages.is_empty() {
        return Ok(());
    }

    debug!(names = %player.names, violations = messages.len(), "Player failed validation");
    Err(ArenaError::Validation {
        message: messages.join("\n"),
    }
    .into())
}
