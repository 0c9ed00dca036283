//! # Game Errors
//!
//! Errors raised above the ECS core: configuration and the frame driver.

use thiserror::Error;

use ember_core::EcsError;

/// Errors that can occur while configuring or running a game.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    /// An ECS call failed inside setup or a system update.
    #[error("ecs error: {0}")]
    Ecs(#[from] EcsError),

    /// The game configuration could not be read, parsed, or validated.
    #[error("invalid game configuration: {0}")]
    Config(String),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecs_error_converts() {
        let err: GameError = EcsError::SystemNotFound("Render").into();
        assert!(matches!(err, GameError::Ecs(EcsError::SystemNotFound(_))));
        assert!(err.to_string().contains("Render"));
    }
}
