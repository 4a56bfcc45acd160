//! Game configuration.

use std::time::Duration;

/// Configuration for a single room's race rules.
///
/// Every room created by a registry shares the config the controller was
/// built with; there is no per-room override surface.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Maximum players allowed in a room.
    pub max_players: usize,

    /// How long a round runs before it is finished by timeout.
    pub round_duration: Duration,

    /// Whether a join is rejected when another member already uses the
    /// same nickname. Off by default.
    pub unique_names: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players: 10,
            round_duration: Duration::from_secs(60),
            unique_names: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_config_default() {
        let config = GameConfig::default();
        assert_eq!(config.max_players, 10);
        assert_eq!(config.round_duration, Duration::from_secs(60));
        assert!(!config.unique_names);
    }
}
