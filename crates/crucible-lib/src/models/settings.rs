use serde::{Deserialize, Serialize};

/// Read-only feature flags supplied by the settings collaborator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LaunchSettings {
    /// Forward live game output to the attached log consumer.
    #[serde(default)]
    pub show_game_log: bool,
}
