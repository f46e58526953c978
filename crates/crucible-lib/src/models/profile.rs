use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a profile tracks: the latest release, the latest snapshot, or a
/// pinned custom version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Release,
    Snapshot,
    Custom,
}

/// Window resolution override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

/// A user-configured launch target.
///
/// Profiles are persisted and edited by the outer launcher shell; the
/// launch core only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub kind: ProfileKind,

    /// Pinned version id. Only meaningful for custom profiles; release and
    /// snapshot profiles always follow the latest of their channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Working directory override for the spawned game.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_dir: Option<PathBuf>,

    /// Interpreter executable override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_dir: Option<PathBuf>,

    /// Extra interpreter arguments, as one shell-style string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_args: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<WindowSize>,
}

impl Profile {
    pub fn new(id: impl Into<String>, kind: ProfileKind) -> Self {
        Self {
            id: id.into(),
            kind,
            version: None,
            game_dir: None,
            java_dir: None,
            java_args: None,
            resolution: None,
        }
    }
}
