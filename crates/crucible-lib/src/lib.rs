//! Launch core for the Crucible launcher.
//!
//! Resolves inheritance-chained version descriptors, filters libraries by
//! platform applicability, virtualizes legacy asset layouts, stages native
//! dependencies into a launch-scoped directory, assembles the process
//! command line and supervises the spawned game.

pub mod game;
pub mod models;
pub mod utils;

pub use game::launcher::{GameLauncher, LaunchError, LaunchPaths, LaunchRequest};
pub use models::{AccountKind, LaunchSettings, Profile, ProfileKind, UserSession};
