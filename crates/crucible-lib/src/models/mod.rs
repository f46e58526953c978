pub mod profile;
pub mod session;
pub mod settings;

pub use profile::{Profile, ProfileKind, WindowSize};
pub use session::{AccountKind, UserSession};
pub use settings::LaunchSettings;
