pub mod arguments;
pub mod assets;
pub mod classpath;
pub mod natives;
pub mod process;
pub mod rules;
/// Game launcher module: descriptor resolution through process supervision
pub mod types;
pub mod version_parser;

// Re-export commonly used types
pub use arguments::{build_command, substitute_token, ArgumentContext};
pub use assets::{materialize_legacy_assets, MaterializeReport};
pub use classpath::{classpath_entries, join_classpath, maven_to_path};
pub use natives::{cleanup_staging, remove_stale_staging, stage_natives, StagingReport};
pub use process::{GameLauncher, LaunchState, LogCallback, StreamSource};
pub use rules::{filter_libraries, native_classifier, rules_allow, ResolvedLibraries};
pub use types::{Arch, LaunchError, LaunchPaths, LaunchRequest, OsType, Platform};
pub use version_parser::{
    parse_version_json, AssetIndexRef, LibraryDescriptor, VersionCatalog, VersionDescriptor,
    VersionError, VersionKind,
};
