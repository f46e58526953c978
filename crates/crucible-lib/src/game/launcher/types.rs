/// Core types for game launching
use crate::game::launcher::version_parser::VersionError;
use crate::models::profile::Profile;
use crate::models::session::UserSession;
use std::path::PathBuf;

/// Operating system families the launcher can spawn the game on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsType {
    Windows,
    Linux,
    MacOS,
}

impl OsType {
    /// Detect the current OS
    pub fn current() -> Self {
        #[cfg(target_os = "windows")]
        return OsType::Windows;

        #[cfg(target_os = "macos")]
        return OsType::MacOS;

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        return OsType::Linux;
    }

    /// Get the OS name as a string (for rule matching)
    pub fn as_str(&self) -> &'static str {
        match self {
            OsType::Windows => "windows",
            OsType::Linux => "linux",
            OsType::MacOS => "osx",
        }
    }

    /// Get the classpath separator for this OS
    pub fn classpath_separator(&self) -> &'static str {
        match self {
            OsType::Windows => ";",
            _ => ":",
        }
    }

    /// Default interpreter executable when the profile supplies none.
    pub fn java_executable(&self) -> &'static str {
        match self {
            OsType::Windows => "javaw.exe",
            _ => "java",
        }
    }
}

/// Host processor architecture classes relevant to launching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86,
    X64,
    Arm32,
    Arm64,
}

impl Arch {
    /// Detect the current architecture
    pub fn current() -> Self {
        #[cfg(target_arch = "x86")]
        return Arch::X86;

        #[cfg(target_arch = "x86_64")]
        return Arch::X64;

        #[cfg(target_arch = "arm")]
        return Arch::Arm32;

        #[cfg(target_arch = "aarch64")]
        return Arch::Arm64;

        #[cfg(not(any(
            target_arch = "x86",
            target_arch = "x86_64",
            target_arch = "arm",
            target_arch = "aarch64"
        )))]
        compile_error!("Unsupported architecture");
    }

    /// Pointer-width bits used in `${arch}` classifier templates.
    pub fn bits(&self) -> &'static str {
        match self {
            Arch::X86 | Arch::Arm32 => "32",
            Arch::X64 | Arch::Arm64 => "64",
        }
    }

    /// The legacy 32-bit class gets a smaller default heap ceiling.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Arch::X86 | Arch::Arm32)
    }

    /// Match a descriptor rule's `arch` constraint against this host.
    pub fn matches_rule(&self, value: &str) -> bool {
        let normalized = match value {
            "x86" | "x32" => Arch::X86,
            "x64" | "amd64" | "x86_64" => Arch::X64,
            "arm" | "arm32" => Arch::Arm32,
            "arm64" | "aarch64" => Arch::Arm64,
            _ => return false,
        };
        *self == normalized
    }
}

/// The (OS, architecture) pair library rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: OsType,
    pub arch: Arch,
}

impl Platform {
    pub fn current() -> Self {
        Self {
            os: OsType::current(),
            arch: Arch::current(),
        }
    }
}

/// Filesystem layout rooted at the launcher working directory.
#[derive(Debug, Clone)]
pub struct LaunchPaths {
    pub data_dir: PathBuf,
}

impl LaunchPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Get the path to the libraries directory
    pub fn libraries_dir(&self) -> PathBuf {
        self.data_dir.join("libraries")
    }

    /// Get the path to the assets directory
    pub fn assets_dir(&self) -> PathBuf {
        self.data_dir.join("assets")
    }

    /// Get the path to the versions directory
    pub fn versions_dir(&self) -> PathBuf {
        self.data_dir.join("versions")
    }

    /// Working area of one installed version.
    pub fn version_dir(&self, id: &str) -> PathBuf {
        self.versions_dir().join(id)
    }
}

/// Everything the launch pipeline needs from the outer launcher shell.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub paths: LaunchPaths,
    pub profile: Profile,
    pub session: UserSession,

    /// Latest release id from the remote version manifest, if known.
    pub latest_release: Option<String>,

    /// Latest snapshot id from the remote version manifest, if known.
    pub latest_snapshot: Option<String>,

    /// Bundled relaunch helper archive, when the launcher ships one.
    pub helper_jar: Option<PathBuf>,
}

/// Fatal launch failures surfaced to the caller. Per-library and per-asset
/// problems are reported through staging/materialization reports instead.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("game is already running")]
    AlreadyRunning,

    #[error("no launchable version is available for profile {profile}")]
    NoLaunchableVersion { profile: String },

    #[error("version {id} declares no main class")]
    MissingMainClass { id: String },

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("failed to spawn game process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
