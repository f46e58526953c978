//! Pre-launch contract with the artifact downloader collaborator.

/// The launch core never transfers artifacts itself. Callers run the
/// downloader to completion and only then invoke
/// [`GameLauncher::launch`](crate::game::launcher::GameLauncher::launch),
/// which treats a verified on-disk layout as a precondition and does not
/// re-check artifact checksums (legacy asset virtualization excepted).
pub trait Downloader {
    /// Whether a download sweep is currently in progress.
    fn is_downloading(&self) -> bool;

    /// Block until the client archive, every applicable library and all
    /// asset objects are present and checksum-verified on disk, or fail.
    fn download(&self) -> anyhow::Result<()>;
}
