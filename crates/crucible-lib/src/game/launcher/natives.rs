//! Native library staging.
//!
//! Natives are extracted into a fresh launch-scoped directory that goes on
//! the process's native search path and is removed again on every exit
//! path of the launch.

use crate::game::launcher::classpath::library_path;
use crate::game::launcher::rules::native_classifier;
use crate::game::launcher::types::Platform;
use crate::game::launcher::version_parser::LibraryDescriptor;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Summary of one staging sweep.
#[derive(Debug, Default)]
pub struct StagingReport {
    /// The fresh launch-scoped directory. The caller owns its removal.
    pub staged_dir: PathBuf,

    /// Libraries extracted successfully.
    pub extracted: Vec<String>,

    /// Libraries skipped after an extraction failure, with the reason.
    pub failures: Vec<(String, String)>,
}

/// Remove leftover staging directories from earlier launches of this
/// version. Best-effort.
pub fn remove_stale_staging(version_dir: &Path) {
    let Ok(entries) = std::fs::read_dir(version_dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() && entry.file_name().to_string_lossy().contains("natives") {
            log::debug!("deleting old natives dir {path:?}");
            cleanup_staging(&path);
        }
    }
}

/// Extract every native library into a fresh uniquely-named directory
/// under the version's working area.
///
/// A single library's failure is logged, recorded in the report and
/// skipped; it never aborts staging of the remaining libraries.
pub fn stage_natives(
    natives: &[&LibraryDescriptor],
    data_dir: &Path,
    version_dir: &Path,
    version_id: &str,
    platform: &Platform,
) -> std::io::Result<StagingReport> {
    let suffix = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let staged_dir = version_dir.join(format!("{version_id}-natives-{suffix}"));
    std::fs::create_dir_all(&staged_dir)?;
    log::info!("using natives dir {staged_dir:?}");

    let mut report = StagingReport {
        staged_dir: staged_dir.clone(),
        ..Default::default()
    };

    for library in natives {
        match extract_native(library, data_dir, &staged_dir, platform) {
            Ok(()) => report.extracted.push(library.name.clone()),
            Err(err) => {
                log::warn!("failed to extract native {}: {err:#}", library.name);
                report.failures.push((library.name.clone(), format!("{err:#}")));
            }
        }
    }

    Ok(report)
}

fn extract_native(
    library: &LibraryDescriptor,
    data_dir: &Path,
    staged_dir: &Path,
    platform: &Platform,
) -> anyhow::Result<()> {
    let classifier = native_classifier(library, platform)
        .context("library has no native classifier for this platform")?;
    let relative = library_path(library, Some(&classifier))?;
    let archive_path = data_dir.join(relative);

    let file = std::fs::File::open(&archive_path)
        .with_context(|| format!("failed to open native archive {archive_path:?}"))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("failed to read native archive {archive_path:?}"))?;

    let exclusions = library
        .extract
        .as_ref()
        .map(|rules| rules.exclude.as_slice())
        .unwrap_or(&[]);

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let entry_name = entry.name().to_string();

        if entry.is_dir() || should_exclude(&entry_name, exclusions) {
            continue;
        }

        let target = staged_dir.join(&entry_name);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut output = std::fs::File::create(&target)?;
        std::io::copy(&mut entry, &mut output)?;
    }

    Ok(())
}

/// An archive entry is skipped when it starts with any exclusion prefix.
fn should_exclude(entry_name: &str, exclusions: &[String]) -> bool {
    exclusions.iter().any(|prefix| entry_name.starts_with(prefix))
}

/// Best-effort recursive removal of a staging directory. Failures are
/// logged and never propagate to the caller.
pub fn cleanup_staging(path: &Path) {
    if !path.exists() {
        return;
    }
    if let Err(err) = std::fs::remove_dir_all(path) {
        log::warn!("failed to delete natives dir {path:?}: {err}");
    }
}
