//! Legacy virtual asset materialization.
//!
//! Old version layouts address assets by logical name instead of by hash.
//! For those, the content-addressed store under `assets/objects` is
//! mirrored into a name-addressed tree under `assets/virtual/legacy`
//! before launch.

use crate::utils::hash::sha1_matches;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Asset index id that triggers virtualization.
pub const LEGACY_INDEX_ID: &str = "legacy";

#[derive(Debug, Deserialize)]
struct AssetIndexDocument {
    objects: BTreeMap<String, AssetObject>,
}

#[derive(Debug, Deserialize)]
struct AssetObject {
    hash: String,
    #[serde(default)]
    size: u64,
}

/// Summary of one materialization sweep.
#[derive(Debug, Default)]
pub struct MaterializeReport {
    /// Root of the name-addressed tree handed to the game.
    pub virtual_dir: PathBuf,

    /// Entries copied from the object store this run.
    pub copied: usize,

    /// Entries whose checksum already matched.
    pub reused: usize,

    /// Entries that could not be materialized, with the reason. The
    /// launch proceeds with whatever is available.
    pub failures: Vec<(String, String)>,
}

/// Mirror the legacy asset index into `assets/virtual/legacy`.
///
/// Idempotent: entries whose on-disk checksum already matches are left
/// untouched, so a second sweep over unchanged inputs copies nothing.
/// Individual copy failures are recorded and skipped.
pub async fn materialize_legacy_assets(assets_root: &Path) -> anyhow::Result<MaterializeReport> {
    let virtual_dir = assets_root.join("virtual").join(LEGACY_INDEX_ID);
    tokio::fs::create_dir_all(&virtual_dir).await?;

    let index_path = assets_root
        .join("indexes")
        .join(format!("{LEGACY_INDEX_ID}.json"));
    let content = tokio::fs::read_to_string(&index_path)
        .await
        .with_context(|| format!("failed to read asset index {index_path:?}"))?;
    let index: AssetIndexDocument = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse asset index {index_path:?}"))?;

    log::info!("building virtual asset folder at {virtual_dir:?}");
    let mut report = MaterializeReport {
        virtual_dir: virtual_dir.clone(),
        ..Default::default()
    };

    for (name, object) in &index.objects {
        let target = virtual_dir.join(name);
        if sha1_matches(&target, &object.hash) {
            report.reused += 1;
            continue;
        }

        log::debug!("copying asset {name} ({} bytes)", object.size);
        match copy_object(assets_root, &object.hash, &target).await {
            Ok(()) => report.copied += 1,
            Err(err) => {
                log::warn!("failed to materialize asset {name}: {err:#}");
                report.failures.push((name.clone(), format!("{err:#}")));
            }
        }
    }

    log::info!(
        "virtual asset folder ready: {} copied, {} reused, {} failed",
        report.copied,
        report.reused,
        report.failures.len()
    );
    Ok(report)
}

async fn copy_object(assets_root: &Path, hash: &str, target: &Path) -> anyhow::Result<()> {
    if hash.len() < 2 {
        anyhow::bail!("malformed object hash {hash:?}");
    }
    let object = assets_root.join("objects").join(&hash[..2]).join(hash);

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    // The target may hold a stale file with a mismatched checksum; copy
    // replaces it.
    tokio::fs::copy(&object, target)
        .await
        .with_context(|| format!("failed to copy object {object:?}"))?;
    Ok(())
}
