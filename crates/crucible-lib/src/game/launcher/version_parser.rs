/// Version descriptor parser with inheritance support
use crate::models::profile::{Profile, ProfileKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Errors surfaced while locating or resolving version descriptors.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("version descriptor not found for {id}")]
    NotFound { id: String },

    #[error("invalid version descriptor: {reason}")]
    Invalid { reason: String },

    #[error("cyclic inheritance detected while resolving {id}")]
    CyclicInheritance { id: String },

    #[error("failed to read version descriptor")]
    Io(#[from] std::io::Error),

    #[error("failed to parse version descriptor")]
    Parse(#[from] serde_json::Error),
}

/// Version release channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    Release,
    Snapshot,
    OldBeta,
    OldAlpha,
}

impl VersionKind {
    /// Upper-case channel name, the form substituted into `${version_type}`.
    pub fn name(&self) -> &'static str {
        match self {
            VersionKind::Release => "RELEASE",
            VersionKind::Snapshot => "SNAPSHOT",
            VersionKind::OldBeta => "OLD_BETA",
            VersionKind::OldAlpha => "OLD_ALPHA",
        }
    }
}

/// Asset index reference carried by a version descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexRef {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u64>,
}

impl AssetIndexRef {
    /// Legacy layouts are the only ones that need asset virtualization.
    pub fn is_legacy(&self) -> bool {
        self.id == crate::game::launcher::assets::LEGACY_INDEX_ID
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

/// Applicability rule for conditional library entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub action: RuleAction,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<OsRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractRules {
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Library declaration as it appears in a version descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    /// Maven coordinates
    pub name: String,

    /// Rules for conditional inclusion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,

    /// Native classifiers keyed by OS name, `${arch}` templated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natives: Option<HashMap<String, String>>,

    /// Extract rules for natives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractRules>,
}

/// Role of a downloadable artifact attached to a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactRole {
    Client,
    Server,
    WindowsServer,
}

impl ArtifactRole {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "client" => Some(ArtifactRole::Client),
            "server" => Some(ArtifactRole::Server),
            "windows_server" => Some(ArtifactRole::WindowsServer),
            _ => None,
        }
    }
}

/// A downloadable artifact. The downloader collaborator fetches and
/// verifies it; the launch core only reads the resulting file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadArtifact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Destination path relative to the launcher working directory.
    #[serde(default)]
    pub path: PathBuf,
}

/// Raw descriptor document as stored on disk, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionDocument {
    id: Option<String>,

    #[serde(rename = "type")]
    kind: Option<VersionKind>,

    main_class: Option<String>,

    /// Templated game argument line.
    minecraft_arguments: Option<String>,

    /// Assets id (legacy field, predates assetIndex).
    assets: Option<String>,

    /// Version id whose jar this version boots from.
    jar: Option<String>,

    asset_index: Option<AssetIndexRef>,

    downloads: Option<HashMap<String, DownloadArtifact>>,

    #[serde(default)]
    libraries: Vec<LibraryDescriptor>,

    inherits_from: Option<String>,
}

/// A version descriptor. After [`VersionCatalog::resolve`] the inheritance
/// chain is fully flattened and `inherits_from` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionDescriptor {
    pub id: String,
    pub kind: VersionKind,
    pub main_class: Option<String>,
    pub minecraft_arguments: Option<String>,
    pub assets: Option<String>,
    pub jar: Option<String>,
    pub asset_index: Option<AssetIndexRef>,
    pub downloads: BTreeMap<ArtifactRole, DownloadArtifact>,
    pub libraries: Vec<LibraryDescriptor>,
    pub inherits_from: Option<String>,
}

impl VersionDescriptor {
    /// Id whose on-disk jar this version boots from (`jar` may alias
    /// another installed version).
    pub fn jar_id(&self) -> &str {
        self.jar.as_deref().unwrap_or(&self.id)
    }

    /// `versions/<jar>/<jar>.jar`, relative to the working directory.
    pub fn relative_jar(&self) -> PathBuf {
        let id = self.jar_id();
        Path::new("versions").join(id).join(format!("{id}.jar"))
    }

    /// `versions/<id>/<id>.json`, relative to the working directory.
    pub fn relative_json(&self) -> PathBuf {
        Path::new("versions")
            .join(&self.id)
            .join(format!("{}.json", self.id))
    }

    /// Asset index id, falling back to the legacy `assets` field.
    pub fn asset_index_id(&self) -> Option<&str> {
        self.asset_index
            .as_ref()
            .map(|index| index.id.as_str())
            .or(self.assets.as_deref())
    }
}

/// Parse a version descriptor document from disk.
pub async fn parse_version_json(path: &Path) -> Result<VersionDescriptor, VersionError> {
    let content = tokio::fs::read_to_string(path).await?;
    let document: VersionDocument = serde_json::from_str(&content)?;
    promote(document)
}

/// Validate a raw document and fill derived fields.
fn promote(document: VersionDocument) -> Result<VersionDescriptor, VersionError> {
    let id = document.id.ok_or_else(|| VersionError::Invalid {
        reason: "descriptor has no id field".to_string(),
    })?;

    let kind = match document.kind {
        Some(kind) => kind,
        None => {
            log::warn!("version {id} has no type field, loading it as a release");
            VersionKind::Release
        }
    };

    let mut downloads = BTreeMap::new();
    if let Some(raw) = document.downloads {
        for (key, mut artifact) in raw {
            let Some(role) = ArtifactRole::from_key(&key) else {
                continue;
            };
            if artifact.path.as_os_str().is_empty() {
                artifact.path = default_artifact_path(&id, role);
            }
            downloads.insert(role, artifact);
        }
    }

    Ok(VersionDescriptor {
        id,
        kind,
        main_class: document.main_class,
        minecraft_arguments: document.minecraft_arguments,
        assets: document.assets,
        jar: document.jar,
        asset_index: document.asset_index,
        downloads,
        libraries: document.libraries,
        inherits_from: document.inherits_from,
    })
}

fn default_artifact_path(id: &str, role: ArtifactRole) -> PathBuf {
    let file = match role {
        ArtifactRole::Client => format!("{id}.jar"),
        ArtifactRole::Server => format!("{id}_server.jar"),
        ArtifactRole::WindowsServer => format!("{id}_server.exe"),
    };
    Path::new("versions").join(id).join(file)
}

/// Merge a child descriptor onto its parent. Child values win where
/// present; the result keeps the parent's own `inherits_from` so the walk
/// can continue up the chain.
pub(crate) fn merge_descriptors(
    mut parent: VersionDescriptor,
    child: VersionDescriptor,
) -> VersionDescriptor {
    parent.id = child.id;
    parent.kind = child.kind;

    if child.main_class.is_some() {
        parent.main_class = child.main_class;
    }
    if child.minecraft_arguments.is_some() {
        parent.minecraft_arguments = child.minecraft_arguments;
    }
    if child.assets.is_some() {
        parent.assets = child.assets;
    }
    if child.jar.is_some() {
        parent.jar = child.jar;
    }
    if child.asset_index.is_some() {
        parent.asset_index = child.asset_index;
    }

    // Child's declarations first, then parent entries it doesn't repeat.
    let mut libraries = child.libraries;
    for library in parent.libraries {
        if !libraries.contains(&library) {
            libraries.push(library);
        }
    }
    parent.libraries = libraries;

    // Child artifacts override per role, parent roles fill the gaps.
    for (role, artifact) in child.downloads {
        parent.downloads.insert(role, artifact);
    }

    parent
}

/// Locates version descriptors on disk and resolves their inheritance
/// chains into flattened [`VersionDescriptor`]s.
#[derive(Debug, Clone)]
pub struct VersionCatalog {
    versions_dir: PathBuf,
    latest_release: Option<String>,
    latest_snapshot: Option<String>,
}

impl VersionCatalog {
    pub fn new(versions_dir: impl Into<PathBuf>) -> Self {
        Self {
            versions_dir: versions_dir.into(),
            latest_release: None,
            latest_snapshot: None,
        }
    }

    /// Attach the latest channel ids from the remote version manifest.
    pub fn with_latest(
        mut self,
        latest_release: Option<String>,
        latest_snapshot: Option<String>,
    ) -> Self {
        self.latest_release = latest_release;
        self.latest_snapshot = latest_snapshot;
        self
    }

    /// Pick the version id a profile launches, following its tracking kind.
    pub fn version_for_profile(&self, profile: &Profile) -> Option<String> {
        match profile.kind {
            ProfileKind::Custom => profile
                .version
                .clone()
                .or_else(|| self.latest_release.clone()),
            ProfileKind::Release => self.latest_release.clone(),
            ProfileKind::Snapshot => self.latest_snapshot.clone(),
        }
    }

    /// Resolve `id` and flatten its inheritance chain.
    ///
    /// The walk keeps the set of ids already visited and fails with
    /// [`VersionError::CyclicInheritance`] instead of looping when a
    /// descriptor chain points back at itself.
    pub async fn resolve(&self, id: &str) -> Result<VersionDescriptor, VersionError> {
        let mut seen = HashSet::new();
        seen.insert(id.to_string());

        let mut resolved = self.load(id).await?;
        while let Some(parent_id) = resolved.inherits_from.take() {
            if !seen.insert(parent_id.clone()) {
                return Err(VersionError::CyclicInheritance { id: parent_id });
            }
            let parent = self.load(&parent_id).await?;
            resolved = merge_descriptors(parent, resolved);
        }

        // When the jar aliases another version, the client artifact lands
        // at the aliased jar path.
        if resolved.jar.is_some() {
            let jar_path = resolved.relative_jar();
            if let Some(client) = resolved.downloads.get_mut(&ArtifactRole::Client) {
                client.path = jar_path;
            }
        }

        Ok(resolved)
    }

    async fn load(&self, id: &str) -> Result<VersionDescriptor, VersionError> {
        let path = self.versions_dir.join(id).join(format!("{id}.json"));
        log::debug!("loading version descriptor {path:?}");
        if !path.exists() {
            return Err(VersionError::NotFound { id: id.to_string() });
        }
        parse_version_json(&path).await
    }
}
