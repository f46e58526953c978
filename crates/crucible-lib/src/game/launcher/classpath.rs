/// Classpath construction for the spawned game process
use crate::game::launcher::types::OsType;
use crate::game::launcher::version_parser::LibraryDescriptor;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Convert Maven coordinates to file path
/// Format: group:artifact:version[:classifier][@extension]
/// Example: "com.google.guava:guava:21.0" -> "com/google/guava/guava/21.0/guava-21.0.jar"
pub fn maven_to_path(coords: &str) -> Result<String> {
    let parts: Vec<&str> = coords.split(':').collect();

    if parts.len() < 3 {
        anyhow::bail!("invalid maven coordinates: {}", coords);
    }

    let group = parts[0].replace('.', "/");
    let artifact = parts[1];
    let mut version = parts[2];
    let mut classifier = None;
    let mut extension = "jar";

    if parts.len() == 3 {
        // group:artifact:version@extension
        if let Some((v, ext)) = version.split_once('@') {
            version = v;
            extension = ext;
        }
    } else if let Some((clf, ext)) = parts[3].split_once('@') {
        // group:artifact:version:classifier@extension
        classifier = Some(clf);
        extension = ext;
    } else {
        classifier = Some(parts[3]);
    }

    let filename = match classifier {
        Some(clf) => format!("{artifact}-{version}-{clf}.{extension}"),
        None => format!("{artifact}-{version}.{extension}"),
    };

    Ok(format!("{group}/{artifact}/{version}/{filename}"))
}

/// Installed path of a library artifact, relative to the working
/// directory. The native classifier is appended when given.
pub fn library_path(library: &LibraryDescriptor, classifier: Option<&str>) -> Result<PathBuf> {
    let coords = match classifier {
        Some(clf) => format!("{}:{}", library.name, clf),
        None => library.name.clone(),
    };
    Ok(Path::new("libraries").join(maven_to_path(&coords)?))
}

/// Absolute classpath entries for the filtered classpath libraries,
/// ending with the version's own archive. Entries keep declaration order.
pub fn classpath_entries(
    libraries: &[&LibraryDescriptor],
    data_dir: &Path,
    version_jar: &Path,
) -> Vec<PathBuf> {
    let mut entries = Vec::with_capacity(libraries.len() + 1);
    for library in libraries {
        match library_path(library, None) {
            Ok(relative) => entries.push(data_dir.join(relative)),
            Err(err) => log::warn!("skipping library with invalid coordinates: {err}"),
        }
    }
    entries.push(data_dir.join(version_jar));
    entries
}

/// Join classpath entries with the OS path separator.
pub fn join_classpath(entries: &[PathBuf], os: OsType) -> String {
    entries
        .iter()
        .map(|entry| entry.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(os.classpath_separator())
}
