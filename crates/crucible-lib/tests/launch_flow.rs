//! End-to-end launch flow over a fabricated on-disk layout: inherited
//! version descriptors, a native archive, a legacy asset store and a
//! stand-in interpreter.

use crucible_lib::game::downloader::Downloader;
use crucible_lib::game::launcher::{
    classpath_entries, filter_libraries, GameLauncher, LaunchPaths, LaunchRequest, Platform,
    VersionCatalog,
};
use crucible_lib::models::{AccountKind, LaunchSettings, Profile, ProfileKind, UserSession};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Downloader stub standing in for the real transfer collaborator; the
/// launch flow runs it to completion before calling launch.
struct VerifiedLayout;

impl Downloader for VerifiedLayout {
    fn is_downloading(&self) -> bool {
        false
    }

    fn download(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

fn write_json(path: &Path, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

fn seed_versions(data_dir: &Path) {
    write_json(
        &data_dir.join("versions/1.7.10/1.7.10.json"),
        r#"{
            "id": "1.7.10",
            "type": "release",
            "mainClass": "net.minecraft.client.main.Main",
            "minecraftArguments": "--username ${auth_player_name} --version ${version_name} --assetsDir ${game_assets} --session ${auth_session}",
            "assets": "legacy",
            "libraries": [
                {"name": "com.google.guava:guava:15.0"},
                {
                    "name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.1",
                    "natives": {"linux": "natives-linux", "windows": "natives-windows"},
                    "extract": {"exclude": ["META-INF/"]}
                },
                {
                    "name": "ca.weblite:java-objc-bridge:1.0.0",
                    "rules": [{"action": "allow", "os": {"name": "osx"}}]
                }
            ]
        }"#,
    );
    write_json(
        &data_dir.join("versions/1.7.10-custom/1.7.10-custom.json"),
        r#"{
            "id": "1.7.10-custom",
            "type": "release",
            "inheritsFrom": "1.7.10",
            "jar": "1.7.10",
            "libraries": [{"name": "com.example:tweaker:0.9"}]
        }"#,
    );
}

fn seed_native_archive(data_dir: &Path) {
    let jar = data_dir
        .join("libraries/org/lwjgl/lwjgl/lwjgl-platform/2.9.1/lwjgl-platform-2.9.1-natives-linux.jar");
    std::fs::create_dir_all(jar.parent().unwrap()).unwrap();

    let file = std::fs::File::create(&jar).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    use zip::write::FileOptions;
    zip.start_file::<&str, ()>("liblwjgl64.so", FileOptions::default())
        .unwrap();
    zip.write_all(b"elf").unwrap();
    zip.start_file::<&str, ()>("META-INF/MANIFEST.MF", FileOptions::default())
        .unwrap();
    zip.write_all(b"manifest").unwrap();
    zip.finish().unwrap();
}

fn seed_legacy_assets(data_dir: &Path) {
    let assets_root = data_dir.join("assets");
    let content = b"pling";
    let tmp = assets_root.join("tmp");
    std::fs::create_dir_all(&assets_root).unwrap();
    std::fs::write(&tmp, content).unwrap();
    let hash = crucible_lib::utils::hash::file_sha1(&tmp).unwrap();
    std::fs::remove_file(&tmp).unwrap();

    let object = assets_root.join("objects").join(&hash[..2]).join(&hash);
    std::fs::create_dir_all(object.parent().unwrap()).unwrap();
    std::fs::write(&object, content).unwrap();

    write_json(
        &assets_root.join("indexes/legacy.json"),
        &format!(r#"{{"objects": {{"sound/pling.ogg": {{"hash": "{hash}", "size": 5}}}}}}"#),
    );
}

fn request(data_dir: &Path) -> LaunchRequest {
    let mut profile = Profile::new("integration", ProfileKind::Custom);
    profile.version = Some("1.7.10-custom".to_string());
    profile.java_dir = Some(PathBuf::from("/bin/sh"));
    profile.java_args = Some("-c 'exit 0'".to_string());

    LaunchRequest {
        paths: LaunchPaths::new(data_dir),
        profile,
        session: UserSession {
            profile_id: "c06f8906-4c8a-4911-9c29-ea1dbd1aab82".to_string(),
            access_token: "tok".to_string(),
            display_name: "Alice".to_string(),
            kind: AccountKind::Mojang,
        },
        latest_release: Some("1.7.10".to_string()),
        latest_snapshot: None,
        helper_jar: None,
    }
}

#[tokio::test]
async fn resolve_filter_and_classpath_pipeline() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tmp = TempDir::new().unwrap();
    seed_versions(tmp.path());

    let catalog = VersionCatalog::new(tmp.path().join("versions"));
    let version = catalog.resolve("1.7.10-custom").await.unwrap();

    assert_eq!(version.id, "1.7.10-custom");
    assert!(version.inherits_from.is_none());
    assert_eq!(
        version.main_class.as_deref(),
        Some("net.minecraft.client.main.Main")
    );
    // The jar alias points the boot archive at the parent's jar.
    assert_eq!(
        version.relative_jar(),
        Path::new("versions/1.7.10/1.7.10.jar")
    );

    let platform = Platform::current();
    let libraries = filter_libraries(&version.libraries, &platform);

    #[cfg(target_os = "linux")]
    {
        let classpath_names: Vec<&str> = libraries
            .classpath
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        // Child library first, the macOS-only bridge filtered out.
        assert_eq!(
            classpath_names,
            vec!["com.example:tweaker:0.9", "com.google.guava:guava:15.0"]
        );
        assert_eq!(libraries.natives.len(), 1);
    }

    let entries = classpath_entries(&libraries.classpath, tmp.path(), &version.relative_jar());
    assert_eq!(
        entries.last().unwrap(),
        &tmp.path().join("versions/1.7.10/1.7.10.jar")
    );
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn full_launch_flow_cleans_up_after_exit() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tmp = TempDir::new().unwrap();
    let data_dir = tmp.path();
    seed_versions(data_dir);
    seed_native_archive(data_dir);
    seed_legacy_assets(data_dir);

    // The transfer collaborator finishes before launch is allowed to run.
    let downloader = VerifiedLayout;
    assert!(!downloader.is_downloading());
    downloader.download().unwrap();

    let launcher = GameLauncher::new(LaunchSettings::default());
    launcher.launch(&request(data_dir)).await.unwrap();
    assert!(launcher.is_started());

    // Wait for the short-lived stand-in process to finish and tear down.
    for _ in 0..200 {
        if !launcher.is_started() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    }
    assert!(!launcher.is_started(), "launch never tore down");
    assert!(!launcher.is_running());
    assert!(!launcher.has_error());

    // Legacy assets were mirrored by name.
    let virtual_asset = data_dir.join("assets/virtual/legacy/sound/pling.ogg");
    assert_eq!(std::fs::read(&virtual_asset).unwrap(), b"pling");

    // Every launch-scoped natives directory is gone again.
    let version_dir = data_dir.join("versions/1.7.10-custom");
    let leftovers: Vec<_> = std::fs::read_dir(&version_dir)
        .unwrap()
        .flatten()
        .filter(|entry| {
            entry.path().is_dir()
                && entry.file_name().to_string_lossy().contains("natives")
        })
        .collect();
    assert!(leftovers.is_empty(), "staging directory survived the launch");
}
