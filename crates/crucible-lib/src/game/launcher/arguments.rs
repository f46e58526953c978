/// Argument builder for the game process
use crate::game::launcher::classpath::join_classpath;
use crate::game::launcher::types::Platform;
use crate::game::launcher::version_parser::VersionDescriptor;
use crate::models::profile::Profile;
use crate::models::session::UserSession;
use dunce::canonicalize;
use std::path::{Path, PathBuf};

/// Main class of the bundled relaunch helper. The helper receives the
/// access token as a positional argument and re-invokes the real main
/// class, keeping the token out of the visible OS argument list.
pub const HELPER_MAIN_CLASS: &str = "net.crucible.helper.GameStarter";

/// Fixed account-type literal substituted into `${user_type}`.
const USER_TYPE: &str = "mojang";

/// Inputs the argument builder needs, resolved by the launch pipeline.
pub struct ArgumentContext<'a> {
    pub profile: &'a Profile,
    pub version: &'a VersionDescriptor,
    pub session: &'a UserSession,
    pub platform: Platform,
    pub working_dir: &'a Path,
    pub assets_dir: &'a Path,
    pub natives_dir: &'a Path,
    /// Classpath library paths ending with the version archive.
    pub classpath: &'a [PathBuf],
    pub helper_jar: Option<&'a Path>,
}

type PlaceholderResolver = fn(&ArgumentContext) -> String;

/// Template placeholder keys and their resolvers. Keys missing from this
/// table pass through verbatim, which is intentional: unknown placeholders
/// stay visible instead of silently vanishing.
const PLACEHOLDERS: &[(&str, PlaceholderResolver)] = &[
    ("auth_player_name", |ctx: &ArgumentContext| {
        ctx.session.display_name.clone()
    }),
    ("version_name", |ctx: &ArgumentContext| ctx.version.id.clone()),
    ("game_directory", |ctx: &ArgumentContext| {
        display_path(ctx.working_dir)
    }),
    ("assets_root", |ctx: &ArgumentContext| {
        display_path(ctx.assets_dir)
    }),
    ("game_assets", |ctx: &ArgumentContext| {
        display_path(ctx.assets_dir)
    }),
    ("assets_index_name", |ctx: &ArgumentContext| {
        ctx.version.asset_index_id().unwrap_or_default().to_string()
    }),
    ("auth_uuid", |ctx: &ArgumentContext| {
        ctx.session.profile_id.clone()
    }),
    ("auth_access_token", |ctx: &ArgumentContext| {
        ctx.session.access_token.clone()
    }),
    ("version_type", |ctx: &ArgumentContext| {
        ctx.version.kind.name().to_string()
    }),
    ("user_properties", |_: &ArgumentContext| "{}".to_string()),
    ("user_type", |_: &ArgumentContext| USER_TYPE.to_string()),
    ("auth_session", |ctx: &ArgumentContext| {
        format!(
            "token:{}:{}",
            ctx.session.access_token,
            ctx.session.profile_id.replace('-', "")
        )
    }),
];

/// Substitute `${key}` placeholders in one template token.
pub fn substitute_token(token: &str, ctx: &ArgumentContext) -> String {
    let mut result = token.to_string();
    for (key, resolver) in PLACEHOLDERS {
        let placeholder = format!("${{{key}}}");
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, &resolver(ctx));
        }
    }
    result
}

/// Assemble the full OS argument vector for the game process, interpreter
/// first.
pub fn build_command(ctx: &ArgumentContext) -> Vec<String> {
    let mut args = Vec::new();

    let java = match &ctx.profile.java_dir {
        Some(dir) => dir.clone(),
        None => PathBuf::from(ctx.platform.os.java_executable()),
    };
    args.push(java.to_string_lossy().into_owned());

    match ctx.profile.java_args.as_deref() {
        Some(custom) => args.extend(split_java_args(custom)),
        None => args.extend(default_java_args(&ctx.platform)),
    }

    args.push(format!(
        "-Djava.library.path={}",
        display_path(ctx.natives_dir)
    ));

    let hide_token = ctx.session.kind.hides_token();
    let use_helper = hide_token && ctx.helper_jar.is_some();
    if hide_token && !use_helper {
        log::warn!("no relaunch helper is bundled, the token stays on the command line");
    }

    args.push("-cp".to_string());
    let mut entries = Vec::with_capacity(ctx.classpath.len() + 1);
    if use_helper {
        if let Some(helper) = ctx.helper_jar {
            entries.push(helper.to_path_buf());
        }
    }
    entries.extend(ctx.classpath.iter().cloned());
    args.push(join_classpath(&entries, ctx.platform.os));

    let main_class = ctx.version.main_class.as_deref().unwrap_or_default();
    if use_helper {
        args.push(HELPER_MAIN_CLASS.to_string());
        args.push(display_path(ctx.working_dir));
        args.push(ctx.session.profile_id.clone());
        args.push(ctx.session.access_token.clone());
        args.push(main_class.to_string());
    } else {
        args.push(main_class.to_string());
    }

    if let Some(template) = &ctx.version.minecraft_arguments {
        for token in template.split_whitespace() {
            args.push(substitute_token(token, ctx));
        }
    }

    if let Some(resolution) = &ctx.profile.resolution {
        args.push("--width".to_string());
        args.push(resolution.width.to_string());
        args.push("--height".to_string());
        args.push(resolution.height.to_string());
    }

    args
}

/// Split a profile's interpreter-argument string, honoring quoting.
fn split_java_args(value: &str) -> Vec<String> {
    shlex::split(value)
        .unwrap_or_else(|| value.split_whitespace().map(str::to_string).collect())
}

/// Default interpreter flags when the profile supplies none. The legacy
/// 32-bit class gets a smaller heap ceiling.
fn default_java_args(platform: &Platform) -> Vec<String> {
    let heap = if platform.arch.is_legacy() {
        "-Xmx1G"
    } else {
        "-Xmx2G"
    };
    vec![heap.to_string(), "-Xmn128M".to_string()]
}

/// Canonicalized display form of a path, falling back to the raw path for
/// locations that don't exist yet.
fn display_path(path: &Path) -> String {
    canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::launcher::types::{Arch, OsType};
    use crate::game::launcher::version_parser::{AssetIndexRef, VersionKind};
    use crate::models::profile::{ProfileKind, WindowSize};
    use crate::models::session::AccountKind;
    use std::collections::BTreeMap;

    const LINUX64: Platform = Platform {
        os: OsType::Linux,
        arch: Arch::X64,
    };

    fn version(id: &str) -> VersionDescriptor {
        VersionDescriptor {
            id: id.to_string(),
            kind: VersionKind::Release,
            main_class: Some("net.minecraft.client.main.Main".to_string()),
            minecraft_arguments: None,
            assets: None,
            jar: None,
            asset_index: Some(AssetIndexRef {
                id: "legacy".to_string(),
                url: None,
                sha1: None,
                size: None,
                total_size: None,
            }),
            downloads: BTreeMap::new(),
            libraries: Vec::new(),
            inherits_from: None,
        }
    }

    fn session(kind: AccountKind) -> UserSession {
        UserSession {
            profile_id: "c06f8906-4c8a-4911-9c29-ea1dbd1aab82".to_string(),
            access_token: "tok".to_string(),
            display_name: "Alice".to_string(),
            kind,
        }
    }

    struct Fixture {
        profile: Profile,
        version: VersionDescriptor,
        session: UserSession,
        classpath: Vec<PathBuf>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                profile: Profile::new("default", ProfileKind::Release),
                version: version("1.7.10"),
                session: session(AccountKind::Mojang),
                classpath: vec![
                    PathBuf::from("/data/libraries/a.jar"),
                    PathBuf::from("/data/versions/1.7.10/1.7.10.jar"),
                ],
            }
        }

        fn ctx<'a>(&'a self, helper_jar: Option<&'a Path>) -> ArgumentContext<'a> {
            ArgumentContext {
                profile: &self.profile,
                version: &self.version,
                session: &self.session,
                platform: LINUX64,
                working_dir: Path::new("/data"),
                assets_dir: Path::new("/data/assets/virtual/legacy"),
                natives_dir: Path::new("/data/versions/1.7.10/1.7.10-natives-1"),
                classpath: &self.classpath,
                helper_jar,
            }
        }
    }

    #[test]
    fn substitutes_known_placeholders() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx(None);

        assert_eq!(substitute_token("${auth_player_name}", &ctx), "Alice");
        assert_eq!(substitute_token("--user", &ctx), "--user");
        assert_eq!(substitute_token("${version_type}", &ctx), "RELEASE");
        assert_eq!(substitute_token("${user_properties}", &ctx), "{}");
        assert_eq!(
            substitute_token("${auth_session}", &ctx),
            "token:tok:c06f89064c8a49119c29ea1dbd1aab82"
        );
    }

    #[test]
    fn unknown_placeholders_pass_through() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx(None);
        assert_eq!(
            substitute_token("${quickPlayPath}", &ctx),
            "${quickPlayPath}"
        );
    }

    #[test]
    fn template_yields_substituted_tokens() {
        let mut fixture = Fixture::new();
        fixture.version.minecraft_arguments =
            Some("--user ${auth_player_name} --version ${version_name}".to_string());

        let command = build_command(&fixture.ctx(None));
        let user_at = command.iter().position(|a| a == "--user").unwrap();
        assert_eq!(command[user_at + 1], "Alice");
        let version_at = command.iter().position(|a| a == "--version").unwrap();
        assert_eq!(command[version_at + 1], "1.7.10");
        assert!(!command.iter().any(|a| a.contains("${")));
    }

    #[test]
    fn default_memory_depends_on_arch_class() {
        let fixture = Fixture::new();
        let command = build_command(&fixture.ctx(None));
        assert_eq!(command[1], "-Xmx2G");
        assert_eq!(command[2], "-Xmn128M");

        let legacy = Platform {
            os: OsType::Linux,
            arch: Arch::X86,
        };
        let mut ctx = fixture.ctx(None);
        ctx.platform = legacy;
        let command = build_command(&ctx);
        assert_eq!(command[1], "-Xmx1G");
    }

    #[test]
    fn profile_java_args_override_defaults() {
        let mut fixture = Fixture::new();
        fixture.profile.java_args = Some("-Xmx6G \"-Dfoo=with space\"".to_string());

        let command = build_command(&fixture.ctx(None));
        assert_eq!(command[1], "-Xmx6G");
        assert_eq!(command[2], "-Dfoo=with space");
        assert!(!command.contains(&"-Xmx2G".to_string()));
    }

    #[test]
    fn direct_launch_uses_version_main_class() {
        let fixture = Fixture::new();
        let command = build_command(&fixture.ctx(None));

        let cp_at = command.iter().position(|a| a == "-cp").unwrap();
        assert_eq!(
            command[cp_at + 1],
            "/data/libraries/a.jar:/data/versions/1.7.10/1.7.10.jar"
        );
        assert_eq!(command[cp_at + 2], "net.minecraft.client.main.Main");
    }

    #[test]
    fn helper_launch_hides_the_token() {
        let mut fixture = Fixture::new();
        fixture.session = session(AccountKind::Crucible);
        let helper = PathBuf::from("/opt/crucible/helper.jar");

        let command = build_command(&fixture.ctx(Some(&helper)));

        let cp_at = command.iter().position(|a| a == "-cp").unwrap();
        assert!(command[cp_at + 1].starts_with("/opt/crucible/helper.jar:"));
        assert_eq!(command[cp_at + 2], HELPER_MAIN_CLASS);
        // Positional helper arguments: working dir, user id, token, real
        // main class.
        assert_eq!(command[cp_at + 4], "c06f8906-4c8a-4911-9c29-ea1dbd1aab82");
        assert_eq!(command[cp_at + 5], "tok");
        assert_eq!(command[cp_at + 6], "net.minecraft.client.main.Main");
    }

    #[test]
    fn crucible_account_without_helper_falls_back_to_direct() {
        let mut fixture = Fixture::new();
        fixture.session = session(AccountKind::Crucible);

        let command = build_command(&fixture.ctx(None));
        let cp_at = command.iter().position(|a| a == "-cp").unwrap();
        assert_eq!(command[cp_at + 2], "net.minecraft.client.main.Main");
    }

    #[test]
    fn resolution_flags_come_last() {
        let mut fixture = Fixture::new();
        fixture.profile.resolution = Some(WindowSize {
            width: 854,
            height: 480,
        });
        fixture.version.minecraft_arguments = Some("--demo".to_string());

        let command = build_command(&fixture.ctx(None));
        let n = command.len();
        assert_eq!(&command[n - 4..], ["--width", "854", "--height", "480"]);
    }
}
