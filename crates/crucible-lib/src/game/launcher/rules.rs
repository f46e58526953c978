/// OS/architecture applicability rules for library entries
use crate::game::launcher::types::Platform;
use crate::game::launcher::version_parser::{LibraryDescriptor, Rule, RuleAction};

/// Evaluate a library's rule set against the host platform.
///
/// An entry with no rules is always allowed. Otherwise rules apply in
/// declared order and the last matching rule's action wins; a rule with no
/// OS constraint matches every platform, which is how descriptors express
/// a default. When nothing matches the entry is excluded.
pub fn rules_allow(rules: Option<&[Rule]>, platform: &Platform) -> bool {
    let Some(rules) = rules else {
        return true;
    };

    let mut allow = false;
    for rule in rules {
        if rule_matches(rule, platform) {
            allow = matches!(rule.action, RuleAction::Allow);
        }
    }
    allow
}

fn rule_matches(rule: &Rule, platform: &Platform) -> bool {
    let Some(os) = &rule.os else {
        return true;
    };

    if let Some(name) = &os.name {
        if name != platform.os.as_str() {
            return false;
        }
    }

    if let Some(arch) = &os.arch {
        if !platform.arch.matches_rule(arch) {
            return false;
        }
    }

    true
}

/// Native classifier for the platform, `${arch}` expanded, when the
/// library ships platform natives.
pub fn native_classifier(library: &LibraryDescriptor, platform: &Platform) -> Option<String> {
    let natives = library.natives.as_ref()?;
    natives
        .get(platform.os.as_str())
        .map(|classifier| classifier.replace("${arch}", platform.arch.bits()))
}

/// Libraries applicable on one platform, split by linkage.
#[derive(Debug, Default)]
pub struct ResolvedLibraries<'a> {
    /// Linked through the classpath, in declaration order.
    pub classpath: Vec<&'a LibraryDescriptor>,

    /// Extracted into the native staging directory, in declaration order.
    pub natives: Vec<&'a LibraryDescriptor>,
}

/// Filter a version's libraries by platform applicability and classify
/// them, preserving declaration order within both subsets.
pub fn filter_libraries<'a>(
    libraries: &'a [LibraryDescriptor],
    platform: &Platform,
) -> ResolvedLibraries<'a> {
    let mut resolved = ResolvedLibraries::default();

    for library in libraries {
        if !rules_allow(library.rules.as_deref(), platform) {
            log::debug!("library {} does not apply on this platform", library.name);
            continue;
        }
        if native_classifier(library, platform).is_some() {
            resolved.natives.push(library);
        } else {
            resolved.classpath.push(library);
        }
    }

    resolved
}
