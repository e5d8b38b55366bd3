//! Validation Passes
//!
//! Each pass reads the immutable document and appends findings. Passes do
//! not depend on each other's output.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::{self, BUNDLES, LIBRARIES, PLUGINS, VERSIONS, Library};
use crate::parser::Document;
use crate::rules::RuleSet;
use crate::validation::engine::ValidationResult;

/// Signature shared by every pass
pub type Pass = fn(&Document, &RuleSet, &mut ValidationResult);

/// All passes, in execution order
pub const PASSES: [(&str, Pass); 10] = [
    ("required-sections", check_required_sections),
    ("version-format", check_version_format),
    ("duplicate-keys", check_duplicate_keys),
    ("version-references", check_version_references),
    ("module-format", check_module_format),
    ("plugin-id-format", check_plugin_ids),
    ("version-compatibility", check_compatibility),
    ("vulnerable-versions", check_vulnerable_versions),
    ("bundle-references", check_bundle_references),
    ("critical-dependencies", check_critical_dependencies),
];

const REQUIRED_SECTIONS: [&str; 2] = [VERSIONS, LIBRARIES];

/// `1.2.3`, `1.0.0-alpha01`, `1.+`, `[1.0,2.0)`
static VERSION_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    let version = r"\d+(?:\.\d+)*(?:[-+][0-9A-Za-z][0-9A-Za-z.+-]*)?";
    let wildcard = r"\d+(?:\.\d+)*\.\+";
    // at least one bound; empty ones may come before or after it
    let range = format!(r"[\[(]\s*(?:,\s*)*(?:{version})\s*(?:,\s*(?:{version})?\s*)*[\])]");
    Regex::new(&format!("^(?:{version}|{wildcard}|{range})$")).expect("static regex")
});

/// `group(.subgroup)+:artifact`
static MODULE_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)+:[A-Za-z0-9_.-]+$").expect("static regex")
});

/// `segment(.segment)+`
static PLUGIN_ID_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)+$").expect("static regex")
});

fn display_section(name: &str) -> &str {
    if name.is_empty() { "(root)" } else { name }
}

/// `[versions]` and `[libraries]` must exist and hold entries
pub fn check_required_sections(document: &Document, _: &RuleSet, result: &mut ValidationResult) {
    for name in REQUIRED_SECTIONS {
        match document.section(name) {
            None => result.add_error(format!("Missing required section [{}]", name)),
            Some(section) if section.is_empty() => {
                result.add_error(format!("Required section [{}] is empty", name))
            }
            Some(_) => {}
        }
    }
}

/// Every `[versions]` value must look like a version, wildcard or range
pub fn check_version_format(document: &Document, _: &RuleSet, result: &mut ValidationResult) {
    let Some(versions) = document.section(VERSIONS) else {
        return;
    };

    for entry in &versions.entries {
        let values = catalog::version_values(&entry.value);
        if values.is_empty() {
            result.add_error(format!(
                "Invalid version format for '{}': expected a version string",
                entry.key
            ));
            continue;
        }
        for version in values {
            if !VERSION_FORMAT.is_match(version) {
                result.add_error(format!(
                    "Invalid version format for '{}': '{}'",
                    entry.key, version
                ));
            }
        }
    }
}

/// Repeated keys within a section; the first occurrence is not reported
pub fn check_duplicate_keys(document: &Document, _: &RuleSet, result: &mut ValidationResult) {
    for section in &document.sections {
        let mut seen = HashSet::new();
        for entry in &section.entries {
            if !seen.insert(entry.key.as_str()) {
                result.add_error(format!(
                    "Duplicate key '{}' in section [{}] (line {})",
                    entry.key,
                    display_section(&section.name),
                    entry.line
                ));
            }
        }
    }
}

/// Every `version.ref` must resolve; unreferenced versions are advisory
pub fn check_version_references(document: &Document, _: &RuleSet, result: &mut ValidationResult) {
    let versions = document.section(VERSIONS);
    let defined = |name: &str| versions.is_some_and(|section| section.contains_key(name));

    let library_refs = catalog::libraries(document)
        .into_iter()
        .map(|lib| ("library", lib.name, lib.version));
    let plugin_refs = catalog::plugins(document)
        .into_iter()
        .map(|plugin| ("plugin", plugin.name, plugin.version));

    let mut used = HashSet::new();
    for (kind, name, spec) in library_refs.chain(plugin_refs) {
        let Some(reference) = spec.reference() else {
            continue;
        };
        if !defined(reference) {
            result.add_error(format!(
                "Undefined version reference '{}' in {} '{}'",
                reference, kind, name
            ));
        }
        used.insert(reference.to_string());
    }

    let Some(versions) = versions else {
        return;
    };
    for entry in versions.unique_entries() {
        if !used.contains(&entry.key) {
            result.add_warning(format!(
                "Unused version '{}' is not referenced by any library or plugin",
                entry.key
            ));
        }
    }
}

/// Library coordinates must be `group.name:artifact`
pub fn check_module_format(document: &Document, _: &RuleSet, result: &mut ValidationResult) {
    let Some(libraries) = document.section(LIBRARIES) else {
        return;
    };

    for entry in libraries.unique_entries() {
        match Library::from_entry(entry).map(|lib| lib.module) {
            None => result.add_error(format!(
                "Library '{}' must be an inline table or a coordinate string",
                entry.key
            )),
            Some(None) => result.add_error(format!(
                "Library '{}' has no module coordinate",
                entry.key
            )),
            Some(Some(module)) if !MODULE_FORMAT.is_match(&module) => {
                result.add_error(format!(
                    "Invalid module format for library '{}': '{}' (expected group.name:artifact)",
                    entry.key, module
                ))
            }
            Some(Some(_)) => {}
        }
    }
}

/// Plugin ids must be dotted identifiers
pub fn check_plugin_ids(document: &Document, _: &RuleSet, result: &mut ValidationResult) {
    let Some(plugins) = document.section(PLUGINS) else {
        return;
    };

    for entry in plugins.unique_entries() {
        match catalog::Plugin::from_entry(entry).map(|plugin| plugin.id) {
            None => result.add_error(format!(
                "Plugin '{}' must be an inline table or an id string",
                entry.key
            )),
            Some(None) => result.add_error(format!("Plugin '{}' has no id", entry.key)),
            Some(Some(id)) if !PLUGIN_ID_FORMAT.is_match(&id) => result.add_error(format!(
                "Invalid plugin id format for plugin '{}': '{}'",
                entry.key, id
            )),
            Some(Some(_)) => {}
        }
    }
}

/// Known-incompatible version pairs from the rule set
pub fn check_compatibility(document: &Document, rules: &RuleSet, result: &mut ValidationResult) {
    for rule in rules.compatibility_rules() {
        let Some((first, second)) = rule.violation(document) else {
            continue;
        };
        let mut message = format!(
            "Incompatible versions ({}): {} {} cannot be used with {} {}",
            rule.name, rule.when.key, first, rule.conflicts_with.key, second
        );
        if let Some(detail) = &rule.message {
            message.push_str(". ");
            message.push_str(detail);
        }
        result.add_error(message);
    }
}

/// Libraries resolving to a version with a known advisory
pub fn check_vulnerable_versions(document: &Document, rules: &RuleSet, result: &mut ValidationResult) {
    for lib in catalog::libraries(document) {
        let Some(module) = lib.module.as_deref() else {
            continue;
        };
        let Some(vulnerable) = rules.vulnerable_module(module) else {
            continue;
        };
        let Some(version) = catalog::resolve_version(document, &lib.version) else {
            continue;
        };

        if vulnerable.is_vulnerable(&version) {
            let advisory = vulnerable
                .advisory
                .as_deref()
                .map(|id| format!(" ({})", id))
                .unwrap_or_default();
            result.add_warning(format!(
                "Library '{}' ({}) uses known vulnerable version {}{}",
                lib.name, module, version, advisory
            ));
        }
    }
}

/// Bundle members must name `[libraries]` keys
pub fn check_bundle_references(document: &Document, _: &RuleSet, result: &mut ValidationResult) {
    let Some(bundles) = document.section(BUNDLES) else {
        return;
    };
    let libraries = document.section(LIBRARIES);

    for entry in bundles.unique_entries() {
        let Some(members) = entry.value.as_array() else {
            result.add_error(format!(
                "Bundle '{}' must be an array of library keys",
                entry.key
            ));
            continue;
        };

        for member in members {
            if !libraries.is_some_and(|section| section.contains_key(member)) {
                result.add_error(format!(
                    "Invalid bundle reference '{}' in bundle '{}'",
                    member, entry.key
                ));
            }
        }
    }
}

/// One warning listing every critical module missing from the catalog
pub fn check_critical_dependencies(
    document: &Document,
    rules: &RuleSet,
    result: &mut ValidationResult,
) {
    let critical = rules.critical();
    if critical.modules.is_empty() {
        return;
    }

    let modules: Vec<String> = catalog::libraries(document)
        .into_iter()
        .filter_map(|lib| lib.module)
        .collect();
    let any_module_contains = |needle: &str| modules.iter().any(|m| m.contains(needle));

    let trigger = &critical.trigger;
    let applies = trigger.is_empty()
        || trigger.versions.iter().any(|key| {
            document
                .section(VERSIONS)
                .is_some_and(|section| section.contains_key(key))
        })
        || trigger.modules.iter().any(|needle| any_module_contains(needle.as_str()));
    if !applies {
        return;
    }

    let missing: Vec<&str> = critical
        .modules
        .iter()
        .map(String::as_str)
        .filter(|needle| !any_module_contains(*needle))
        .collect();

    if !missing.is_empty() {
        result.add_warning(format!(
            "Missing critical dependencies: {}",
            missing.join(", ")
        ));
    }
}
