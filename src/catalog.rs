//! Catalog interpretation.
//!
//! Derives version, library, plugin and bundle entries from a parsed
//! [`Document`]. Nothing here is stored; entries are computed on demand
//! from the immutable document.

use std::collections::BTreeMap;

use crate::parser::{Document, Entry, Section, Value};

pub const VERSIONS: &str = "versions";
pub const LIBRARIES: &str = "libraries";
pub const PLUGINS: &str = "plugins";
pub const BUNDLES: &str = "bundles";

/// Keys of a rich version declaration that hold a literal version
const LITERAL_VERSION_KEYS: [&str; 4] = [
    "version",
    "version.strictly",
    "version.require",
    "version.prefer",
];

/// How an entry declares its version
#[derive(Debug, Clone, PartialEq)]
pub enum VersionSpec {
    Unspecified,
    Literal(String),
    /// `version.ref`, pointing into `[versions]`
    Ref(String),
}

impl VersionSpec {
    fn from_table(table: &BTreeMap<String, String>) -> Self {
        if let Some(reference) = table.get("version.ref") {
            return VersionSpec::Ref(reference.clone());
        }
        LITERAL_VERSION_KEYS
            .iter()
            .find_map(|key| table.get(*key))
            .map(|version| VersionSpec::Literal(version.clone()))
            .unwrap_or(VersionSpec::Unspecified)
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            VersionSpec::Ref(name) => Some(name),
            _ => None,
        }
    }
}

/// A library declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Library {
    pub name: String,
    /// `group:artifact` coordinate, if one could be derived
    pub module: Option<String>,
    pub version: VersionSpec,
    pub line: usize,
}

impl Library {
    /// Interpret a `[libraries]` entry
    ///
    /// Accepts `{ module = .. }`, `{ group = .., name = .. }` and the
    /// `"group:artifact:version"` short notation. Arrays are not libraries.
    pub fn from_entry(entry: &Entry) -> Option<Self> {
        let (module, version) = match &entry.value {
            Value::Table(table) => {
                let module = table.get("module").cloned().or_else(|| {
                    match (table.get("group"), table.get("name")) {
                        (Some(group), Some(name)) => Some(format!("{group}:{name}")),
                        _ => None,
                    }
                });
                (module, VersionSpec::from_table(table))
            }
            Value::Str(notation) => {
                let parts: Vec<&str> = notation.split(':').collect();
                match parts.as_slice() {
                    [group, artifact, version] => (
                        Some(format!("{group}:{artifact}")),
                        VersionSpec::Literal(version.to_string()),
                    ),
                    _ => (Some(notation.clone()), VersionSpec::Unspecified),
                }
            }
            Value::Array(_) => return None,
        };

        Some(Self {
            name: entry.key.clone(),
            module,
            version,
            line: entry.line,
        })
    }
}

/// A plugin declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Plugin {
    pub name: String,
    pub id: Option<String>,
    pub version: VersionSpec,
    pub line: usize,
}

impl Plugin {
    /// Interpret a `[plugins]` entry: `{ id = .. }` or `"id:version"`
    pub fn from_entry(entry: &Entry) -> Option<Self> {
        let (id, version) = match &entry.value {
            Value::Table(table) => (table.get("id").cloned(), VersionSpec::from_table(table)),
            Value::Str(notation) => match notation.split_once(':') {
                Some((id, version)) => (
                    Some(id.to_string()),
                    VersionSpec::Literal(version.to_string()),
                ),
                None => (Some(notation.clone()), VersionSpec::Unspecified),
            },
            Value::Array(_) => return None,
        };

        Some(Self {
            name: entry.key.clone(),
            id,
            version,
            line: entry.line,
        })
    }
}

fn unique_entries<'a>(document: &'a Document, section: &str) -> impl Iterator<Item = &'a Entry> {
    document
        .section(section)
        .into_iter()
        .flat_map(Section::unique_entries)
}

/// Libraries in declaration order, first definition of each key only
pub fn libraries(document: &Document) -> Vec<Library> {
    unique_entries(document, LIBRARIES)
        .filter_map(Library::from_entry)
        .collect()
}

/// Plugins in declaration order, first definition of each key only
pub fn plugins(document: &Document) -> Vec<Plugin> {
    unique_entries(document, PLUGINS)
        .filter_map(Plugin::from_entry)
        .collect()
}

/// Literal version strings carried by a `[versions]` value
///
/// A plain string yields itself, a rich version table yields each of its
/// values. Arrays carry no versions.
pub fn version_values(value: &Value) -> Vec<&str> {
    match value {
        Value::Str(version) => vec![version.as_str()],
        Value::Table(table) => table.values().map(String::as_str).collect(),
        Value::Array(_) => Vec::new(),
    }
}

/// Concrete version an entry resolves to, following `version.ref`
pub fn resolve_version(document: &Document, spec: &VersionSpec) -> Option<String> {
    match spec {
        VersionSpec::Unspecified => None,
        VersionSpec::Literal(version) => Some(version.clone()),
        VersionSpec::Ref(name) => {
            let value = document.section(VERSIONS)?.get(name)?;
            match value {
                Value::Str(version) => Some(version.clone()),
                Value::Table(table) => LITERAL_VERSION_KEYS
                    .iter()
                    .filter_map(|key| key.strip_prefix("version."))
                    .find_map(|key| table.get(key))
                    .cloned(),
                Value::Array(_) => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn entry(key: &str, value: Value) -> Entry {
        Entry {
            key: key.to_string(),
            value,
            line: 1,
        }
    }

    #[test]
    fn test_library_from_module_table() {
        let doc = parse("[libraries]\nbar = { module = \"com.x:bar\", version.ref = \"foo\" }").unwrap();
        let libs = libraries(&doc);

        assert_eq!(libs.len(), 1);
        assert_eq!(libs[0].module.as_deref(), Some("com.x:bar"));
        assert_eq!(libs[0].version, VersionSpec::Ref("foo".to_string()));
    }

    #[test]
    fn test_library_from_group_and_name() {
        let doc = parse("[libraries]\nbar = { group = \"com.x\", name = \"bar\", version = \"1.0\" }").unwrap();
        let libs = libraries(&doc);

        assert_eq!(libs[0].module.as_deref(), Some("com.x:bar"));
        assert_eq!(libs[0].version, VersionSpec::Literal("1.0".to_string()));
    }

    #[test]
    fn test_library_short_notation() {
        let lib = Library::from_entry(&entry("gson", Value::Str("com.google.code.gson:gson:2.10".into())))
            .unwrap();

        assert_eq!(lib.module.as_deref(), Some("com.google.code.gson:gson"));
        assert_eq!(lib.version, VersionSpec::Literal("2.10".to_string()));
    }

    #[test]
    fn test_array_is_not_a_library() {
        assert!(Library::from_entry(&entry("bad", Value::Array(vec![]))).is_none());
    }

    #[test]
    fn test_plugin_short_notation() {
        let plugin = Plugin::from_entry(&entry("kt", Value::Str("org.jetbrains.kotlin.jvm:1.9.22".into())))
            .unwrap();

        assert_eq!(plugin.id.as_deref(), Some("org.jetbrains.kotlin.jvm"));
        assert_eq!(plugin.version, VersionSpec::Literal("1.9.22".to_string()));
    }

    #[test]
    fn test_rich_version_ref_flattened() {
        let doc = parse("[plugins]\nk = { id = \"a.b\", version = { ref = \"kotlin\" } }").unwrap();
        assert_eq!(plugins(&doc)[0].version.reference(), Some("kotlin"));
    }

    #[test]
    fn test_resolve_version_through_ref() {
        let doc = parse("[versions]\njunit = \"4.11\"\nrich = { strictly = \"2.0\" }").unwrap();

        assert_eq!(
            resolve_version(&doc, &VersionSpec::Ref("junit".to_string())),
            Some("4.11".to_string())
        );
        assert_eq!(
            resolve_version(&doc, &VersionSpec::Ref("rich".to_string())),
            Some("2.0".to_string())
        );
        assert_eq!(resolve_version(&doc, &VersionSpec::Ref("missing".to_string())), None);
    }

    #[test]
    fn test_duplicate_library_uses_first_definition() {
        let doc = parse("[libraries]\nfoo = \"a.b:one\"\nfoo = \"a.b:two\"").unwrap();
        let libs = libraries(&doc);

        assert_eq!(libs.len(), 1);
        assert_eq!(libs[0].module.as_deref(), Some("a.b:one"));
    }
}
