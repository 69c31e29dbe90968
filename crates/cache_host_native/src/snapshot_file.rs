//! Directory-backed namespace snapshot store: `{root}/{namespace}.json` per namespace.

use std::fs;
use std::path::{Path, PathBuf};

use cache_host::{encode_snapshot, parse_snapshot, Snapshot, SnapshotStore};

use crate::atomic::write_atomic;

/// Checks that `namespace` is usable as a file stem.
///
/// # Errors
///
/// Returns an error for empty namespaces or characters outside ASCII alphanumerics, `.`, `_`
/// and `-`.
pub fn validate_namespace(namespace: &str) -> Result<(), String> {
    if namespace.is_empty() {
        return Err("Namespace must not be empty".to_string());
    }
    if namespace.starts_with('.') {
        return Err(format!("Namespace `{namespace}` must not start with `.`"));
    }
    if !namespace
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'))
    {
        return Err(format!(
            "Namespace `{namespace}` contains unsupported characters"
        ));
    }
    Ok(())
}

fn namespace_from_file_name(path: &Path) -> Option<String> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
        return None;
    }
    let stem = path.file_stem()?.to_string_lossy().to_string();
    validate_namespace(&stem).ok().map(|()| stem)
}

#[derive(Debug, Clone)]
/// Snapshot store rooted at a native directory.
pub struct FileSnapshotStore {
    root: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, String> {
        let root = root.as_ref();
        fs::create_dir_all(root)
            .map_err(|err| format!("failed to create cache dir {}: {err}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Root directory holding the namespace files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_file(&self, namespace: &str) -> Result<PathBuf, String> {
        validate_namespace(namespace)?;
        Ok(self.root.join(format!("{namespace}.json")))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load_snapshot(&self, namespace: &str) -> Result<Snapshot, String> {
        let path = self.namespace_file(namespace)?;
        if !path.exists() {
            return Ok(Snapshot::new());
        }
        let raw = fs::read_to_string(&path)
            .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
        parse_snapshot(&raw)
            .map_err(|err| format!("failed to parse snapshot {}: {err}", path.display()))
    }

    fn persist_snapshot(&self, namespace: &str, snapshot: &Snapshot) -> Result<(), String> {
        let path = self.namespace_file(namespace)?;
        let serialized = encode_snapshot(snapshot)
            .map_err(|err| format!("failed to serialize snapshot `{namespace}`: {err}"))?;
        write_atomic(&path, &serialized)
    }

    fn list_namespaces(&self) -> Result<Vec<String>, String> {
        let entries = fs::read_dir(&self.root)
            .map_err(|err| format!("failed to read {}: {err}", self.root.display()))?;

        let mut namespaces = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| format!("failed to read cache dir entry: {err}"))?
                .path();
            if let Some(namespace) = namespace_from_file_name(&path) {
                namespaces.push(namespace);
            }
        }
        namespaces.sort();
        Ok(namespaces)
    }
}

#[cfg(test)]
mod tests {
    use super::{namespace_from_file_name, validate_namespace, FileSnapshotStore};
    use cache_host::{Snapshot, SnapshotStore};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir_path(label: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "cache_host_native_{label}_{}_{}",
            process::id(),
            now
        ));
        fs::create_dir_all(&path).expect("create temp dir");
        path
    }

    #[test]
    fn validates_namespace_character_policy() {
        assert!(validate_namespace("default").is_ok());
        assert!(validate_namespace("work.v2").is_ok());
        assert!(validate_namespace("team_a-b").is_ok());
        assert!(validate_namespace("").is_err());
        assert!(validate_namespace("..").is_err());
        assert!(validate_namespace("a/b").is_err());
        assert!(validate_namespace("a b").is_err());
    }

    #[test]
    fn namespace_from_file_name_only_accepts_json_files() {
        assert_eq!(
            namespace_from_file_name(Path::new("/tmp/work.json")),
            Some("work".to_string())
        );
        assert_eq!(namespace_from_file_name(Path::new("/tmp/work.json.tmp")), None);
        assert_eq!(namespace_from_file_name(Path::new("/tmp/notes.txt")), None);
    }

    #[test]
    fn missing_namespace_loads_empty_snapshot() {
        let root = temp_dir_path("missing");
        let store = FileSnapshotStore::from_root(&root).expect("init store");
        assert!(store.load_snapshot("default").expect("load").is_empty());
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn snapshots_round_trip_per_namespace_and_list_sorted() {
        let root = temp_dir_path("round_trip");
        let store = FileSnapshotStore::from_root(&root).expect("init store");

        let mut default = Snapshot::new();
        default.insert("theme".to_string(), json!("dark"));
        default.insert("empty".to_string(), json!(null));
        let mut work = Snapshot::new();
        work.insert("theme".to_string(), json!("blue"));

        store.persist_snapshot("work", &work).expect("persist work");
        store
            .persist_snapshot("default", &default)
            .expect("persist default");

        assert_eq!(store.load_snapshot("default").expect("load"), default);
        assert_eq!(store.load_snapshot("work").expect("load"), work);
        assert_eq!(
            store.list_namespaces().expect("list"),
            vec!["default".to_string(), "work".to_string()]
        );
        assert!(!root.join("default.json.tmp").exists());

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn rejects_invalid_namespace_for_load_and_persist() {
        let root = temp_dir_path("invalid");
        let store = FileSnapshotStore::from_root(&root).expect("init store");

        let load_err = store
            .load_snapshot("../escape")
            .expect_err("invalid namespace load should fail");
        assert_eq!(load_err, "Namespace `../escape` must not start with `.`");
        store
            .persist_snapshot("a/b", &Snapshot::new())
            .expect_err("invalid namespace persist should fail");

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn reports_malformed_snapshot_parse_error() {
        let root = temp_dir_path("malformed");
        let path = root.join("default.json");
        fs::write(&path, "{\"bad\":").expect("write malformed snapshot");
        let store = FileSnapshotStore::from_root(&root).expect("init store");

        let err = store
            .load_snapshot("default")
            .expect_err("malformed snapshot should fail");
        assert!(
            err.starts_with(&format!("failed to parse snapshot {}:", path.display())),
            "unexpected error: {err}"
        );

        let _ = fs::remove_dir_all(root);
    }
}
