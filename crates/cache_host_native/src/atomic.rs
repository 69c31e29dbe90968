use std::fs;
use std::path::Path;

/// Replaces `path` with `contents` by writing a sibling temp file and renaming it over.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), String> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);
    fs::write(tmp, contents).map_err(|err| format!("failed to write {}: {err}", tmp.display()))?;
    fs::rename(tmp, path).map_err(|err| {
        let _ = fs::remove_file(tmp);
        format!("failed to replace {}: {err}", path.display())
    })
}
