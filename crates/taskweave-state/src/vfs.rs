//! In-memory versioned virtual filesystem.
//!
//! Every mutation funnels through [`Vfs::write`], the single choke point
//! where versions are stamped and prior content is pushed to history. That
//! is what keeps the filesystem auditable and safe to expose to concurrently
//! reasoning subagents: each subagent works on its own copy, and merges
//! re-enter through `write` so parent version numbering stays monotonic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use taskweave_core::{WeaveError, WeaveResult};

/// One prior snapshot of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVersion {
    /// The version number this snapshot held when it was current.
    pub version: u32,
    /// The content at that version.
    pub content: String,
    /// When that version was written.
    pub modified_at: DateTime<Utc>,
}

/// A file in the virtual filesystem.
///
/// Invariants: `version` strictly increases on every write and
/// `history.len() == version - 1`. Size is derived from content, never
/// stored, so it can never go stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Normalized absolute path of the file.
    pub path: String,
    /// Current content.
    pub content: String,
    /// Current version, starting at 1.
    pub version: u32,
    /// When the file was first written.
    pub created_at: DateTime<Utc>,
    /// When the current version was written.
    pub modified_at: DateTime<Utc>,
    /// All prior versions, oldest first.
    pub history: Vec<FileVersion>,
}

impl FileRecord {
    /// Content length in bytes, recomputed on every call.
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// A directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Normalized absolute path.
    pub path: String,
    /// Current content length in bytes.
    pub size: usize,
    /// When the file was last written.
    pub modified_at: DateTime<Utc>,
}

/// Resolve `path` against `base`, collapsing `.` and `..` segments.
fn normalize(base: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    };
    let mut segments: Vec<&str> = Vec::new();
    for seg in joined.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// The parent directory of a normalized absolute path.
fn parent_of(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Versioned, in-memory key-value file store with a hierarchical namespace.
///
/// The namespace is a set of normalized absolute paths, so sibling names are
/// unique and cycles are structurally impossible. A per-session current
/// directory cursor resolves relative paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vfs {
    files: BTreeMap<String, FileRecord>,
    directories: BTreeSet<String>,
    current_directory: String,
}

impl Default for Vfs {
    fn default() -> Self {
        let mut directories = BTreeSet::new();
        directories.insert("/".to_string());
        Self {
            files: BTreeMap::new(),
            directories,
            current_directory: "/".to_string(),
        }
    }
}

impl Vfs {
    /// Creates an empty filesystem rooted at `/`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a path against the current directory.
    pub fn resolve(&self, path: &str) -> String {
        normalize(&self.current_directory, path)
    }

    /// Register a directory and any missing parents.
    fn register_dirs(&mut self, dir: &str) {
        let mut current = dir.to_string();
        while self.directories.insert(current.clone()) && current != "/" {
            current = parent_of(&current);
        }
    }

    /// Write `content` to `path`, creating the file at version 1 or bumping
    /// the version and pushing the prior content to history.
    ///
    /// Never fails on valid path input; parent directories are registered
    /// automatically. Returns the up-to-date record.
    pub fn write(&mut self, path: &str, content: impl Into<String>) -> &FileRecord {
        let path = self.resolve(path);
        let content = content.into();
        let now = Utc::now();
        self.register_dirs(&parent_of(&path));

        match self.files.get_mut(&path) {
            Some(record) => {
                record.history.push(FileVersion {
                    version: record.version,
                    content: std::mem::replace(&mut record.content, content),
                    modified_at: record.modified_at,
                });
                record.version += 1;
                record.modified_at = now;
            }
            None => {
                self.files.insert(
                    path.clone(),
                    FileRecord {
                        path: path.clone(),
                        content,
                        version: 1,
                        created_at: now,
                        modified_at: now,
                        history: Vec::new(),
                    },
                );
            }
        }
        // Just inserted or updated above.
        &self.files[&path]
    }

    /// Current content of `path`, or `NotFound` if it was never written.
    pub fn read(&self, path: &str) -> WeaveResult<&str> {
        let path = self.resolve(path);
        self.files
            .get(&path)
            .map(|r| r.content.as_str())
            .ok_or(WeaveError::NotFound(path))
    }

    /// The full record for `path`, or `NotFound`.
    pub fn record(&self, path: &str) -> WeaveResult<&FileRecord> {
        let path = self.resolve(path);
        self.files.get(&path).ok_or(WeaveError::NotFound(path))
    }

    /// Prior versions of `path`, oldest first, or `NotFound`.
    pub fn history(&self, path: &str) -> WeaveResult<&[FileVersion]> {
        self.record(path).map(|r| r.history.as_slice())
    }

    /// Non-recursive listing of the files directly inside `dir`
    /// (the current directory when `None`).
    pub fn list(&self, dir: Option<&str>) -> Vec<FileEntry> {
        let dir = dir.map_or_else(|| self.current_directory.clone(), |d| self.resolve(d));
        self.files
            .values()
            .filter(|r| parent_of(&r.path) == dir)
            .map(|r| FileEntry {
                path: r.path.clone(),
                size: r.size(),
                modified_at: r.modified_at,
            })
            .collect()
    }

    /// Subdirectories directly inside `dir`.
    pub fn subdirectories(&self, dir: Option<&str>) -> Vec<String> {
        let dir = dir.map_or_else(|| self.current_directory.clone(), |d| self.resolve(d));
        self.directories
            .iter()
            .filter(|d| d.as_str() != "/" && parent_of(d) == dir)
            .cloned()
            .collect()
    }

    /// Every file path in the filesystem, in sorted order (the enhanced,
    /// recursive listing).
    pub fn paths(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Copy `src`'s current content to `dst` as a fresh version-1 file.
    /// The copy does not share version history with `src`.
    pub fn copy(&mut self, src: &str, dst: &str) -> WeaveResult<FileRecord> {
        let content = self.read(src)?.to_string();
        // dst goes through `write`: a fresh path starts at version 1, an
        // existing path keeps its own lineage.
        Ok(self.write(dst, content).clone())
    }

    /// Create a directory (and any missing parents) in the namespace tree.
    /// Returns the normalized path and whether it was newly created.
    pub fn mkdir(&mut self, path: &str) -> (String, bool) {
        let path = self.resolve(path);
        let created = !self.directories.contains(&path);
        self.register_dirs(&path);
        (path, created)
    }

    /// Whether a directory exists in the namespace.
    pub fn dir_exists(&self, path: &str) -> bool {
        self.directories.contains(&self.resolve(path))
    }

    /// Whether a file exists.
    pub fn exists(&self, path: &str) -> bool {
        self.files.contains_key(&self.resolve(path))
    }

    /// Change the current directory cursor. Fails with `NotFound` if the
    /// target directory was never created.
    pub fn cd(&mut self, path: &str) -> WeaveResult<&str> {
        let target = self.resolve(path);
        if !self.directories.contains(&target) {
            return Err(WeaveError::NotFound(target));
        }
        self.current_directory = target;
        Ok(&self.current_directory)
    }

    /// The current directory cursor.
    pub fn pwd(&self) -> &str {
        &self.current_directory
    }

    /// Number of files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Records in `self` that are new or changed relative to `base`.
    ///
    /// Used to extract a subagent's file deltas: the child's filesystem is
    /// diffed against the copy it started from.
    pub fn diff(&self, base: &Vfs) -> BTreeMap<String, FileRecord> {
        self.files
            .iter()
            .filter(|(path, record)| {
                !base
                    .files
                    .get(*path)
                    .is_some_and(|b| b.version == record.version && b.content == record.content)
            })
            .map(|(path, record)| (path.clone(), record.clone()))
            .collect()
    }

    /// Merge file deltas from a child run, last write per path winning.
    ///
    /// Each delta re-enters through [`Vfs::write`], so a path the parent
    /// already advanced keeps strictly increasing version numbers.
    pub fn merge(&mut self, deltas: BTreeMap<String, FileRecord>) {
        for (path, record) in deltas {
            self.write(&path, record.content);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let mut vfs = Vfs::new();
        vfs.write("/a.txt", "v1");
        assert_eq!(vfs.read("/a.txt").unwrap(), "v1");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let vfs = Vfs::new();
        assert!(matches!(
            vfs.read("/missing.txt"),
            Err(WeaveError::NotFound(_))
        ));
    }

    #[test]
    fn test_version_monotonicity_and_history_length() {
        let mut vfs = Vfs::new();
        for i in 1..=5 {
            let record = vfs.write("/a.txt", format!("v{i}"));
            assert_eq!(record.version, i);
            assert_eq!(record.history.len() as u32, i - 1);
        }
    }

    #[test]
    fn test_version_bumps_even_on_identical_content() {
        let mut vfs = Vfs::new();
        vfs.write("/a.txt", "same");
        let record = vfs.write("/a.txt", "same");
        assert_eq!(record.version, 2);
        assert_eq!(record.history.len(), 1);
    }

    #[test]
    fn test_history_scenario() {
        // write v1, write v2 -> history is [(1, "v1")], read returns "v2"
        let mut vfs = Vfs::new();
        vfs.write("/a.txt", "v1");
        vfs.write("/a.txt", "v2");

        let history = vfs.history("/a.txt").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].version, 1);
        assert_eq!(history[0].content, "v1");
        assert_eq!(vfs.read("/a.txt").unwrap(), "v2");
    }

    #[test]
    fn test_copy_has_independent_lineage() {
        let mut vfs = Vfs::new();
        vfs.write("/a.txt", "original");
        let copy = vfs.copy("/a.txt", "/b.txt").unwrap();
        assert_eq!(copy.version, 1);
        assert!(copy.history.is_empty());

        vfs.write("/a.txt", "v3");
        assert_eq!(vfs.read("/b.txt").unwrap(), "original");
    }

    #[test]
    fn test_copy_missing_source() {
        let mut vfs = Vfs::new();
        assert!(matches!(
            vfs.copy("/nope.txt", "/b.txt"),
            Err(WeaveError::NotFound(_))
        ));
    }

    #[test]
    fn test_size_is_derived() {
        let mut vfs = Vfs::new();
        vfs.write("/a.txt", "12345");
        assert_eq!(vfs.record("/a.txt").unwrap().size(), 5);
        vfs.write("/a.txt", "1234567890");
        assert_eq!(vfs.record("/a.txt").unwrap().size(), 10);
    }

    #[test]
    fn test_mkdir_cd_pwd() {
        let mut vfs = Vfs::new();
        assert_eq!(vfs.pwd(), "/");

        let (path, created) = vfs.mkdir("/src/deep");
        assert_eq!(path, "/src/deep");
        assert!(created);
        assert!(vfs.dir_exists("/src"));

        let (_, created_again) = vfs.mkdir("/src/deep");
        assert!(!created_again);

        vfs.cd("/src/deep").unwrap();
        assert_eq!(vfs.pwd(), "/src/deep");
        vfs.cd("..").unwrap();
        assert_eq!(vfs.pwd(), "/src");
    }

    #[test]
    fn test_cd_missing_directory() {
        let mut vfs = Vfs::new();
        assert!(matches!(vfs.cd("/ghost"), Err(WeaveError::NotFound(_))));
        assert_eq!(vfs.pwd(), "/");
    }

    #[test]
    fn test_relative_paths_resolve_against_cursor() {
        let mut vfs = Vfs::new();
        vfs.mkdir("/work");
        vfs.cd("/work").unwrap();
        vfs.write("notes.txt", "hi");
        assert_eq!(vfs.read("/work/notes.txt").unwrap(), "hi");
        assert_eq!(vfs.read("../work/notes.txt").unwrap(), "hi");
    }

    #[test]
    fn test_write_registers_parent_directories() {
        let mut vfs = Vfs::new();
        vfs.write("/a/b/c.txt", "deep");
        assert!(vfs.dir_exists("/a"));
        assert!(vfs.dir_exists("/a/b"));
    }

    #[test]
    fn test_list_is_non_recursive() {
        let mut vfs = Vfs::new();
        vfs.write("/top.txt", "t");
        vfs.write("/sub/inner.txt", "i");

        let entries = vfs.list(Some("/"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "/top.txt");
        assert_eq!(entries[0].size, 1);

        assert_eq!(vfs.subdirectories(Some("/")), vec!["/sub".to_string()]);
        assert_eq!(vfs.paths(), vec!["/sub/inner.txt", "/top.txt"]);
        assert_eq!(vfs.file_count(), 2);
    }

    #[test]
    fn test_diff_and_merge_continue_parent_versions() {
        let mut parent = Vfs::new();
        parent.write("/a.txt", "v1");
        parent.write("/a.txt", "v2");

        let base = parent.clone();
        let mut child = parent.clone();
        child.write("/a.txt", "child");
        child.write("/new.txt", "fresh");

        let deltas = child.diff(&base);
        assert_eq!(deltas.len(), 2);

        parent.merge(deltas);
        assert_eq!(parent.read("/a.txt").unwrap(), "child");
        assert_eq!(parent.record("/a.txt").unwrap().version, 3);
        assert_eq!(parent.record("/new.txt").unwrap().version, 1);
    }

    #[test]
    fn test_diff_excludes_untouched_files() {
        let mut base = Vfs::new();
        base.write("/same.txt", "unchanged");
        let child = base.clone();
        assert!(child.diff(&base).is_empty());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut vfs = Vfs::new();
        vfs.write("/a.txt", "v1");
        vfs.write("/a.txt", "v2");
        vfs.mkdir("/dir");
        vfs.cd("/dir").unwrap();

        let json = serde_json::to_string(&vfs).unwrap();
        let restored: Vfs = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, vfs);
    }
}
