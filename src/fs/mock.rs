use super::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
    /// Present, but reading it fails with `PermissionDenied`.
    Unreadable,
}

#[derive(Debug, Clone)]
struct MockEntry {
    content: Option<Vec<u8>>,
    kind: EntryKind,
}

/// In-memory filesystem for tests. Relative paths are resolved against the root.
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        self.add_bytes(path, content.as_bytes());
    }

    pub fn add_bytes(&self, path: impl AsRef<Path>, content: &[u8]) {
        self.insert(path.as_ref(), Some(content.to_vec()), EntryKind::File);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), None, EntryKind::Directory);
    }

    pub fn add_unreadable(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), None, EntryKind::Unreadable);
    }

    fn insert(&self, path: &Path, content: Option<Vec<u8>>, kind: EntryKind) {
        let path = self.normalize_path(path);
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(path, MockEntry { content, kind });
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                kind: EntryKind::Directory,
            });
        }
    }

    fn kind_of(&self, path: &Path) -> Option<EntryKind> {
        let path = self.normalize_path(path);
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&path)
            .map(|e| e.kind)
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.kind_of(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.kind_of(path) == Some(EntryKind::Directory)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let normalized = self.normalize_path(path);
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let entry = files.get(&normalized).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("File not found: {:?}", path))
        })?;

        match entry.kind {
            EntryKind::File => Ok(entry.content.clone().unwrap_or_default()),
            EntryKind::Unreadable => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("Permission denied: {:?}", path),
            )),
            EntryKind::Directory => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Is a directory: {:?}", path),
            )),
        }
    }
}
