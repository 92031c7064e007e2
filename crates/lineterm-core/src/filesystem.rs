use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ConfigError, FsError};

/// A node in the virtual filesystem tree.
///
/// Directories hold their children behind an [`Arc`], so cloning a node is
/// O(1) and every write only copies the directories on the path it touches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FsNode {
    /// Children keyed by name, kept in lexical order.
    Directory(Arc<BTreeMap<String, FsNode>>),
    /// Text content.
    File(Arc<str>),
}

impl FsNode {
    fn empty_dir() -> Self {
        Self::Directory(Arc::new(BTreeMap::new()))
    }

    fn file(content: &str) -> Self {
        Self::File(Arc::from(content))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// File content, or `None` for directories.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::File(content) => Some(content),
            Self::Directory(_) => None,
        }
    }
}

/// Directory entry returned by [`VirtualFs::list_entries`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Persistent in-memory filesystem.
///
/// Every write returns a new `VirtualFs`; the receiver is never modified.
/// Untouched subtrees are shared between the old and new values.
///
/// # Path Convention
///
/// - Root: `"/"`
/// - All stored paths are absolute and normalized: `"/etc/hosts"`
/// - Lookups normalize `.` and `..` before walking the tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualFs {
    /// Always a [`FsNode::Directory`].
    root: FsNode,
}

impl VirtualFs {
    /// Create a filesystem containing only the root directory.
    pub fn empty() -> Self {
        Self {
            root: FsNode::empty_dir(),
        }
    }

    /// Build a filesystem from a flat `path -> content` mapping.
    ///
    /// `None` content declares a directory. Entries are inserted in lexical
    /// path order, so a parent always precedes its children; a child whose
    /// parent was never declared is rejected instead of creating the parent
    /// implicitly.
    pub fn from_entries<I, P>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (P, Option<String>)>,
        P: Into<String>,
    {
        let mut ordered = BTreeMap::new();
        for (path, content) in entries {
            let path = path.into();
            if !path.starts_with('/') {
                return Err(ConfigError::RelativePath(path));
            }
            ordered.insert(Self::normalize_path(&path), content);
        }

        let mut fs = Self::empty();
        for (path, content) in ordered {
            let result = match (path.as_str(), content) {
                ("/", None) => continue,
                ("/", Some(_)) => Err(FsError::IsADirectory(path.clone())),
                (_, None) => fs.create_dir(&path),
                (_, Some(text)) => fs.write_file(&path, &text),
            };
            fs = result.map_err(|source| {
                log::warn!("filesystem: rejected {}: {}", path, source);
                ConfigError::Filesystem {
                    path: path.clone(),
                    source,
                }
            })?;
            log::trace!("filesystem: added {}", path);
        }

        Ok(fs)
    }

    // ------------------------------------------------------------------------
    // Path helpers
    // ------------------------------------------------------------------------

    /// Normalize a path by resolving `.` and `..` components.
    ///
    /// Always returns an absolute path. `..` at the root stays at the root.
    pub fn normalize_path(path: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for part in path.split('/').filter(|s| !s.is_empty()) {
            match part {
                ".." => {
                    parts.pop();
                }
                "." => {}
                _ => parts.push(part),
            }
        }

        format!("/{}", parts.join("/"))
    }

    /// Resolve `path` against the working directory `cwd` without touching
    /// the tree.
    pub fn join_path(cwd: &str, path: &str) -> String {
        if path.starts_with('/') {
            Self::normalize_path(path)
        } else {
            Self::normalize_path(&format!("{}/{}", cwd, path))
        }
    }

    /// Get the parent directory of an absolute path. The root is its own parent.
    pub fn parent_path(path: &str) -> String {
        let normalized = Self::normalize_path(path);
        match normalized.rsplit_once('/') {
            Some(("", _)) | None => "/".to_string(),
            Some((parent, _)) => parent.to_string(),
        }
    }

    /// Last segment of a path (empty for the root).
    pub fn file_name(path: &str) -> String {
        let normalized = Self::normalize_path(path);
        normalized
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    fn segments(path: &str) -> impl Iterator<Item = &str> {
        path.split('/').filter(|s| !s.is_empty())
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Look up the node at an absolute path.
    ///
    /// Walks segment by segment from the root and fails on the first
    /// missing or non-directory segment.
    pub fn resolve(&self, path: &str) -> Result<&FsNode, FsError> {
        let normalized = Self::normalize_path(path);
        let mut current = &self.root;

        for part in Self::segments(&normalized) {
            current = match current {
                FsNode::Directory(children) => children
                    .get(part)
                    .ok_or_else(|| FsError::NotFound(normalized.clone()))?,
                FsNode::File(_) => return Err(FsError::NotADirectory(normalized.clone())),
            };
        }

        Ok(current)
    }

    /// Read a file's text content.
    pub fn read(&self, path: &str) -> Result<&str, FsError> {
        match self.resolve(path)? {
            FsNode::File(content) => Ok(content),
            FsNode::Directory(_) => Err(FsError::IsADirectory(Self::normalize_path(path))),
        }
    }

    /// List child names of a directory, in lexical order.
    pub fn list(&self, path: &str) -> Result<Vec<String>, FsError> {
        Ok(self.children(path)?.keys().cloned().collect())
    }

    /// List children with their kind, in lexical order.
    pub fn list_entries(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        Ok(self
            .children(path)?
            .iter()
            .map(|(name, node)| DirEntry {
                name: name.clone(),
                is_dir: node.is_directory(),
            })
            .collect())
    }

    fn children(&self, path: &str) -> Result<&BTreeMap<String, FsNode>, FsError> {
        match self.resolve(path)? {
            FsNode::Directory(children) => Ok(children),
            FsNode::File(_) => Err(FsError::NotADirectory(Self::normalize_path(path))),
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok()
    }

    pub fn is_directory(&self, path: &str) -> bool {
        matches!(self.resolve(path), Ok(FsNode::Directory(_)))
    }

    // ------------------------------------------------------------------------
    // Writes (copy-on-write)
    // ------------------------------------------------------------------------

    /// Apply `f` to the children of the directory at `dir`, copying only the
    /// directories along the way.
    fn with_dir<F>(&self, dir: &str, f: F) -> Result<Self, FsError>
    where
        F: FnOnce(&mut BTreeMap<String, FsNode>) -> Result<(), FsError>,
    {
        let mut root = self.root.clone();
        let FsNode::Directory(children) = &mut root else {
            return Err(FsError::NotADirectory("/".to_string()));
        };
        let mut current = Arc::make_mut(children);
        let mut walked = String::new();

        for part in Self::segments(dir) {
            walked.push('/');
            walked.push_str(part);
            current = match current.get_mut(part) {
                Some(FsNode::Directory(children)) => Arc::make_mut(children),
                Some(FsNode::File(_)) => return Err(FsError::NotADirectory(walked)),
                None => return Err(FsError::NotFound(walked)),
            };
        }

        f(current)?;
        Ok(Self { root })
    }

    /// Split a path into (parent, name), rejecting the root.
    fn split_target(path: &str) -> Result<(String, String), FsError> {
        let normalized = Self::normalize_path(path);
        let name = Self::file_name(&normalized);
        if name.is_empty() {
            return Err(FsError::InvalidPath(normalized));
        }
        Ok((Self::parent_path(&normalized), name))
    }

    fn insert_node(&self, path: &str, node: FsNode) -> Result<Self, FsError> {
        let (parent, name) = Self::split_target(path)?;
        self.with_dir(&parent, |children| {
            children.insert(name, node);
            Ok(())
        })
    }

    /// Create a single directory. The parent must exist.
    pub fn create_dir(&self, path: &str) -> Result<Self, FsError> {
        let normalized = Self::normalize_path(path);
        if self.exists(&normalized) {
            return Err(FsError::AlreadyExists(normalized));
        }
        self.insert_node(&normalized, FsNode::empty_dir())
    }

    /// Create a directory and any missing parents. Existing directories are
    /// left alone.
    pub fn create_dir_all(&self, path: &str) -> Result<Self, FsError> {
        let normalized = Self::normalize_path(path);
        let mut fs = self.clone();
        let mut walked = String::new();

        for part in Self::segments(&normalized) {
            walked.push('/');
            walked.push_str(part);
            match fs.resolve(&walked).map(FsNode::is_directory) {
                Ok(true) => {}
                Ok(false) => return Err(FsError::NotADirectory(walked)),
                Err(_) => fs = fs.insert_node(&walked, FsNode::empty_dir())?,
            }
        }

        Ok(fs)
    }

    /// Create or replace a file. The parent directory must exist.
    pub fn write_file(&self, path: &str, content: &str) -> Result<Self, FsError> {
        let normalized = Self::normalize_path(path);
        if self.is_directory(&normalized) {
            return Err(FsError::IsADirectory(normalized));
        }
        self.insert_node(&normalized, FsNode::file(content))
    }

    /// Remove a file.
    pub fn remove_file(&self, path: &str) -> Result<Self, FsError> {
        let normalized = Self::normalize_path(path);
        match self.resolve(&normalized)? {
            FsNode::Directory(_) => Err(FsError::IsADirectory(normalized)),
            FsNode::File(_) => self.detach(&normalized),
        }
    }

    /// Remove an empty directory.
    pub fn remove_dir(&self, path: &str) -> Result<Self, FsError> {
        let normalized = Self::normalize_path(path);
        match self.resolve(&normalized)? {
            FsNode::File(_) => Err(FsError::NotADirectory(normalized)),
            FsNode::Directory(children) if !children.is_empty() => {
                Err(FsError::DirectoryNotEmpty(normalized))
            }
            FsNode::Directory(_) => self.detach(&normalized),
        }
    }

    /// Remove a file or a whole directory subtree.
    pub fn remove_all(&self, path: &str) -> Result<Self, FsError> {
        let normalized = Self::normalize_path(path);
        self.resolve(&normalized)?;
        self.detach(&normalized)
    }

    fn detach(&self, path: &str) -> Result<Self, FsError> {
        let (parent, name) = Self::split_target(path)?;
        self.with_dir(&parent, |children| {
            children
                .remove(&name)
                .map(|_| ())
                .ok_or_else(|| FsError::NotFound(path.to_string()))
        })
    }

    /// Copy `src` to `dest`.
    ///
    /// If `dest` is an existing directory the copy lands inside it under the
    /// source's name. Directories require `recursive`. The copied subtree is
    /// shared with the source until either side is written.
    pub fn copy(&self, src: &str, dest: &str, recursive: bool) -> Result<Self, FsError> {
        let src = Self::normalize_path(src);
        let node = self.resolve(&src)?.clone();
        if node.is_directory() && !recursive {
            return Err(FsError::IsADirectory(src));
        }

        let mut target = Self::normalize_path(dest);
        if self.is_directory(&target) {
            target = Self::join_path(&target, &Self::file_name(&src));
        }

        match (self.resolve(&target), node.is_directory()) {
            (Ok(FsNode::Directory(_)), false) => Err(FsError::IsADirectory(target)),
            (Ok(_), true) => Err(FsError::AlreadyExists(target)),
            _ => self.insert_node(&target, node),
        }
    }
}

impl Default for VirtualFs {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_fs() -> VirtualFs {
        VirtualFs::from_entries([
            ("/README.txt", Some("hello\nworld".to_string())),
            ("/etc", None),
            ("/etc/hosts", Some("Niv\nAvishai".to_string())),
            ("/etc/hostname", Some("sudovisudo.wtf".to_string())),
            ("/home", None),
            ("/home/.secret", Some("shh".to_string())),
        ])
        .expect("test filesystem should build")
    }

    #[test]
    fn test_empty_fs() {
        let fs = VirtualFs::empty();
        assert!(fs.is_directory("/"));
        assert_eq!(fs.list("/").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_from_entries() {
        let fs = create_test_fs();

        assert!(fs.is_directory("/etc"));
        assert_eq!(fs.read("/README.txt").unwrap(), "hello\nworld");
        assert_eq!(fs.read("/etc/hostname").unwrap(), "sudovisudo.wtf");
        assert_eq!(
            fs.list("/").unwrap(),
            vec!["README.txt", "etc", "home"]
        );
    }

    #[test]
    fn test_from_entries_missing_parent() {
        let err = VirtualFs::from_entries([("/etc/hosts", Some(String::new()))]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Filesystem {
                path: "/etc/hosts".to_string(),
                source: FsError::NotFound("/etc".to_string()),
            }
        );
    }

    #[test]
    fn test_from_entries_file_as_parent() {
        let err = VirtualFs::from_entries([
            ("/a", Some("text".to_string())),
            ("/a/b", None),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Filesystem {
                source: FsError::NotADirectory(_),
                ..
            }
        ));
    }

    #[test]
    fn test_from_entries_relative_path() {
        let err = VirtualFs::from_entries([("etc", None)]).unwrap_err();
        assert_eq!(err, ConfigError::RelativePath("etc".to_string()));
    }

    #[test]
    fn test_resolve_errors() {
        let fs = create_test_fs();

        assert_eq!(
            fs.resolve("/nope").unwrap_err(),
            FsError::NotFound("/nope".to_string())
        );
        assert!(fs.resolve("/README.txt/child").is_err());
        assert_eq!(
            fs.read("/etc").unwrap_err(),
            FsError::IsADirectory("/etc".to_string())
        );
        assert_eq!(
            fs.list("/README.txt").unwrap_err(),
            FsError::NotADirectory("/README.txt".to_string())
        );
    }

    #[test]
    fn test_resolve_normalizes() {
        let fs = create_test_fs();
        assert_eq!(fs.read("/etc/../etc/./hostname").unwrap(), "sudovisudo.wtf");
        assert!(fs.is_directory("/.."));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(VirtualFs::normalize_path("/home/./wonjae"), "/home/wonjae");
        assert_eq!(VirtualFs::normalize_path("/home/wonjae/../etc"), "/home/etc");
        assert_eq!(VirtualFs::normalize_path("a/b/c/../../d"), "/a/d");
        assert_eq!(VirtualFs::normalize_path(""), "/");
        assert_eq!(VirtualFs::normalize_path("/../.."), "/");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(VirtualFs::join_path("/etc", "hosts"), "/etc/hosts");
        assert_eq!(VirtualFs::join_path("/etc", "/home"), "/home");
        assert_eq!(VirtualFs::join_path("/a/b/c", "../../d"), "/a/d");
        assert_eq!(VirtualFs::join_path("/", "."), "/");
    }

    #[test]
    fn test_parent_path_and_file_name() {
        assert_eq!(VirtualFs::parent_path("/home/wonjae"), "/home");
        assert_eq!(VirtualFs::parent_path("/home"), "/");
        assert_eq!(VirtualFs::parent_path("/"), "/");
        assert_eq!(VirtualFs::file_name("/etc/hosts"), "hosts");
        assert_eq!(VirtualFs::file_name("/"), "");
    }

    #[test]
    fn test_writes_leave_original_untouched() {
        let fs = create_test_fs();
        let updated = fs.write_file("/etc/motd", "welcome").unwrap();

        assert!(!fs.exists("/etc/motd"));
        assert_eq!(updated.read("/etc/motd").unwrap(), "welcome");
    }

    #[test]
    fn test_writes_share_untouched_subtrees() {
        let fs = create_test_fs();
        let updated = fs.write_file("/etc/motd", "welcome").unwrap();

        let (FsNode::Directory(before), FsNode::Directory(after)) =
            (fs.resolve("/home").unwrap(), updated.resolve("/home").unwrap())
        else {
            panic!("Expected directories");
        };
        assert!(Arc::ptr_eq(before, after));
    }

    #[test]
    fn test_create_dir() {
        let fs = create_test_fs();
        let updated = fs.create_dir("/tmp").unwrap();
        assert!(updated.is_directory("/tmp"));

        assert_eq!(
            updated.create_dir("/tmp").unwrap_err(),
            FsError::AlreadyExists("/tmp".to_string())
        );
        assert_eq!(
            fs.create_dir("/a/b").unwrap_err(),
            FsError::NotFound("/a".to_string())
        );
    }

    #[test]
    fn test_create_dir_all() {
        let fs = create_test_fs();
        let updated = fs.create_dir_all("/a/b/c").unwrap();
        assert!(updated.is_directory("/a/b/c"));

        let again = updated.create_dir_all("/a/b").unwrap();
        assert_eq!(again, updated);

        assert_eq!(
            fs.create_dir_all("/README.txt/x").unwrap_err(),
            FsError::NotADirectory("/README.txt".to_string())
        );
    }

    #[test]
    fn test_write_file_over_directory() {
        let fs = create_test_fs();
        assert_eq!(
            fs.write_file("/etc", "x").unwrap_err(),
            FsError::IsADirectory("/etc".to_string())
        );
    }

    #[test]
    fn test_remove() {
        let fs = create_test_fs();

        let updated = fs.remove_file("/README.txt").unwrap();
        assert!(!updated.exists("/README.txt"));

        assert_eq!(
            fs.remove_file("/etc").unwrap_err(),
            FsError::IsADirectory("/etc".to_string())
        );
        assert_eq!(
            fs.remove_dir("/etc").unwrap_err(),
            FsError::DirectoryNotEmpty("/etc".to_string())
        );

        let updated = fs.remove_all("/etc").unwrap();
        assert!(!updated.exists("/etc"));
        assert!(updated.exists("/home"));

        assert_eq!(
            fs.remove_all("/").unwrap_err(),
            FsError::InvalidPath("/".to_string())
        );
    }

    #[test]
    fn test_copy_file() {
        let fs = create_test_fs();

        let updated = fs.copy("/README.txt", "/home", false).unwrap();
        assert_eq!(updated.read("/home/README.txt").unwrap(), "hello\nworld");

        let updated = fs.copy("/README.txt", "/notes.txt", false).unwrap();
        assert_eq!(updated.read("/notes.txt").unwrap(), "hello\nworld");
    }

    #[test]
    fn test_copy_directory() {
        let fs = create_test_fs();

        assert_eq!(
            fs.copy("/etc", "/backup", false).unwrap_err(),
            FsError::IsADirectory("/etc".to_string())
        );

        let updated = fs.copy("/etc", "/backup", true).unwrap();
        assert_eq!(updated.list("/backup").unwrap(), vec!["hostname", "hosts"]);

        // Copying into its own subtree copies a snapshot, never a cycle.
        let nested = fs.copy("/etc", "/etc", true).unwrap();
        assert_eq!(nested.list("/etc/etc").unwrap(), vec!["hostname", "hosts"]);
    }

    #[test]
    fn test_list_entries() {
        let fs = create_test_fs();
        let entries = fs.list_entries("/").unwrap();
        assert_eq!(
            entries[1],
            DirEntry {
                name: "etc".to_string(),
                is_dir: true
            }
        );
        assert!(!entries[0].is_dir);
    }
}
