//! Recursive directory listing and path probing.

use crate::domain::{IoError, Operation};
use bitflags::bitflags;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

bitflags! {
    /// Matching options for [`glob_directory`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GlobFlags: u32 {
        /// Match the pattern without regard to case.
        const CASE_INSENSITIVE = 1 << 0;
    }
}

/// List every regular file below `root`, recursively, as a flat list.
///
/// Entries are reported as `root/relative/path`, in directory order.
/// Subdirectories that cannot be read are skipped. Symbolic links are
/// followed to files but not into directories, so link cycles cannot
/// recurse forever.
///
/// Pattern matching is not implemented: `pattern` must be `None` or empty
/// and `flags` must be empty.
///
/// # Errors
///
/// - `Unsupported(Glob)` for a pattern or any flag
/// - `InvalidArgument("path")` for an empty root
/// - `Os` if `root` itself cannot be read
///
/// # Examples
///
/// ```no_run
/// use iostream::{glob_directory, GlobFlags};
///
/// for file in glob_directory("assets", None, GlobFlags::empty()).unwrap() {
///     println!("{}", file.display());
/// }
/// ```
pub fn glob_directory<P: AsRef<Path>>(
    root: P,
    pattern: Option<&str>,
    flags: GlobFlags,
) -> Result<Vec<PathBuf>, IoError> {
    if pattern.is_some_and(|p| !p.is_empty()) || !flags.is_empty() {
        return Err(IoError::Unsupported(Operation::Glob));
    }
    let root = root.as_ref();
    if root.as_os_str().is_empty() {
        return Err(IoError::InvalidArgument("path"));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(IoError::os("Couldn't open directory", io::Error::from(e)));
            }
            Err(e) => {
                trace!("skipping unreadable entry: {}", e);
                continue;
            }
        };

        let file_type = entry.file_type();
        if entry.depth() == 0 {
            if !file_type.is_dir() {
                return Err(IoError::os(
                    "Couldn't open directory",
                    io::Error::from(io::ErrorKind::NotADirectory),
                ));
            }
            continue;
        }

        if file_type.is_file() || (file_type.is_symlink() && links_to_file(entry.path())) {
            files.push(entry.into_path());
        }
    }

    debug!("listed {} files under {}", files.len(), root.display());
    Ok(files)
}

fn links_to_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_file())
}

/// Whether anything exists at `path` (following symbolic links).
pub fn path_exists<P: AsRef<Path>>(path: P) -> bool {
    fs::metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("top.txt"), b"1").unwrap();
        fs::write(dir.path().join("a/mid.bin"), b"2").unwrap();
        fs::write(dir.path().join("a/b/deep.dat"), b"3").unwrap();
        dir
    }

    #[test]
    fn test_glob_lists_files_recursively() {
        let dir = tree();
        let mut files = glob_directory(dir.path(), None, GlobFlags::empty()).unwrap();
        files.sort();

        let expected: Vec<PathBuf> = ["a/b/deep.dat", "a/mid.bin", "top.txt"]
            .iter()
            .map(|p| dir.path().join(p))
            .collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_glob_empty_pattern_is_allowed() {
        let dir = tree();
        assert_eq!(glob_directory(dir.path(), Some(""), GlobFlags::empty()).unwrap().len(), 3);
    }

    #[test]
    fn test_glob_rejects_pattern_and_flags() {
        let dir = tree();
        assert!(matches!(
            glob_directory(dir.path(), Some("*.txt"), GlobFlags::empty()),
            Err(IoError::Unsupported(Operation::Glob))
        ));
        assert!(matches!(
            glob_directory(dir.path(), None, GlobFlags::CASE_INSENSITIVE),
            Err(IoError::Unsupported(Operation::Glob))
        ));
    }

    #[test]
    fn test_glob_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            glob_directory(dir.path().join("gone"), None, GlobFlags::empty()),
            Err(IoError::Os { .. })
        ));
        assert!(matches!(
            glob_directory("", None, GlobFlags::empty()),
            Err(IoError::InvalidArgument("path"))
        ));
    }

    #[test]
    fn test_glob_root_must_be_directory() {
        let dir = tree();
        assert!(matches!(
            glob_directory(dir.path().join("top.txt"), None, GlobFlags::empty()),
            Err(IoError::Os { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_glob_does_not_follow_directory_links() {
        let dir = tree();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("a/loop")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("top.txt"), dir.path().join("link.txt")).unwrap();

        let files = glob_directory(dir.path(), None, GlobFlags::empty()).unwrap();
        assert_eq!(files.len(), 4);
        assert!(files.contains(&dir.path().join("link.txt")));
    }

    #[test]
    fn test_path_exists() {
        let dir = tree();
        assert!(path_exists(dir.path().join("top.txt")));
        assert!(path_exists(dir.path().join("a")));
        assert!(!path_exists(dir.path().join("nope")));
    }
}
