//! Capability-based UTF-8 file access for Sojourn documents.
//!
//! Plan requests, catalogues and saved itineraries are small UTF-8 JSON
//! documents. These helpers read and write them through `cap-std`
//! directories opened from `camino` paths, creating parent directories on
//! write.

#![forbid(unsafe_code)]

use std::io::{self, Read, Write};
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open a UTF-8 file path using ambient authority.
///
/// # Errors
///
/// Returns the underlying I/O error when the file cannot be opened.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Read the whole of `path` as UTF-8 text.
///
/// # Errors
///
/// Returns the underlying I/O error, including `InvalidData` for text that
/// is not UTF-8.
pub fn read_utf8(path: &Utf8Path) -> io::Result<String> {
    let mut contents = String::new();
    open_utf8_file(path)?.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Replace the contents of `path` with `contents`, creating missing parent
/// directories.
///
/// # Errors
///
/// Returns the underlying I/O error when a directory or the file cannot be
/// created or written.
pub fn write_utf8(path: &Utf8Path, contents: &str) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    let mut file = dir.create(name.as_str())?;
    file.write_all(contents.as_bytes())?;
    file.flush()
}

/// Ensure the parent directory for `path` exists.
///
/// # Errors
///
/// Returns the underlying I/O error when a directory cannot be created.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }
    let (base_dir, relative) = base_dir_and_relative(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Whether the existing `path` is a regular file.
///
/// # Errors
///
/// Returns the underlying I/O error, `NotFound` included, when the path or
/// its parent directory cannot be inspected.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} has no file name")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Split a parent path into an ambient base directory and a relative suffix.
fn base_dir_and_relative(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();
    let (base, relative) = match std_parent.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_parent.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from parent path"))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_parent.to_path_buf()),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative = Utf8PathBuf::from_path_buf(relative)
        .map_err(|_| io::Error::other("non-UTF-8 parent path"))?;
    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn root() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        (dir, path)
    }

    #[rstest]
    fn writes_create_parents_and_read_back(root: (TempDir, Utf8PathBuf)) {
        let (_guard, base) = root;
        let target = base.join("plans/2025/day.json");
        write_utf8(&target, "{\"city\":\"Springfield\"}").expect("write");
        assert!(file_is_file(&target).expect("metadata"));
        assert_eq!(read_utf8(&target).expect("read"), "{\"city\":\"Springfield\"}");
    }

    #[rstest]
    fn rewriting_replaces_contents(root: (TempDir, Utf8PathBuf)) {
        let (_guard, base) = root;
        let target = base.join("day.json");
        write_utf8(&target, "first, and longer").expect("write");
        write_utf8(&target, "second").expect("rewrite");
        assert_eq!(read_utf8(&target).expect("read"), "second");
    }

    #[rstest]
    fn directories_are_not_files(root: (TempDir, Utf8PathBuf)) {
        let (_guard, base) = root;
        assert!(!file_is_file(&base).expect("directory metadata"));
    }

    #[rstest]
    #[case::missing_file("absent.json")]
    #[case::missing_parent("nowhere/absent.json")]
    fn missing_paths_are_reported_as_not_found(
        root: (TempDir, Utf8PathBuf),
        #[case] relative: &str,
    ) {
        let (_guard, base) = root;
        let err = file_is_file(&base.join(relative)).expect_err("missing path");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn reading_a_missing_file_fails(root: (TempDir, Utf8PathBuf)) {
        let (_guard, base) = root;
        let err = read_utf8(&base.join("absent.json")).expect_err("missing");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
