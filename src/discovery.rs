use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::AppError;

/// Find test files under the root directory: every regular file whose name
/// ends with the configured suffix, symlinks followed. Entries are sorted
/// by file name so batches run in a stable order across platforms.
pub fn find_test_files(root: &Path, suffix: &str) -> Result<Vec<PathBuf>, AppError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| AppError::DiscoveryFailed {
            root: root.to_path_buf(),
            reason: e.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(suffix) {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(AppError::NoTestFiles {
            root: root.to_path_buf(),
        });
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_finds_only_files_with_the_suffix() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("userTest.php"));
        touch(&dir.path().join("helpers.php"));
        touch(&dir.path().join("README.md"));

        let files = find_test_files(dir.path(), "Test.php").unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("userTest.php"));
    }

    #[test]
    fn test_walks_nested_directories_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("unit")).unwrap();
        fs::create_dir_all(dir.path().join("functional")).unwrap();
        touch(&dir.path().join("unit/bTest.php"));
        touch(&dir.path().join("unit/aTest.php"));
        touch(&dir.path().join("functional/cTest.php"));

        let files = find_test_files(dir.path(), "Test.php").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["cTest.php", "aTest.php", "bTest.php"]);
    }

    #[test]
    fn test_no_matches_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("helpers.php"));

        let result = find_test_files(dir.path(), "Test.php");
        assert!(matches!(result, Err(AppError::NoTestFiles { .. })));
    }

    #[test]
    fn test_missing_root_is_a_discovery_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = find_test_files(&dir.path().join("does-not-exist"), "Test.php");
        assert!(matches!(result, Err(AppError::DiscoveryFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_follows_symlinked_directories() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir_all(&real).unwrap();
        touch(&real.join("linkedTest.php"));

        let root = dir.path().join("root");
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(&real, root.join("link")).unwrap();

        let files = find_test_files(&root, "Test.php").unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("linkedTest.php"));
    }
}
