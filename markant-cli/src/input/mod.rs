//! Input handling: pattern resolution and file reading

use anyhow::{Context, Result};
use glob::glob;
use std::path::{Path, PathBuf};

/// Resolve file patterns to actual file paths
pub fn resolve_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let paths = glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;

        for path_result in paths {
            let path =
                path_result.with_context(|| format!("Error resolving pattern: {pattern}"))?;

            if path.is_file() {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        anyhow::bail!("No files found matching the provided patterns");
    }

    // Remove duplicates and sort
    files.sort();
    files.dedup();

    Ok(files)
}

/// Read one input document as UTF-8
pub fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading input {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_literal_paths_sorted_and_deduped() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "eins").unwrap();
        fs::write(&b, "zwei").unwrap();

        let patterns = vec![
            b.display().to_string(),
            a.display().to_string(),
            a.display().to_string(),
        ];
        let files = resolve_patterns(&patterns).unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn resolves_glob_patterns() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.txt"), "x").unwrap();
        fs::write(dir.path().join("y.txt"), "y").unwrap();
        fs::write(dir.path().join("z.md"), "z").unwrap();

        let pattern = format!("{}/*.txt", dir.path().display());
        let files = resolve_patterns(&[pattern]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn empty_match_is_an_error() {
        assert!(resolve_patterns(&["/definitely/not/here/*.txt".to_string()]).is_err());
    }
}
