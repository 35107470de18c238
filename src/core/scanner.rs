//! Input collection: expand the command line's files and directories into
//! the list of source units to process.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use walkdir::WalkDir;

const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

fn is_source_unit(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Make a unit path relative to the project base. Module ids are derived
/// from these paths, so anything outside the base (or reaching out of it
/// with `..`) is rejected rather than allowed to name a record outside the
/// translations root.
fn relativize(path: &Path, base: &Path) -> Result<PathBuf> {
    let relative = if path.is_absolute() {
        path.strip_prefix(base)
            .with_context(|| format!("input outside the working directory: {}", path.display()))?
    } else {
        path
    };
    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        bail!("input escapes the working directory: {}", path.display());
    }
    Ok(relative.to_path_buf())
}

/// Expand inputs into unit paths relative to `base`. Files are taken as
/// given, directories are walked recursively for source extensions,
/// duplicates collapse, and the result is sorted for deterministic
/// processing order.
pub fn collect_units(inputs: &[String], base: &Path) -> Result<Vec<PathBuf>> {
    let mut units = BTreeSet::new();

    for input in inputs {
        let path = PathBuf::from(input);
        let metadata = path
            .metadata()
            .with_context(|| format!("unreadable input: {}", path.display()))?;

        if metadata.is_file() {
            units.insert(relativize(&path, base)?);
            continue;
        }

        for entry in WalkDir::new(&path).sort_by_file_name() {
            let entry = entry.with_context(|| format!("failed to walk {}", path.display()))?;
            if entry.file_type().is_file() && is_source_unit(entry.path()) {
                units.insert(relativize(entry.path(), base)?);
            }
        }
    }

    Ok(units.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_directories_walked_for_source_extensions() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/a.ts"), "").unwrap();
        fs::write(dir.path().join("src/b.tsx"), "").unwrap();
        fs::write(dir.path().join("src/notes.md"), "").unwrap();

        let units =
            collect_units(&[dir.path().to_string_lossy().to_string()], dir.path()).unwrap();
        assert_eq!(
            units,
            vec![PathBuf::from("src/a.ts"), PathBuf::from("src/b.tsx")]
        );
    }

    #[test]
    fn test_explicit_files_taken_as_given() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("script.mjs");
        fs::write(&file, "").unwrap();

        // Extension filtering only applies when walking directories.
        let units = collect_units(&[file.to_string_lossy().to_string()], dir.path()).unwrap();
        assert_eq!(units, vec![PathBuf::from("script.mjs")]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.ts");
        fs::write(&file, "").unwrap();

        let input = file.to_string_lossy().to_string();
        let units = collect_units(&[input.clone(), input], dir.path()).unwrap();
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let err = collect_units(&["no/such/path.ts".to_string()], Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("unreadable input"));
    }

    #[test]
    fn test_input_outside_base_rejected() {
        let base = tempdir().unwrap();
        let other = tempdir().unwrap();
        let file = other.path().join("a.ts");
        fs::write(&file, "").unwrap();

        let err =
            collect_units(&[file.to_string_lossy().to_string()], base.path()).unwrap_err();
        assert!(err.to_string().contains("outside the working directory"));
    }

    #[test]
    fn test_parent_components_rejected() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.ts"), "").unwrap();

        let input = dir.path().join("sub/../a.ts");
        let err =
            collect_units(&[input.to_string_lossy().to_string()], dir.path()).unwrap_err();
        assert!(err.to_string().contains("escapes the working directory"));
    }
}
