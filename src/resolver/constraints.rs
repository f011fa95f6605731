//! Rendering an odometer assignment as an exact-pin constraint file.
//!
//! One line per package, `name==version`, in candidate-set package order,
//! UTF-8, newline-terminated, no header or comments. The destination is
//! overwritten on every attempt; the caller guarantees the parent directory
//! exists (it is part of the engine's working-directory layout).

use anyhow::{Context, Result};
use std::path::Path;

use crate::candidates::CandidateSet;

/// Renders the constraint file content for one digit vector.
///
/// Pure function of its inputs: the same `(candidates, indices)` pair always
/// produces byte-identical content.
pub fn render(candidates: &CandidateSet, indices: &[usize]) -> String {
    debug_assert_eq!(indices.len(), candidates.len());

    let mut content = String::new();
    for (package, &index) in candidates.packages().iter().zip(indices) {
        content.push_str(&package.pin_name());
        content.push_str("==");
        content.push_str(&package.versions[index]);
        content.push('\n');
    }
    content
}

/// Human-readable form of a combination for attempt log lines.
pub fn display(candidates: &CandidateSet, indices: &[usize]) -> String {
    candidates
        .packages()
        .iter()
        .zip(indices)
        .map(|(package, &index)| format!("{}=={}", package.pin_name(), package.versions[index]))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Writes the constraint file for one combination, overwriting any previous
/// content at `destination`.
pub fn write(candidates: &CandidateSet, indices: &[usize], destination: &Path) -> Result<()> {
    std::fs::write(destination, render(candidates, indices))
        .with_context(|| format!("Failed to write constraint file: {}", destination.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::PackageCandidates;

    fn example_set() -> CandidateSet {
        CandidateSet::from_parts(vec![
            PackageCandidates {
                name: "pkgA".to_string(),
                extras: None,
                versions: vec!["2.0".to_string(), "1.0".to_string()],
            },
            PackageCandidates {
                name: "pkgB".to_string(),
                extras: None,
                versions: vec!["1.1".to_string(), "1.0".to_string()],
            },
        ])
        .unwrap()
    }

    #[test]
    fn renders_selected_versions_in_package_order() {
        let set = example_set();
        assert_eq!(render(&set, &[1, 1]), "pkgA==1.0\npkgB==1.0\n");
        assert_eq!(render(&set, &[0, 1]), "pkgA==2.0\npkgB==1.0\n");
    }

    #[test]
    fn render_is_idempotent() {
        let set = example_set();
        assert_eq!(render(&set, &[0, 1]), render(&set, &[0, 1]));
    }

    #[test]
    fn extras_are_carried_into_pins() {
        let set = CandidateSet::from_parts(vec![PackageCandidates {
            name: "uvicorn".to_string(),
            extras: Some("[standard]".to_string()),
            versions: vec!["0.23.2".to_string()],
        }])
        .unwrap();
        assert_eq!(render(&set, &[0]), "uvicorn[standard]==0.23.2\n");
    }

    #[test]
    fn display_joins_pins() {
        let set = example_set();
        assert_eq!(display(&set, &[1, 0]), "pkgA==1.0, pkgB==1.1");
    }

    #[test]
    fn write_overwrites_destination() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("constraints.in");
        let set = example_set();

        write(&set, &[0, 0], &path).unwrap();
        write(&set, &[1, 1], &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "pkgA==1.0\npkgB==1.0\n");
    }

    #[test]
    fn write_fails_without_parent_directory() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("missing").join("constraints.in");
        assert!(write(&example_set(), &[0, 0], &path).is_err());
    }
}
