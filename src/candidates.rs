//! The enumerable search space: per-package candidate version lists.
//!
//! A [`CandidateSet`] is built once when a requirements source is loaded and
//! is immutable for the lifetime of a run. Package order is fixed - it
//! defines the odometer digit positions - and every package carries at least
//! one version.
//!
//! Expansion policy: a requirement pinned with `==` contributes exactly that
//! version; any other requirement is expanded by asking the package index
//! (`pip index versions <name>`) and keeping the N most recent versions.
//! pip reports versions newest-first and that ordering is preserved.

use anyhow::Result;

use crate::core::PipmatrixError;
use crate::pip::PipCommand;
use crate::requirements::Requirement;

/// One package and its ordered (newest-first) candidate versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCandidates {
    /// Bare package name, used for index queries
    pub name: String,
    /// Extras including brackets, carried into the pin line
    pub extras: Option<String>,
    /// Candidate versions, newest first, never empty
    pub versions: Vec<String>,
}

impl PackageCandidates {
    /// Name as it appears in a constraint pin, extras included.
    pub fn pin_name(&self) -> String {
        match &self.extras {
            Some(extras) => format!("{}{}", self.name, extras),
            None => self.name.clone(),
        }
    }
}

/// Immutable-after-load table of `(package, version list)` pairs.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    packages: Vec<PackageCandidates>,
}

impl CandidateSet {
    /// Builds a set from already-expanded parts, enforcing the load-time
    /// invariants: at least one package, at least one version per package.
    pub fn from_parts(packages: Vec<PackageCandidates>) -> Result<Self, PipmatrixError> {
        if packages.is_empty() {
            return Err(PipmatrixError::EmptyInput);
        }
        for package in &packages {
            if package.versions.is_empty() {
                return Err(PipmatrixError::NoVersions {
                    package: package.name.clone(),
                });
            }
        }
        Ok(Self { packages })
    }

    /// Expands parsed requirements into a candidate set.
    ///
    /// `versions_per_package` bounds how many index versions an unpinned
    /// requirement contributes. A package the index knows nothing about
    /// surfaces as [`PipmatrixError::NoVersions`].
    pub async fn expand(
        requirements: &[Requirement],
        python: &str,
        versions_per_package: usize,
    ) -> Result<Self> {
        let mut packages = Vec::with_capacity(requirements.len());

        for requirement in requirements {
            let versions = if let Some(pin) = requirement.exact_pin() {
                vec![pin.to_string()]
            } else {
                query_index_versions(python, &requirement.name, versions_per_package).await?
            };
            tracing::info!(
                target: "resolver",
                "Candidates for {}: {}",
                requirement.name,
                versions.join(", ")
            );
            packages.push(PackageCandidates {
                name: requirement.name.clone(),
                extras: requirement.extras.clone(),
                versions,
            });
        }

        Ok(Self::from_parts(packages)?)
    }

    /// Packages in digit-position order.
    pub fn packages(&self) -> &[PackageCandidates] {
        &self.packages
    }

    /// Number of packages (odometer digit count).
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the set holds no packages. Cannot occur after construction,
    /// present for completeness.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Per-digit maximum index: version count minus one per package.
    pub fn max_indices(&self) -> Vec<usize> {
        self.packages.iter().map(|p| p.versions.len() - 1).collect()
    }
}

/// Queries `pip index versions` and keeps the `limit` most recent versions.
async fn query_index_versions(python: &str, package: &str, limit: usize) -> Result<Vec<String>> {
    let output = match PipCommand::index_versions(python, package).execute().await {
        Ok(output) => output,
        Err(err) => {
            // An unknown package makes the query itself exit non-zero; that
            // is a NoVersions condition, not an engine failure.
            return match err.downcast_ref::<PipmatrixError>() {
                Some(PipmatrixError::PipCommandError { .. }) => Err(PipmatrixError::NoVersions {
                    package: package.to_string(),
                }
                .into()),
                _ => Err(err),
            };
        }
    };

    let versions = parse_index_versions(&output.stdout);
    if versions.is_empty() {
        return Err(PipmatrixError::NoVersions {
            package: package.to_string(),
        }
        .into());
    }
    Ok(versions.into_iter().take(limit).collect())
}

/// Parses the `Available versions: a, b, c` line of `pip index versions`.
fn parse_index_versions(stdout: &str) -> Vec<String> {
    for line in stdout.lines() {
        if let Some(rest) = line.trim().strip_prefix("Available versions:") {
            return rest
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
                .collect();
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(name: &str, versions: &[&str]) -> PackageCandidates {
        PackageCandidates {
            name: name.to_string(),
            extras: None,
            versions: versions.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn from_parts_enforces_invariants() {
        assert!(matches!(CandidateSet::from_parts(vec![]), Err(PipmatrixError::EmptyInput)));

        let err = CandidateSet::from_parts(vec![package("a", &["1.0"]), package("b", &[])])
            .unwrap_err();
        assert!(matches!(err, PipmatrixError::NoVersions { package } if package == "b"));
    }

    #[test]
    fn max_indices_reflect_version_counts() {
        let set = CandidateSet::from_parts(vec![
            package("pkgA", &["2.0", "1.0"]),
            package("pkgB", &["1.1", "1.0"]),
            package("pkgC", &["0.1"]),
        ])
        .unwrap();
        assert_eq!(set.max_indices(), vec![1, 1, 0]);
    }

    #[test]
    fn parses_pip_index_output() {
        let stdout = "requests (2.31.0)\n\
                      Available versions: 2.31.0, 2.30.0, 2.29.0\n\
                      INSTALLED: 2.31.0\n";
        let versions = parse_index_versions(stdout);
        assert_eq!(versions, vec!["2.31.0", "2.30.0", "2.29.0"]);
    }

    #[test]
    fn parse_handles_missing_versions_line() {
        assert!(parse_index_versions("WARNING: pip index is experimental\n").is_empty());
    }

    #[test]
    fn pin_name_includes_extras() {
        let with_extras = PackageCandidates {
            name: "uvicorn".to_string(),
            extras: Some("[standard]".to_string()),
            versions: vec!["0.23.2".to_string()],
        };
        assert_eq!(with_extras.pin_name(), "uvicorn[standard]");
        assert_eq!(package("flask", &["3.0.0"]).pin_name(), "flask");
    }

    #[tokio::test]
    async fn exact_pins_skip_the_index() {
        // A nonexistent interpreter proves no subprocess is spawned for pins.
        let requirements = vec![Requirement {
            name: "requests".to_string(),
            extras: None,
            operator: Some("==".to_string()),
            version: Some("2.31.0".to_string()),
        }];
        let set = CandidateSet::expand(&requirements, "no-such-python", 3).await.unwrap();
        assert_eq!(set.packages()[0].versions, vec!["2.31.0"]);
    }
}
