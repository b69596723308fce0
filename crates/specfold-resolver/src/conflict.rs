//! Unsatisfiable constraint detection and reporting.

use std::fmt;

use miette::Diagnostic;
use specfold_util::errors::SpecError;
use thiserror::Error;

/// The predicates for one package that together admit no version.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{package}: {reason} ({})", .predicates.join(", "))]
pub struct Conflict {
    pub package: String,
    /// Offending predicates, rendered with their sources.
    pub predicates: Vec<String>,
    pub reason: String,
}

impl Conflict {
    pub fn new(package: impl Into<String>, reason: impl Into<String>, predicates: Vec<String>) -> Self {
        Self {
            package: package.into(),
            predicates,
            reason: reason.into(),
        }
    }
}

impl From<Conflict> for SpecError {
    fn from(conflict: Conflict) -> Self {
        SpecError::Conflict {
            message: format!("{} ({})", conflict.reason, conflict.predicates.join(", ")),
            package: conflict.package,
        }
    }
}

/// Every conflicting package found in one pass over a spec set.
#[derive(Debug, Default)]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, conflict: Conflict) {
        self.conflicts.push(conflict);
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Names of the conflicting packages, in detection order.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.conflicts.iter().map(|c| c.package.as_str())
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No conflicting requirements.");
        }
        writeln!(f, "Conflicting requirements ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Conflict {
        Conflict::new(
            "django",
            "pinned version is excluded",
            vec!["==1.4.1 (from a)".to_string(), "!=1.4.1 (from b)".to_string()],
        )
    }

    #[test]
    fn empty_report() {
        let report = ConflictReport::new();
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
        assert_eq!(report.to_string(), "No conflicting requirements.");
    }

    #[test]
    fn report_with_conflicts() {
        let mut report = ConflictReport::new();
        report.add(sample());
        assert_eq!(report.len(), 1);
        assert_eq!(report.packages().collect::<Vec<_>>(), vec!["django"]);
        let s = report.to_string();
        assert!(s.contains("django: pinned version is excluded"), "got: {s}");
        assert!(s.contains("==1.4.1 (from a), !=1.4.1 (from b)"));
    }

    #[test]
    fn converts_into_spec_error() {
        let err: SpecError = sample().into();
        match err {
            SpecError::Conflict { package, message } => {
                assert_eq!(package, "django");
                assert_eq!(
                    message,
                    "pinned version is excluded (==1.4.1 (from a), !=1.4.1 (from b))"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
