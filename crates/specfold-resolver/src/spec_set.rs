//! A deduplicating, insertion-ordered collection of package specs.

use std::fmt;

use indexmap::IndexSet;
use specfold_core::config::NormalizeConfig;
use specfold_core::spec::{IntoSpec, Spec};
use specfold_core::version::{Version, VersionScheme};
use specfold_util::errors::SpecResult;

use crate::conflict::{Conflict, ConflictReport};
use crate::normalize::PackageConstraints;

/// Specs gathered from any number of requirement sources.
///
/// Members are unique under [`Spec`] equality, so the same requirement from
/// two different sources is kept twice. [`SpecSet::normalize`] never mutates
/// the set it is called on.
#[derive(Debug, Clone)]
pub struct SpecSet<V = Version> {
    specs: IndexSet<Spec<V>>,
}

impl SpecSet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V: VersionScheme> Default for SpecSet<V> {
    fn default() -> Self {
        Self {
            specs: IndexSet::new(),
        }
    }
}

impl<V: VersionScheme> SpecSet<V> {
    /// Insert a spec or parse requirement text into one.
    ///
    /// Returns `false` if an equal spec was already present.
    pub fn add_spec(&mut self, spec: impl IntoSpec<V>) -> SpecResult<bool> {
        let spec = spec.into_spec()?;
        Ok(self.specs.insert(spec))
    }

    /// Parse `text` and insert it attributed to `source`.
    pub fn add_spec_from(&mut self, text: &str, source: Option<&str>) -> SpecResult<bool> {
        self.add_spec(Spec::parse(text, source)?)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn contains(&self, spec: &Spec<V>) -> bool {
        self.specs.contains(spec)
    }

    /// Members in the order they were first inserted.
    pub fn iter(&self) -> indexmap::set::Iter<'_, Spec<V>> {
        self.specs.iter()
    }

    /// Distinct lowercased package names in first-seen order.
    pub fn names(&self) -> Vec<&str> {
        let names: IndexSet<&str> = self.specs.iter().map(|s| s.key()).collect();
        names.into_iter().collect()
    }

    /// Members whose name matches `name`, ignoring case.
    pub fn get<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Spec<V>> + 'a {
        let key = name.to_lowercase();
        self.specs.iter().filter(move |s| s.key() == key)
    }

    /// Every member for `name` split into single-predicate specs.
    pub fn explode(&self, name: &str) -> Vec<Spec<V>> {
        self.get(name).flat_map(|spec| spec.explode()).collect()
    }

    /// Reduce every package to one canonical spec with default settings.
    pub fn normalize(&self) -> SpecResult<SpecSet<V>> {
        self.normalize_with(&NormalizeConfig::default())
    }

    /// Reduce every package to one canonical spec.
    ///
    /// Fails on the first package whose merged predicates admit no version.
    pub fn normalize_with(&self, config: &NormalizeConfig) -> SpecResult<SpecSet<V>> {
        let mut normalized = SpecSet::default();
        for name in self.names() {
            if let Some(spec) = self.normalize_package(name, config)? {
                normalized.specs.insert(spec);
            }
        }
        tracing::debug!(
            "normalized {} specs into {} packages",
            self.len(),
            normalized.len()
        );
        Ok(normalized)
    }

    /// Every package whose constraints are unsatisfiable, instead of only the first.
    pub fn conflicts(&self, config: &NormalizeConfig) -> ConflictReport {
        let mut report = ConflictReport::new();
        for name in self.names() {
            if let Err(conflict) = self.normalize_package(name, config) {
                report.add(conflict);
            }
        }
        report
    }

    fn normalize_package(
        &self,
        name: &str,
        config: &NormalizeConfig,
    ) -> Result<Option<Spec<V>>, Conflict> {
        let mut constraints = PackageConstraints::new(name, config);
        for spec in self.explode(name) {
            constraints.add(&spec)?;
        }
        constraints.finish()
    }
}

impl<'a, V> IntoIterator for &'a SpecSet<V> {
    type Item = &'a Spec<V>;
    type IntoIter = indexmap::set::Iter<'a, Spec<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

impl<V> IntoIterator for SpecSet<V> {
    type Item = Spec<V>;
    type IntoIter = indexmap::set::IntoIter<Spec<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.into_iter()
    }
}

impl<V: VersionScheme> FromIterator<Spec<V>> for SpecSet<V> {
    fn from_iter<I: IntoIterator<Item = Spec<V>>>(iter: I) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}

impl<V: VersionScheme> Extend<Spec<V>> for SpecSet<V> {
    fn extend<I: IntoIterator<Item = Spec<V>>>(&mut self, iter: I) {
        self.specs.extend(iter);
    }
}

/// One spec per line, in insertion order.
impl<V: fmt::Display> fmt::Display for SpecSet<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.specs.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{spec}")?;
        }
        Ok(())
    }
}
