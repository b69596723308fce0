//! Per-package predicate merging.
//!
//! All single-predicate specs for one package are folded into the tightest
//! lower bound, the tightest upper bound, an optional `==` pin, and the set of
//! `!=` exclusions. [`PackageConstraints::finish`] then checks the result for
//! emptiness and emits one canonical spec.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use specfold_core::config::NormalizeConfig;
use specfold_core::predicate::{Op, Predicate};
use specfold_core::spec::Spec;
use specfold_core::version::VersionScheme;

use crate::conflict::Conflict;

/// Distinct provenance strings. Absent sources are never recorded.
#[derive(Debug, Clone, Default)]
struct Sources {
    /// Comparison key (possibly case-folded) to the first spelling seen.
    by_key: BTreeMap<String, String>,
}

impl Sources {
    fn insert(&mut self, source: Option<&str>, fold_case: bool) {
        if let Some(source) = source {
            let key = if fold_case {
                source.to_lowercase()
            } else {
                source.to_string()
            };
            self.by_key.entry(key).or_insert_with(|| source.to_string());
        }
    }

    fn extend(&mut self, other: &Sources) {
        for (key, source) in &other.by_key {
            self.by_key
                .entry(key.clone())
                .or_insert_with(|| source.clone());
        }
    }

    /// `None` when empty, the single source as-is, or all sources sorted and joined.
    fn merged(&self, separator: &str) -> Option<String> {
        let mut sources: Vec<&str> = self.by_key.values().map(String::as_str).collect();
        sources.sort_unstable();
        sources.dedup();
        match sources.as_slice() {
            [] => None,
            [only] => Some((*only).to_string()),
            _ => Some(sources.join(separator)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Lower,
    Upper,
}

#[derive(Debug, Clone)]
struct Bound<V> {
    version: V,
    inclusive: bool,
    sources: Sources,
}

impl<V: VersionScheme> Bound<V> {
    /// `Greater` if `self` admits fewer versions than `other` on `side`.
    fn tightness(&self, other: &Self, side: Side) -> Ordering {
        let by_version = match side {
            Side::Lower => self.version.cmp(&other.version),
            Side::Upper => other.version.cmp(&self.version),
        };
        // At the same version the exclusive form is tighter.
        by_version.then_with(|| other.inclusive.cmp(&self.inclusive))
    }

    fn predicate(&self, side: Side) -> Predicate<V> {
        let op = match (side, self.inclusive) {
            (Side::Lower, true) => Op::Ge,
            (Side::Lower, false) => Op::Gt,
            (Side::Upper, true) => Op::Le,
            (Side::Upper, false) => Op::Lt,
        };
        Predicate::new(op, self.version.clone())
    }

    fn admits(&self, version: &V, side: Side) -> bool {
        self.predicate(side).matches(version)
    }
}

/// Working state for one package while its predicates are merged.
#[derive(Debug)]
pub(crate) struct PackageConstraints<'a, V> {
    name: String,
    config: &'a NormalizeConfig,
    lower: Option<Bound<V>>,
    upper: Option<Bound<V>>,
    pin: Option<(V, Sources)>,
    exclusions: BTreeMap<V, Sources>,
    /// Sources of specs that carried no predicate at all.
    bare: Option<Sources>,
}

impl<'a, V: VersionScheme> PackageConstraints<'a, V> {
    pub fn new(name: impl Into<String>, config: &'a NormalizeConfig) -> Self {
        Self {
            name: name.into(),
            config,
            lower: None,
            upper: None,
            pin: None,
            exclusions: BTreeMap::new(),
            bare: None,
        }
    }

    /// Fold every predicate of `spec` into the working state.
    pub fn add(&mut self, spec: &Spec<V>) -> Result<(), Conflict> {
        if spec.is_bare() {
            self.bare
                .get_or_insert_with(Sources::default)
                .insert(spec.source(), self.config.fold_source_case);
            return Ok(());
        }
        for predicate in spec.predicates() {
            self.add_predicate(predicate, spec.source())?;
        }
        Ok(())
    }

    fn add_predicate(&mut self, predicate: &Predicate<V>, source: Option<&str>) -> Result<(), Conflict> {
        let fold_case = self.config.fold_source_case;
        let mut sources = Sources::default();
        sources.insert(source, fold_case);

        match predicate.op {
            Op::Ge | Op::Gt => self.merge_bound(Side::Lower, predicate, sources),
            Op::Le | Op::Lt => self.merge_bound(Side::Upper, predicate, sources),
            Op::Ne => self
                .exclusions
                .entry(predicate.version.clone())
                .or_default()
                .extend(&sources),
            Op::Eq => {
                if let Some((pinned, existing)) = &mut self.pin {
                    if *pinned != predicate.version {
                        let first = describe(&Predicate::new(Op::Eq, pinned.clone()), existing, self.config);
                        let second = describe(predicate, &sources, self.config);
                        return Err(self.conflict("pinned to two different versions", vec![first, second]));
                    }
                    existing.extend(&sources);
                } else {
                    self.pin = Some((predicate.version.clone(), sources));
                }
            }
        }
        Ok(())
    }

    fn merge_bound(&mut self, side: Side, predicate: &Predicate<V>, sources: Sources) {
        let candidate = Bound {
            version: predicate.version.clone(),
            inclusive: predicate.op.is_inclusive(),
            sources,
        };
        let slot = match side {
            Side::Lower => &mut self.lower,
            Side::Upper => &mut self.upper,
        };
        match slot.as_ref().map(|current| candidate.tightness(current, side)) {
            None | Some(Ordering::Greater) => *slot = Some(candidate),
            Some(Ordering::Equal) => {
                if let Some(current) = slot {
                    current.sources.extend(&candidate.sources);
                }
            }
            Some(Ordering::Less) => tracing::trace!("{}: dropping looser {}", self.name, predicate),
        }
    }

    /// Check the merged state and emit the canonical spec.
    ///
    /// Returns `Ok(None)` if the package was never mentioned.
    pub fn finish(mut self) -> Result<Option<Spec<V>>, Conflict> {
        let constrained = self.lower.is_some()
            || self.upper.is_some()
            || self.pin.is_some()
            || !self.exclusions.is_empty();
        if !constrained {
            return Ok(self.bare.take().map(|sources| {
                Spec::new(self.name.clone(), Vec::new(), sources.merged(&self.config.source_separator))
            }));
        }

        self.check_range()?;

        if let Some((version, sources)) = self.pin.take() {
            return self.finish_pinned(version, sources).map(Some);
        }

        let exclusions = std::mem::take(&mut self.exclusions);
        let mut kept = Vec::new();
        for (version, sources) in exclusions {
            if self.absorb_exclusion(&version, &sources) {
                continue;
            }
            let in_range = self.lower.as_ref().map_or(true, |b| b.admits(&version, Side::Lower))
                && self.upper.as_ref().map_or(true, |b| b.admits(&version, Side::Upper));
            if in_range {
                kept.push((version, sources));
            } else {
                tracing::debug!("{}: dropping !={} outside the allowed range", self.name, version);
            }
        }

        self.check_range()?;

        let mut merged = Sources::default();
        let mut predicates = Vec::new();
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) if lower.version == upper.version => {
                // Both inclusive here, anything else failed the range check.
                merged.extend(&lower.sources);
                merged.extend(&upper.sources);
                predicates.push(Predicate::new(Op::Eq, lower.version.clone()));
            }
            (lower, upper) => {
                if let Some(lower) = lower {
                    merged.extend(&lower.sources);
                    predicates.push(lower.predicate(Side::Lower));
                }
                if let Some(upper) = upper {
                    merged.extend(&upper.sources);
                    predicates.push(upper.predicate(Side::Upper));
                }
                for (version, sources) in kept {
                    merged.extend(&sources);
                    predicates.push(Predicate::new(Op::Ne, version));
                }
            }
        }
        predicates.sort();

        let spec = Spec::new(self.name.clone(), predicates, merged.merged(&self.config.source_separator));
        tracing::debug!("{}: normalized to {}", self.name, spec);
        Ok(Some(spec))
    }

    /// Turn an inclusive bound at `version` exclusive. Returns whether the
    /// exclusion coincided with a bound and is therefore no longer needed.
    fn absorb_exclusion(&mut self, version: &V, sources: &Sources) -> bool {
        let mut absorbed = false;
        for bound in [self.lower.as_mut(), self.upper.as_mut()].into_iter().flatten() {
            if bound.version == *version {
                if bound.inclusive {
                    bound.inclusive = false;
                    bound.sources.extend(sources);
                }
                absorbed = true;
            }
        }
        absorbed
    }

    fn finish_pinned(&self, version: V, sources: Sources) -> Result<Spec<V>, Conflict> {
        let pin = Predicate::new(Op::Eq, version);
        let mut merged = sources.clone();

        for (side, bound) in [(Side::Lower, &self.lower), (Side::Upper, &self.upper)] {
            if let Some(bound) = bound {
                if !bound.admits(&pin.version, side) {
                    return Err(self.conflict(
                        "pinned version lies outside the allowed range",
                        vec![
                            describe(&pin, &sources, self.config),
                            describe(&bound.predicate(side), &bound.sources, self.config),
                        ],
                    ));
                }
                merged.extend(&bound.sources);
            }
        }
        if let Some(excluded) = self.exclusions.get(&pin.version) {
            let exclusion = Predicate::new(Op::Ne, pin.version.clone());
            return Err(self.conflict(
                "pinned version is excluded",
                vec![
                    describe(&pin, &sources, self.config),
                    describe(&exclusion, excluded, self.config),
                ],
            ));
        }

        // A pin subsumes every other exclusion, but their sources still count.
        for sources in self.exclusions.values() {
            merged.extend(sources);
        }

        let spec = Spec::new(self.name.clone(), vec![pin], merged.merged(&self.config.source_separator));
        tracing::debug!("{}: normalized to {}", self.name, spec);
        Ok(spec)
    }

    fn check_range(&self) -> Result<(), Conflict> {
        let (Some(lower), Some(upper)) = (&self.lower, &self.upper) else {
            return Ok(());
        };
        let empty = match lower.version.cmp(&upper.version) {
            Ordering::Greater => true,
            Ordering::Equal => !(lower.inclusive && upper.inclusive),
            Ordering::Less => false,
        };
        if empty {
            return Err(self.conflict(
                "no version satisfies both bounds",
                vec![
                    describe(&lower.predicate(Side::Lower), &lower.sources, self.config),
                    describe(&upper.predicate(Side::Upper), &upper.sources, self.config),
                ],
            ));
        }
        Ok(())
    }

    fn conflict(&self, reason: &str, predicates: Vec<String>) -> Conflict {
        let conflict = Conflict::new(self.name.clone(), reason, predicates);
        tracing::warn!("{conflict}");
        conflict
    }
}

fn describe<V: VersionScheme>(predicate: &Predicate<V>, sources: &Sources, config: &NormalizeConfig) -> String {
    match sources.merged(&config.source_separator) {
        Some(source) => format!("{predicate} (from {source})"),
        None => predicate.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specfold_core::version::Version;

    fn sources(items: &[&str], fold_case: bool) -> Sources {
        let mut s = Sources::default();
        for item in items {
            s.insert(Some(*item), fold_case);
        }
        s
    }

    fn bound(version: &str, inclusive: bool) -> Bound<Version> {
        Bound {
            version: Version::parse(version).unwrap(),
            inclusive,
            sources: Sources::default(),
        }
    }

    #[test]
    fn merged_sources_sorted_and_joined() {
        let s = sources(&["qux", "bar", "mutt", "bar"], false);
        assert_eq!(s.merged(" and ").as_deref(), Some("bar and mutt and qux"));
    }

    #[test]
    fn merged_sources_single_and_empty() {
        assert_eq!(sources(&["foo"], false).merged(" and ").as_deref(), Some("foo"));
        assert_eq!(Sources::default().merged(" and "), None);

        let mut none = Sources::default();
        none.insert(None, false);
        assert_eq!(none.merged(" and "), None);
    }

    #[test]
    fn source_case_folding() {
        assert_eq!(
            sources(&["Foo", "foo"], false).merged(" and ").as_deref(),
            Some("Foo and foo")
        );
        assert_eq!(sources(&["Foo", "foo"], true).merged(" and ").as_deref(), Some("Foo"));
    }

    #[test]
    fn exclusive_bound_is_tighter_at_same_version() {
        assert_eq!(bound("1.4", false).tightness(&bound("1.4", true), Side::Lower), Ordering::Greater);
        assert_eq!(bound("1.4", false).tightness(&bound("1.4", true), Side::Upper), Ordering::Greater);
        assert_eq!(bound("1.4", true).tightness(&bound("1.4", true), Side::Lower), Ordering::Equal);
    }

    #[test]
    fn higher_lower_bound_and_lower_upper_bound_are_tighter() {
        assert_eq!(bound("1.5", true).tightness(&bound("1.4", false), Side::Lower), Ordering::Greater);
        assert_eq!(bound("1.5", true).tightness(&bound("1.4", false), Side::Upper), Ordering::Less);
    }
}
