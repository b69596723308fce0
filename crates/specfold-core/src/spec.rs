//! A single package requirement: a name, relational predicates, and the
//! source that asserted it.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use specfold_util::errors::{SpecError, SpecResult};

use crate::predicate::{Op, Predicate};
use crate::version::{Version, VersionScheme};

/// A package name plus an ordered list of version predicates.
///
/// Equality and hashing are structural over the lowercased name, the full
/// predicate sequence, and the source. Two specs that differ only in source
/// are distinct.
#[derive(Debug, Clone)]
pub struct Spec<V = Version> {
    name: String,
    key: String,
    predicates: Vec<Predicate<V>>,
    source: Option<String>,
}

impl<V: VersionScheme> Spec<V> {
    pub fn new(
        name: impl Into<String>,
        predicates: Vec<Predicate<V>>,
        source: Option<String>,
    ) -> Self {
        let name = name.into();
        Self {
            key: name.to_lowercase(),
            name,
            predicates,
            source,
        }
    }

    /// A spec pinned to exactly `version`.
    pub fn pinned(name: impl Into<String>, version: V, source: Option<String>) -> Self {
        Self::new(name, vec![Predicate::new(Op::Eq, version)], source)
    }

    /// Parse `<name>[<op><version>[,<op><version>...]]`.
    ///
    /// Predicates keep the order in which they appear in `text`.
    pub fn parse(text: &str, source: Option<&str>) -> SpecResult<Self> {
        let trimmed = text.trim();
        let name_len = trimmed
            .find(|c: char| !is_name_char(c))
            .unwrap_or(trimmed.len());
        let (name, rest) = trimmed.split_at(name_len);
        if name.is_empty() {
            return Err(SpecError::parse(text, "missing package name"));
        }
        if !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err(SpecError::parse(
                text,
                format!("package name `{name}` must start with a letter or digit"),
            ));
        }

        let rest = rest.trim();
        let predicates = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(',')
                .map(|part| Predicate::parse(part).map_err(|msg| SpecError::parse(text, msg)))
                .collect::<SpecResult<Vec<_>>>()?
        };

        Ok(Self::new(name, predicates, source.map(str::to_string)))
    }

    /// The name as it was written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lowercased name used for grouping and rendering.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn predicates(&self) -> &[Predicate<V>] {
        &self.predicates
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// A copy of this spec attributed to `source`.
    pub fn with_source(&self, source: Option<String>) -> Self {
        Self {
            source,
            ..self.clone()
        }
    }

    /// Whether this spec carries no predicates ("any version").
    pub fn is_bare(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Whether this spec is exactly one `==` predicate.
    pub fn is_pinned(&self) -> bool {
        matches!(self.predicates.as_slice(), [p] if p.op == Op::Eq)
    }

    pub fn pinned_version(&self) -> Option<&V> {
        match self.predicates.as_slice() {
            [p] if p.op == Op::Eq => Some(&p.version),
            _ => None,
        }
    }

    /// Whether `version` satisfies every predicate.
    pub fn matches(&self, version: &V) -> bool {
        self.predicates.iter().all(|p| p.matches(version))
    }

    /// Split into one spec per predicate, each keeping this spec's name and
    /// source. A bare spec yields itself once.
    pub fn explode(&self) -> impl Iterator<Item = Spec<V>> + '_ {
        let bare = self.is_bare().then(|| self.clone());
        bare.into_iter().chain(self.predicates.iter().map(move |p| Spec {
            name: self.name.clone(),
            key: self.key.clone(),
            predicates: vec![p.clone()],
            source: self.source.clone(),
        }))
    }

    /// Rendered form followed by the source, e.g. `django>=1.3 (from foo)`.
    pub fn description(&self) -> String {
        match &self.source {
            Some(source) => format!("{self} (from {source})"),
            None => self.to_string(),
        }
    }
}

impl Spec {
    /// Parse a requirement using the default [`Version`] scheme.
    pub fn from_expression(text: &str, source: Option<&str>) -> SpecResult<Self> {
        Self::parse(text, source)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

impl<V: PartialEq> PartialEq for Spec<V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.predicates == other.predicates && self.source == other.source
    }
}

impl<V: Eq> Eq for Spec<V> {}

impl<V: Hash> Hash for Spec<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.predicates.hash(state);
        self.source.hash(state);
    }
}

impl<V: fmt::Display> fmt::Display for Spec<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)?;
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

impl<V: VersionScheme> FromStr for Spec<V> {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, None)
    }
}

/// Anything that can be turned into a [`Spec`]: a spec itself or requirement text.
pub trait IntoSpec<V> {
    fn into_spec(self) -> SpecResult<Spec<V>>;
}

impl<V: VersionScheme> IntoSpec<V> for Spec<V> {
    fn into_spec(self) -> SpecResult<Spec<V>> {
        Ok(self)
    }
}

impl<V: VersionScheme> IntoSpec<V> for &Spec<V> {
    fn into_spec(self) -> SpecResult<Spec<V>> {
        Ok(self.clone())
    }
}

impl<V: VersionScheme> IntoSpec<V> for &str {
    fn into_spec(self) -> SpecResult<Spec<V>> {
        Spec::parse(self, None)
    }
}

impl<V: VersionScheme> IntoSpec<V> for String {
    fn into_spec(self) -> SpecResult<Spec<V>> {
        Spec::parse(&self, None)
    }
}
